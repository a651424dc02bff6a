use proc_macro::TokenStream;

use crate::codegen;
use crate::routes_parsing::{self, ControllerArgs};

pub fn expand(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = syn::parse_macro_input!(args as ControllerArgs);
    let item_impl = syn::parse_macro_input!(input as syn::ItemImpl);
    match routes_parsing::parse(args, item_impl) {
        Ok(def) => codegen::generate(&def).into(),
        Err(err) => err.to_compile_error().into(),
    }
}
