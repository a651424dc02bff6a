//! Code generation for `#[controller]`.

mod controller_impl;
mod handlers;

use proc_macro2::TokenStream;
use quote::quote;

use crate::crate_path::decorum_core_path;
use crate::routes_parsing::ControllerDef;

/// Emit the cleaned impl block followed by its `Controller` impl.
pub fn generate(def: &ControllerDef) -> TokenStream {
    let krate = decorum_core_path();
    let item_impl = &def.item_impl;
    let controller_impl = controller_impl::generate_controller_impl(def, &krate);
    quote! {
        #item_impl
        #controller_impl
    }
}
