//! Handler closure generation for route methods.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::types::*;

/// Build the `Handler::new(..)` expression wrapping one route method.
///
/// Arguments are taken out of the `ParameterList` by position, converted
/// according to their extraction kind, then passed to the method. Async
/// methods become deferred results holding their own `Arc` of the
/// controller.
pub fn generate_handler(rm: &RouteMethod, krate: &TokenStream) -> TokenStream {
    let fn_name = rm.name();
    let arg_names: Vec<_> = rm
        .params
        .iter()
        .map(|p| format_ident!("__arg_{}", p.index))
        .collect();
    let extractions = rm.params.iter().zip(&arg_names).map(|(p, arg)| {
        let index = p.index;
        let ty = &p.ty;
        if p.kind.is_native() {
            quote! { let #arg: #ty = __params.take_native::<#ty>(#index)?; }
        } else {
            quote! { let #arg: #ty = __params.take_value::<#ty>(#index)?; }
        }
    });

    let invoke = if rm.is_async {
        quote! {
            let __this = ::std::sync::Arc::clone(__this);
            ::std::result::Result::Ok(::std::option::Option::Some(
                #krate::dispatch::HandlerResult::deferred(async move {
                    __this.#fn_name(#(#arg_names),*).await
                }),
            ))
        }
    } else {
        quote! {
            #krate::dispatch::IntoHandlerResult::into_handler_result(
                __this.#fn_name(#(#arg_names),*),
            )
        }
    };

    // Unused when the method takes no arguments.
    let params_binding = if rm.params.is_empty() {
        quote!(_)
    } else {
        quote!(mut __params)
    };

    quote! {
        #krate::dispatch::Handler::new(
            |__this: &::std::sync::Arc<Self>, #params_binding: #krate::dispatch::ParameterList|
                -> ::std::result::Result<
                    ::std::option::Option<#krate::dispatch::HandlerResult>,
                    #krate::error::BoxError,
                >
            {
                #(#extractions)*
                #invoke
            },
        )
    }
}
