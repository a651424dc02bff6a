//! `impl Controller` generation.

use proc_macro2::TokenStream;
use quote::quote;

use super::handlers::generate_handler;
use crate::routes_parsing::ControllerDef;
use crate::types::*;

pub fn generate_controller_impl(def: &ControllerDef, krate: &TokenStream) -> TokenStream {
    let self_ty = &def.self_ty;

    let root = def.root.as_ref().map(|root| {
        quote! { __registry.set_root::<Self>(#root); }
    });

    let middlewares = def.middlewares.iter().map(|name| {
        quote! {
            __registry.add_middleware::<Self>(#krate::meta::Middleware::named(#name));
        }
    });

    let routes = def
        .route_methods
        .iter()
        .map(|rm| generate_route_declarations(rm, krate));

    quote! {
        impl #krate::controller::Controller for #self_ty {
            fn declare(__registry: &#krate::registry::ControllerRegistry) {
                #root
                #(#middlewares)*
                #(#routes)*
            }
        }
    }
}

/// Bindings, handler, then route, so a debounced registration never sees a
/// route without its handler.
fn generate_route_declarations(rm: &RouteMethod, krate: &TokenStream) -> TokenStream {
    let handler_name = rm.name().to_string();

    let bindings = rm.params.iter().map(|p| {
        let index = p.index;
        let kind = p.kind.to_tokens(krate);
        let name = match &p.name {
            Some(name) => quote!(::std::option::Option::Some(::std::string::String::from(#name))),
            None => quote!(::std::option::Option::None),
        };
        quote! {
            __registry.add_parameter_binding::<Self>(
                #handler_name,
                #krate::meta::ParameterBinding::new(#index, #kind, #name),
            );
        }
    });

    let handler = generate_handler(rm, krate);
    let method = rm.method.to_tokens(krate);
    let decorator = match &rm.path {
        Some(path) => quote!(#krate::declare::route(#method).path(#path)),
        None => quote!(#krate::declare::route(#method).root()),
    };

    quote! {
        #(#bindings)*
        __registry.add_handler::<Self>(#handler_name, #handler);
        #decorator.handler::<Self>(__registry, #handler_name);
    }
}
