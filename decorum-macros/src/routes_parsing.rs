use crate::extract::*;
use crate::types::*;

/// Arguments of `#[controller(...)]`.
#[derive(Default)]
pub struct ControllerArgs {
    pub path: Option<String>,
    pub middlewares: Vec<String>,
}

impl syn::parse::Parse for ControllerArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut args = ControllerArgs::default();
        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("path") {
                args.path = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                Ok(())
            } else if meta.path.is_ident("middleware") {
                let value = meta.value()?;
                if value.peek(syn::token::Bracket) {
                    let content;
                    syn::bracketed!(content in value);
                    let names: syn::punctuated::Punctuated<syn::LitStr, syn::Token![,]> =
                        content.parse_terminated(|p| p.parse::<syn::LitStr>(), syn::Token![,])?;
                    args.middlewares.extend(names.iter().map(syn::LitStr::value));
                } else {
                    args.middlewares.push(value.parse::<syn::LitStr>()?.value());
                }
                Ok(())
            } else {
                Err(meta.error("expected `path = \"...\"` or `middleware = ...`"))
            }
        });
        syn::parse::Parser::parse2(parser, input.parse()?)?;
        Ok(args)
    }
}

/// Parsed representation of a `#[controller] impl Name { ... }` block.
pub struct ControllerDef {
    pub self_ty: syn::Type,
    pub root: Option<String>,
    pub middlewares: Vec<String>,
    pub route_methods: Vec<RouteMethod>,
    /// The impl block with every decorum attribute removed.
    pub item_impl: syn::ItemImpl,
}

pub fn parse(args: ControllerArgs, mut item_impl: syn::ItemImpl) -> syn::Result<ControllerDef> {
    if let Some((_, trait_path, _)) = &item_impl.trait_ {
        return Err(syn::Error::new_spanned(
            trait_path,
            "#[controller] goes on an inherent impl block, not a trait impl",
        ));
    }
    if !item_impl.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item_impl.generics,
            "#[controller] does not support generic impl blocks",
        ));
    }

    let mut middlewares = args.middlewares;
    middlewares.extend(extract_middlewares(&item_impl.attrs)?);
    item_impl.attrs.retain(|a| !is_middleware_attr(a));

    let mut route_methods = Vec::new();
    for item in item_impl.items.iter_mut() {
        let syn::ImplItem::Fn(method) = item else {
            continue;
        };
        let Some((verb, path)) = extract_route_attr(&method.attrs)? else {
            continue;
        };
        check_receiver(&method.sig)?;
        let params = extract_handler_params(&mut method.sig)?;
        method.attrs = strip_route_attrs(std::mem::take(&mut method.attrs));
        route_methods.push(RouteMethod {
            method: verb,
            path,
            params,
            is_async: method.sig.asyncness.is_some(),
            fn_item: method.clone(),
        });
    }

    Ok(ControllerDef {
        self_ty: (*item_impl.self_ty).clone(),
        root: args.path,
        middlewares,
        route_methods,
        item_impl,
    })
}

fn check_receiver(sig: &syn::Signature) -> syn::Result<()> {
    match sig.receiver() {
        Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_none() => Ok(()),
        Some(receiver) => Err(syn::Error::new_spanned(
            receiver,
            "handlers take `&self`; the controller instance is shared between requests",
        )),
        None => Err(syn::Error::new_spanned(
            &sig.ident,
            "handlers must be methods taking `&self`",
        )),
    }
}
