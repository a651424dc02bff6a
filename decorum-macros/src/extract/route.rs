//! Route-related attribute extraction.

use crate::types::HttpMethod;

pub fn is_route_attr(attr: &syn::Attribute) -> bool {
    HttpMethod::from_attr(attr).is_some()
}

pub fn is_middleware_attr(attr: &syn::Attribute) -> bool {
    attr.path().is_ident("middleware")
}

/// Extract `#[get]` / `#[get("/path")]` and friends.
///
/// Returns the verb and the optional path. More than one route attribute on
/// the same method is an error.
pub fn extract_route_attr(attrs: &[syn::Attribute]) -> syn::Result<Option<(HttpMethod, Option<String>)>> {
    let mut found = None;
    for attr in attrs {
        let Some(method) = HttpMethod::from_attr(attr) else {
            continue;
        };
        if found.is_some() {
            return Err(syn::Error::new_spanned(
                attr,
                "a handler can carry only one route attribute",
            ));
        }
        let path = match &attr.meta {
            syn::Meta::Path(_) => None,
            _ => Some(attr.parse_args::<syn::LitStr>()?.value()),
        };
        found = Some((method, path));
    }
    Ok(found)
}

/// Collect every `#[middleware("a", "b")]` on the impl block.
pub fn extract_middlewares(attrs: &[syn::Attribute]) -> syn::Result<Vec<String>> {
    let mut names = Vec::new();
    for attr in attrs.iter().filter(|a| is_middleware_attr(a)) {
        let args: syn::punctuated::Punctuated<syn::LitStr, syn::Token![,]> =
            attr.parse_args_with(syn::punctuated::Punctuated::parse_terminated)?;
        if args.is_empty() {
            return Err(syn::Error::new_spanned(
                attr,
                "#[middleware] expects at least one name, e.g. #[middleware(\"auth\")]",
            ));
        }
        names.extend(args.iter().map(syn::LitStr::value));
    }
    Ok(names)
}

pub fn strip_route_attrs(attrs: Vec<syn::Attribute>) -> Vec<syn::Attribute> {
    attrs.into_iter().filter(|a| !is_route_attr(a)).collect()
}
