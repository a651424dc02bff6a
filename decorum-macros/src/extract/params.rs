//! Handler argument attribute extraction.

use crate::types::{HandlerParam, ParamKind};

/// Parse and strip the extraction attribute of every typed argument.
pub fn extract_handler_params(sig: &mut syn::Signature) -> syn::Result<Vec<HandlerParam>> {
    let mut params = Vec::new();
    let typed = sig.inputs.iter_mut().filter_map(|arg| match arg {
        syn::FnArg::Typed(pat_type) => Some(pat_type),
        syn::FnArg::Receiver(_) => None,
    });

    for (index, pat_type) in typed.enumerate() {
        let mut binding = None;
        for attr in &pat_type.attrs {
            let Some(kind) = ParamKind::from_attr(attr) else {
                continue;
            };
            if binding.is_some() {
                return Err(syn::Error::new_spanned(
                    attr,
                    "a handler argument can have only one extraction attribute",
                ));
            }
            binding = Some((kind, explicit_name(attr, kind)?));
        }

        let Some((kind, explicit)) = binding else {
            return Err(syn::Error::new_spanned(
                &pat_type.pat,
                "handler arguments need an extraction attribute\n\n\
                 hint: one of #[path_param], #[query], #[body], #[header], #[cookie], \
                 #[adapter], #[request], #[response]",
            ));
        };

        let name = match explicit {
            Some(name) => Some(name),
            None if kind.requires_name() => Some(ident_name(&pat_type.pat)?),
            None => None,
        };

        pat_type.attrs.retain(|a| ParamKind::from_attr(a).is_none());
        params.push(HandlerParam {
            index,
            kind,
            name,
            ty: (*pat_type.ty).clone(),
        });
    }
    Ok(params)
}

fn explicit_name(attr: &syn::Attribute, kind: ParamKind) -> syn::Result<Option<String>> {
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(None);
    }
    if !kind.accepts_name() {
        return Err(syn::Error::new_spanned(
            attr,
            "this extraction attribute takes no arguments",
        ));
    }
    Ok(Some(attr.parse_args::<syn::LitStr>()?.value()))
}

fn ident_name(pat: &syn::Pat) -> syn::Result<String> {
    match pat {
        syn::Pat::Ident(pat_ident) => {
            let name = pat_ident.ident.to_string();
            Ok(name.strip_prefix("r#").map(str::to_string).unwrap_or(name))
        }
        other => Err(syn::Error::new_spanned(
            other,
            "cannot infer a parameter name from a pattern; pass it explicitly, e.g. #[query(\"page\")]",
        )),
    }
}
