use proc_macro2::TokenStream;
use quote::quote;

/// Route verbs recognised as method attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub const ALL: [(&'static str, HttpMethod); 7] = [
        ("get", HttpMethod::Get),
        ("post", HttpMethod::Post),
        ("put", HttpMethod::Put),
        ("patch", HttpMethod::Patch),
        ("delete", HttpMethod::Delete),
        ("head", HttpMethod::Head),
        ("options", HttpMethod::Options),
    ];

    pub fn from_attr(attr: &syn::Attribute) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|(name, _)| attr.path().is_ident(name))
            .map(|(_, method)| *method)
    }

    /// The matching `meta::HttpMethod` variant in the runtime crate.
    pub fn to_tokens(self, krate: &TokenStream) -> TokenStream {
        let variant = match self {
            HttpMethod::Get => quote!(Get),
            HttpMethod::Post => quote!(Post),
            HttpMethod::Put => quote!(Put),
            HttpMethod::Patch => quote!(Patch),
            HttpMethod::Delete => quote!(Delete),
            HttpMethod::Head => quote!(Head),
            HttpMethod::Options => quote!(Options),
        };
        quote!(#krate::meta::HttpMethod::#variant)
    }
}

/// Where a handler argument comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Path,
    Query,
    Body,
    Header,
    Cookie,
    Adapter,
    Request,
    Response,
}

impl ParamKind {
    /// Attribute name → kind. `path` is taken by the built-in module attribute.
    pub const ATTRS: [(&'static str, ParamKind); 8] = [
        ("path_param", ParamKind::Path),
        ("query", ParamKind::Query),
        ("body", ParamKind::Body),
        ("header", ParamKind::Header),
        ("cookie", ParamKind::Cookie),
        ("adapter", ParamKind::Adapter),
        ("request", ParamKind::Request),
        ("response", ParamKind::Response),
    ];

    pub fn from_attr(attr: &syn::Attribute) -> Option<Self> {
        Self::ATTRS
            .iter()
            .find(|(name, _)| attr.path().is_ident(name))
            .map(|(_, kind)| *kind)
    }

    /// Extracted by name, defaulting to the argument's identifier.
    pub fn requires_name(self) -> bool {
        matches!(
            self,
            ParamKind::Path | ParamKind::Query | ParamKind::Header | ParamKind::Cookie
        )
    }

    /// Takes a name only if one is given explicitly.
    pub fn accepts_name(self) -> bool {
        self.requires_name() || self == ParamKind::Body
    }

    /// Arrives as a native adapter object rather than a JSON value.
    pub fn is_native(self) -> bool {
        matches!(
            self,
            ParamKind::Adapter | ParamKind::Request | ParamKind::Response
        )
    }

    pub fn to_tokens(self, krate: &TokenStream) -> TokenStream {
        let variant = match self {
            ParamKind::Path => quote!(Path),
            ParamKind::Query => quote!(Query),
            ParamKind::Body => quote!(Body),
            ParamKind::Header => quote!(Header),
            ParamKind::Cookie => quote!(Cookie),
            ParamKind::Adapter => quote!(Adapter),
            ParamKind::Request => quote!(Request),
            ParamKind::Response => quote!(Response),
        };
        quote!(#krate::meta::ParameterType::#variant)
    }
}

/// One argument of a handler method (the receiver excluded).
pub struct HandlerParam {
    pub index: usize,
    pub kind: ParamKind,
    pub name: Option<String>,
    pub ty: syn::Type,
}

/// A method carrying a route attribute.
pub struct RouteMethod {
    pub method: HttpMethod,
    pub path: Option<String>,
    pub params: Vec<HandlerParam>,
    pub is_async: bool,
    pub fn_item: syn::ImplItemFn,
}

impl RouteMethod {
    pub fn name(&self) -> &syn::Ident {
        &self.fn_item.sig.ident
    }
}
