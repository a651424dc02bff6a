//! Crate path resolution for generated code.
//!
//! Detects whether the user depends on `decorum` (facade) or `decorum-core`
//! directly, and returns the appropriate path prefix for generated code.

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::quote;

/// Returns the token stream for accessing `decorum_core` items.
///
/// `::decorum` when the facade is a dependency, `::decorum_core` otherwise.
pub fn decorum_core_path() -> TokenStream {
    for candidate in ["decorum", "decorum-core"] {
        if let Ok(found) = crate_name(candidate) {
            return match found {
                FoundCrate::Itself => quote!(crate),
                FoundCrate::Name(name) => {
                    let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
                    quote!(::#ident)
                }
            };
        }
    }
    // Fallback, so that errors point at a recognisable path.
    quote!(::decorum_core)
}
