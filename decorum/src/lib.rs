//! Decorum: annotation-style HTTP controllers over any server adapter.
//!
//! This facade crate re-exports the Decorum sub-crates through a single
//! dependency. Import everything you need with:
//!
//! ```ignore
//! use decorum::prelude::*;
//!
//! struct Greeter;
//!
//! #[controller(path = "/greet")]
//! impl Greeter {
//!     #[get("/{name}")]
//!     fn hello(&self, #[path_param] name: String) -> String {
//!         format!("hello {name}")
//!     }
//! }
//!
//! Bootstrapper::new(MyAdapter::new()).controller(Greeter).start()?;
//! ```
//!
//! # Feature flags
//!
//! | Feature   | Default | Crate          |
//! |-----------|---------|----------------|
//! | `testing` | no      | `decorum-test` |

// The proc macros use `proc-macro-crate` to detect whether the user depends
// on `decorum` (facade) or `decorum-core`, and generate the correct paths.
pub extern crate decorum_core;
pub extern crate decorum_macros;

pub use decorum_core::*;

#[cfg(feature = "testing")]
pub use decorum_test;

/// Unified prelude: the core prelude plus the controller attributes.
pub mod prelude {
    pub use decorum_core::prelude::*;
    pub use decorum_macros::{controller, delete, get, head, middleware, options, patch, post, put};
}
