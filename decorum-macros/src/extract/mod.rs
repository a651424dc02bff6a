//! Attribute extraction utilities.
//!
//! - `route`: route verbs and controller-level attributes (`#[get]`, `#[middleware]`)
//! - `params`: handler argument attributes (`#[query]`, `#[body]`, ...)

pub mod params;
pub mod route;

pub use params::*;
pub use route::*;
