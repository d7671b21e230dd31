//! Domain core for the invite page builder.
//!
//! Template configuration resolution (section normalization, layered merge,
//! section selection), the bounded editing history, and the editor session
//! that composes them. Storage and the template catalog are reached only
//! through the traits in [`store`].

pub mod config;
pub mod error;
pub mod history;
pub mod merge;
pub mod section;
pub mod selector;
pub mod session;
pub mod store;
pub mod types;
