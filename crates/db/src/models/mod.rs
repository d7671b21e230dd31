//! Database row structs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the table row and its conversion into the core record type.

pub mod page;
pub mod template;
