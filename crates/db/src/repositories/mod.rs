//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod page_repo;
pub mod template_repo;

pub use page_repo::PageRepo;
pub use template_repo::TemplateRepo;
