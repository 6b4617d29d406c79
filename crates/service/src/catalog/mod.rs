//! Catalog module: products, categories and their memberships.
//!
//! Layered like the rest of the service crate: `domain` types, `query`
//! types, `repository` traits with SeaORM (`repo::seaorm`) and in-memory
//! (`repository::mock`) implementations, and one service per entity.

pub mod domain;
pub mod query;
pub mod repository;
pub mod repo;
pub mod category_service;
pub mod product_service;

pub use category_service::CategoryService;
pub use product_service::ProductService;
