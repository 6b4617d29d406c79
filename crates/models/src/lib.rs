//! SeaORM entities for the catalog schema.
//!
//! Each entity module exposes the generated `Entity`/`Model`/`ActiveModel`
//! plus `find_active*` helpers that apply the soft-delete predicate
//! explicitly. Nothing in this crate filters implicitly.

pub mod errors;
pub mod db;
pub mod category;
pub mod product;
pub mod product_category;

#[cfg(test)]
mod tests;
