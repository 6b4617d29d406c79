//! Service layer providing the catalog's business operations on top of models.
//! - Separates business logic from data access through repository traits.
//! - Applies the soft-delete predicate explicitly in every repository read.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod pagination;
pub mod catalog;
#[cfg(test)]
pub mod test_support;
