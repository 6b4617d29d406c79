//! Migrator registering the catalog tables in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_category;
mod m20240601_000002_create_product;
mod m20240601_000003_create_product_category;
mod m20240601_000004_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_category::Migration),
            Box::new(m20240601_000002_create_product::Migration),
            Box::new(m20240601_000003_create_product_category::Migration),
            // Indexes should always be applied last
            Box::new(m20240601_000004_add_indexes::Migration),
        ]
    }
}
