//! Create `product_category` join table with FKs to `product` and `category`.
//!
//! Composite primary key `(product_id, category_id)`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductCategory::Table)
                    .if_not_exists()
                    .col(integer(ProductCategory::ProductId).not_null())
                    .col(integer(ProductCategory::CategoryId).not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_product_category")
                            .col(ProductCategory::ProductId)
                            .col(ProductCategory::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_category_product")
                            .from(ProductCategory::Table, ProductCategory::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_category_category")
                            .from(ProductCategory::Table, ProductCategory::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ProductCategory::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ProductCategory { Table, ProductId, CategoryId }

#[derive(DeriveIden)]
enum Product { Table, Id }

#[derive(DeriveIden)]
enum Category { Table, Id }
