use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Category: name lookups and sorting
        manager
            .create_index(
                Index::create()
                    .name("idx_category_name")
                    .table(Category::Table)
                    .col(Category::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_product_name")
                    .table(Product::Table)
                    .col(Product::Name)
                    .to_owned(),
            )
            .await?;

        // Product: price range filters
        manager
            .create_index(
                Index::create()
                    .name("idx_product_price")
                    .table(Product::Table)
                    .col(Product::Price)
                    .to_owned(),
            )
            .await?;

        // Join: reverse lookup category -> products
        manager
            .create_index(
                Index::create()
                    .name("idx_product_category_category")
                    .table(ProductCategory::Table)
                    .col(ProductCategory::CategoryId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_category_name").table(Category::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_product_name").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_product_price").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_product_category_category").table(ProductCategory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Category { Table, Name }

#[derive(DeriveIden)]
enum Product { Table, Name, Price }

#[derive(DeriveIden)]
enum ProductCategory { Table, CategoryId }
