//! Create `product` table.
//!
//! `price` is a fixed-point decimal; no check constraint on its sign.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(pk_auto(Product::Id))
                    .col(string_len(Product::Name, 256).not_null())
                    .col(text(Product::Description).not_null())
                    .col(decimal_len(Product::Price, 18, 2).not_null())
                    .col(boolean(Product::IsDeleted).not_null().default(false))
                    .col(integer(Product::RowVersion).not_null().default(0))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Product { Table, Id, Name, Description, Price, IsDeleted, RowVersion }
