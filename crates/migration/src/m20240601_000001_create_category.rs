//! Create `category` table.
//!
//! Rows are soft-deleted through `is_deleted`; `row_version` is the
//! optimistic concurrency token bumped on every write.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Category::Table)
                    .if_not_exists()
                    .col(pk_auto(Category::Id))
                    .col(string_len(Category::Name, 256).not_null())
                    .col(boolean(Category::IsDeleted).not_null().default(false))
                    .col(integer(Category::RowVersion).not_null().default(0))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Category::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Category { Table, Id, Name, IsDeleted, RowVersion }
