use sea_orm::{entity::prelude::*, ActiveValue::NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::{category, errors::ModelError, product_category};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub price: Decimal,
    pub is_deleted: bool,
    pub row_version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { ProductCategory }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ProductCategory => Entity::has_many(product_category::Entity).into(),
        }
    }
}

impl Related<product_category::Entity> for Entity {
    fn to() -> RelationDef { Relation::ProductCategory.def() }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef { product_category::Relation::Category.def() }

    fn via() -> Option<RelationDef> { Some(product_category::Relation::Product.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

/// All products that are not soft-deleted.
pub fn find_active() -> Select<Entity> {
    Entity::find().filter(Column::IsDeleted.eq(false))
}

pub fn find_active_by_id(id: i32) -> Select<Entity> {
    find_active().filter(Column::Id.eq(id))
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    name: &str,
    description: &str,
    price: Decimal,
    is_deleted: bool,
) -> Result<Model, ModelError> {
    let am = ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        price: Set(price),
        is_deleted: Set(is_deleted),
        row_version: Set(0),
    };
    Ok(am.insert(db).await?)
}
