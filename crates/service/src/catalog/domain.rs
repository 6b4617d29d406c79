use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub is_deleted: bool,
}

/// Product as exposed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub is_deleted: bool,
}

/// Request body for category create/update. `id` is ignored on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[serde(default)]
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub is_deleted: bool,
}

/// Request body for product create/update. `id` is ignored on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub is_deleted: bool,
}

/// Mutable category fields, written wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub is_deleted: bool,
}

/// Mutable product fields, written wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub is_deleted: bool,
}

/// A loaded row together with the concurrency token it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub item: T,
    pub version: i32,
}

impl From<CategoryInput> for CategoryDraft {
    fn from(i: CategoryInput) -> Self { Self { name: i.name, is_deleted: i.is_deleted } }
}

impl From<ProductInput> for ProductDraft {
    fn from(i: ProductInput) -> Self {
        Self { name: i.name, description: i.description, price: i.price, is_deleted: i.is_deleted }
    }
}

impl From<models::category::Model> for Versioned<Category> {
    fn from(m: models::category::Model) -> Self {
        Versioned { version: m.row_version, item: Category { id: m.id, name: m.name, is_deleted: m.is_deleted } }
    }
}

impl From<models::product::Model> for Versioned<Product> {
    fn from(m: models::product::Model) -> Self {
        Versioned {
            version: m.row_version,
            item: Product { id: m.id, name: m.name, description: m.description, price: m.price, is_deleted: m.is_deleted },
        }
    }
}

impl From<models::category::Model> for Category {
    fn from(m: models::category::Model) -> Self { Versioned::<Category>::from(m).item }
}

impl From<models::product::Model> for Product {
    fn from(m: models::product::Model) -> Self { Versioned::<Product>::from(m).item }
}
