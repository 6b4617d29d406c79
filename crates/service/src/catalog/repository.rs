use async_trait::async_trait;

use super::domain::{Category, CategoryDraft, Product, ProductDraft, Versioned};
use super::query::{CategoryFilter, CategorySortKey, ProductFilter, ProductSortKey, SortOrder};
use crate::errors::RepoError;
use crate::pagination::Window;

/// Category persistence. Every read applies the soft-delete predicate.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Active row by id; soft-deleted rows are never returned.
    async fn find_by_id(&self, id: i32) -> Result<Option<Versioned<Category>>, RepoError>;
    async fn exists(&self, id: i32) -> Result<bool, RepoError>;
    async fn count(&self, filter: &CategoryFilter) -> Result<u64, RepoError>;
    async fn find_many(&self, filter: &CategoryFilter, order: SortOrder<CategorySortKey>, window: Window) -> Result<Vec<Category>, RepoError>;
    async fn insert(&self, draft: CategoryDraft) -> Result<Category, RepoError>;
    /// Overwrite all mutable fields if the row is still at `current.version`.
    async fn update_whole(&self, current: &Versioned<Category>, draft: CategoryDraft) -> Result<Category, RepoError>;
    async fn mark_deleted(&self, current: &Versioned<Category>) -> Result<(), RepoError>;
}

/// Product persistence plus the product-category join collection.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Versioned<Product>>, RepoError>;
    async fn exists(&self, id: i32) -> Result<bool, RepoError>;
    async fn count(&self, filter: &ProductFilter) -> Result<u64, RepoError>;
    async fn find_many(&self, filter: &ProductFilter, order: SortOrder<ProductSortKey>, window: Window) -> Result<Vec<Product>, RepoError>;
    async fn insert(&self, draft: ProductDraft) -> Result<Product, RepoError>;
    async fn update_whole(&self, current: &Versioned<Product>, draft: ProductDraft) -> Result<Product, RepoError>;
    async fn mark_deleted(&self, current: &Versioned<Product>) -> Result<(), RepoError>;

    /// Active categories the product belongs to, id ascending.
    async fn categories_of(&self, product_id: i32) -> Result<Vec<Category>, RepoError>;
    /// Idempotent. Returns false when the category is missing or soft-deleted.
    async fn attach_category(&self, product_id: i32, category_id: i32) -> Result<bool, RepoError>;
    /// Returns whether a membership row was removed.
    async fn detach_category(&self, product_id: i32, category_id: i32) -> Result<bool, RepoError>;
}

/// In-memory catalog for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::{Mutex, MutexGuard};

    /// A write applied by "another request" right before the next
    /// `update_whole`/`mark_deleted` call saves.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Interference {
        /// Row still active, version bumped.
        Modify,
        /// Row soft-deleted, version bumped.
        SoftDelete,
        /// Row physically removed.
        Remove,
    }

    #[derive(Default)]
    struct State {
        categories: BTreeMap<i32, Versioned<Category>>,
        products: BTreeMap<i32, Versioned<Product>>,
        memberships: BTreeSet<(i32, i32)>,
        last_category_id: i32,
        last_product_id: i32,
        interference: Option<Interference>,
    }

    /// Both repositories over one shared store, mirroring a single database.
    #[derive(Default)]
    pub struct InMemoryCatalog {
        state: Mutex<State>,
    }

    impl InMemoryCatalog {
        pub fn new() -> Self { Self::default() }

        /// Arrange for the next save to find the row changed underneath it.
        pub fn simulate_concurrent_write(&self, kind: Interference) {
            if let Ok(mut s) = self.state.lock() {
                s.interference = Some(kind);
            }
        }

        /// Raw row including soft-deleted ones; bypasses the active predicate.
        pub fn raw_category(&self, id: i32) -> Option<Versioned<Category>> {
            self.state.lock().ok().and_then(|s| s.categories.get(&id).cloned())
        }

        pub fn raw_product(&self, id: i32) -> Option<Versioned<Product>> {
            self.state.lock().ok().and_then(|s| s.products.get(&id).cloned())
        }

        fn state(&self) -> Result<MutexGuard<'_, State>, RepoError> {
            self.state.lock().map_err(|_| RepoError::Db("in-memory catalog lock poisoned".into()))
        }
    }

    fn interfere<T>(rows: &mut BTreeMap<i32, Versioned<T>>, id: i32, kind: Option<Interference>, soft_delete: impl FnOnce(&mut T)) {
        let Some(kind) = kind else { return };
        match kind {
            Interference::Remove => {
                rows.remove(&id);
            }
            Interference::Modify | Interference::SoftDelete => {
                if let Some(row) = rows.get_mut(&id) {
                    row.version += 1;
                    if kind == Interference::SoftDelete {
                        soft_delete(&mut row.item);
                    }
                }
            }
        }
    }

    /// Look up the row for a versioned write, failing on a version mismatch.
    fn checked<'a, T>(rows: &'a mut BTreeMap<i32, Versioned<T>>, entity: &'static str, id: i32, version: i32) -> Result<&'a mut Versioned<T>, RepoError> {
        match rows.get_mut(&id) {
            Some(row) if row.version == version => Ok(row),
            _ => Err(RepoError::Conflict { entity, id }),
        }
    }

    fn slice<T>(mut items: Vec<T>, window: Window) -> Vec<T> {
        let start = usize::try_from(window.offset).unwrap_or(usize::MAX).min(items.len());
        let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);
        items.drain(start..).take(limit).collect()
    }

    #[async_trait]
    impl CategoryRepository for InMemoryCatalog {
        async fn find_by_id(&self, id: i32) -> Result<Option<Versioned<Category>>, RepoError> {
            let s = self.state()?;
            Ok(s.categories.get(&id).filter(|c| !c.item.is_deleted).cloned())
        }

        async fn exists(&self, id: i32) -> Result<bool, RepoError> {
            Ok(CategoryRepository::find_by_id(self, id).await?.is_some())
        }

        async fn count(&self, filter: &CategoryFilter) -> Result<u64, RepoError> {
            let s = self.state()?;
            Ok(s.categories.values().filter(|c| !c.item.is_deleted && filter.matches(&c.item)).count() as u64)
        }

        async fn find_many(&self, filter: &CategoryFilter, order: SortOrder<CategorySortKey>, window: Window) -> Result<Vec<Category>, RepoError> {
            let s = self.state()?;
            let mut items: Vec<Category> = s
                .categories
                .values()
                .filter(|c| !c.item.is_deleted && filter.matches(&c.item))
                .map(|c| c.item.clone())
                .collect();
            items.sort_by(|a, b| order.compare(a, b));
            Ok(slice(items, window))
        }

        async fn insert(&self, draft: CategoryDraft) -> Result<Category, RepoError> {
            let mut s = self.state()?;
            s.last_category_id += 1;
            let item = Category { id: s.last_category_id, name: draft.name, is_deleted: draft.is_deleted };
            s.categories.insert(item.id, Versioned { item: item.clone(), version: 0 });
            Ok(item)
        }

        async fn update_whole(&self, current: &Versioned<Category>, draft: CategoryDraft) -> Result<Category, RepoError> {
            let mut s = self.state()?;
            let kind = s.interference.take();
            let id = current.item.id;
            interfere(&mut s.categories, id, kind, |c| c.is_deleted = true);
            let row = checked(&mut s.categories, "category", id, current.version)?;
            row.item.name = draft.name;
            row.item.is_deleted = draft.is_deleted;
            row.version += 1;
            Ok(row.item.clone())
        }

        async fn mark_deleted(&self, current: &Versioned<Category>) -> Result<(), RepoError> {
            let mut s = self.state()?;
            let kind = s.interference.take();
            let id = current.item.id;
            interfere(&mut s.categories, id, kind, |c| c.is_deleted = true);
            let row = checked(&mut s.categories, "category", id, current.version)?;
            row.item.is_deleted = true;
            row.version += 1;
            Ok(())
        }
    }

    #[async_trait]
    impl ProductRepository for InMemoryCatalog {
        async fn find_by_id(&self, id: i32) -> Result<Option<Versioned<Product>>, RepoError> {
            let s = self.state()?;
            Ok(s.products.get(&id).filter(|p| !p.item.is_deleted).cloned())
        }

        async fn exists(&self, id: i32) -> Result<bool, RepoError> {
            Ok(ProductRepository::find_by_id(self, id).await?.is_some())
        }

        async fn count(&self, filter: &ProductFilter) -> Result<u64, RepoError> {
            let s = self.state()?;
            Ok(s.products.values().filter(|p| !p.item.is_deleted && filter.matches(&p.item)).count() as u64)
        }

        async fn find_many(&self, filter: &ProductFilter, order: SortOrder<ProductSortKey>, window: Window) -> Result<Vec<Product>, RepoError> {
            let s = self.state()?;
            let mut items: Vec<Product> = s
                .products
                .values()
                .filter(|p| !p.item.is_deleted && filter.matches(&p.item))
                .map(|p| p.item.clone())
                .collect();
            items.sort_by(|a, b| order.compare(a, b));
            Ok(slice(items, window))
        }

        async fn insert(&self, draft: ProductDraft) -> Result<Product, RepoError> {
            let mut s = self.state()?;
            s.last_product_id += 1;
            let item = Product {
                id: s.last_product_id,
                name: draft.name,
                description: draft.description,
                price: draft.price,
                is_deleted: draft.is_deleted,
            };
            s.products.insert(item.id, Versioned { item: item.clone(), version: 0 });
            Ok(item)
        }

        async fn update_whole(&self, current: &Versioned<Product>, draft: ProductDraft) -> Result<Product, RepoError> {
            let mut s = self.state()?;
            let kind = s.interference.take();
            let id = current.item.id;
            interfere(&mut s.products, id, kind, |p| p.is_deleted = true);
            let row = checked(&mut s.products, "product", id, current.version)?;
            row.item.name = draft.name;
            row.item.description = draft.description;
            row.item.price = draft.price;
            row.item.is_deleted = draft.is_deleted;
            row.version += 1;
            Ok(row.item.clone())
        }

        async fn mark_deleted(&self, current: &Versioned<Product>) -> Result<(), RepoError> {
            let mut s = self.state()?;
            let kind = s.interference.take();
            let id = current.item.id;
            interfere(&mut s.products, id, kind, |p| p.is_deleted = true);
            let row = checked(&mut s.products, "product", id, current.version)?;
            row.item.is_deleted = true;
            row.version += 1;
            Ok(())
        }

        async fn categories_of(&self, product_id: i32) -> Result<Vec<Category>, RepoError> {
            let s = self.state()?;
            Ok(s.memberships
                .range((product_id, i32::MIN)..=(product_id, i32::MAX))
                .filter_map(|(_, cid)| s.categories.get(cid))
                .filter(|c| !c.item.is_deleted)
                .map(|c| c.item.clone())
                .collect())
        }

        async fn attach_category(&self, product_id: i32, category_id: i32) -> Result<bool, RepoError> {
            let mut s = self.state()?;
            let active = s.categories.get(&category_id).is_some_and(|c| !c.item.is_deleted);
            if !active {
                return Ok(false);
            }
            s.memberships.insert((product_id, category_id));
            Ok(true)
        }

        async fn detach_category(&self, product_id: i32, category_id: i32) -> Result<bool, RepoError> {
            let mut s = self.state()?;
            Ok(s.memberships.remove(&(product_id, category_id)))
        }
    }
}
