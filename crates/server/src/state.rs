use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::catalog::repo::seaorm::{SeaOrmCategoryRepository, SeaOrmProductRepository};
use service::catalog::repository::mock::InMemoryCatalog;
use service::catalog::repository::{CategoryRepository, ProductRepository};
use service::catalog::{CategoryService, ProductService};

/// Shared handler state; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<CategoryService<dyn CategoryRepository>>,
    pub products: Arc<ProductService<dyn ProductRepository>>,
}

impl AppState {
    pub fn new(categories: Arc<dyn CategoryRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self {
            categories: Arc::new(CategoryService::new(categories)),
            products: Arc::new(ProductService::new(products)),
        }
    }

    /// PostgreSQL-backed state sharing one connection pool.
    pub fn with_db(db: DatabaseConnection) -> Self {
        Self::new(
            Arc::new(SeaOrmCategoryRepository { db: db.clone() }),
            Arc::new(SeaOrmProductRepository { db }),
        )
    }

    /// State over a process-local store.
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryCatalog::new());
        Self::new(store.clone(), store)
    }
}
