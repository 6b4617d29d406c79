use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use super::domain::{Category, CategoryInput};
use super::query::{CategoryQuery, SortOrder};
use super::repository::CategoryRepository;
use crate::errors::{RepoError, ServiceError};
use crate::pagination::Page;

const ENTITY: &str = "category";

/// Category business service, independent of the web framework.
pub struct CategoryService<R: CategoryRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: CategoryRepository + ?Sized> CategoryService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Filtered, sorted page of active categories.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::catalog::CategoryService;
    /// use service::catalog::domain::CategoryInput;
    /// use service::catalog::query::{CategoryFilter, CategoryQuery};
    /// use service::catalog::repository::mock::InMemoryCatalog;
    /// let svc = CategoryService::new(Arc::new(InMemoryCatalog::new()));
    /// for name in ["Tools", "Toys", "Garden"] {
    ///     tokio_test::block_on(svc.create(CategoryInput { id: 0, name: name.into(), is_deleted: false })).unwrap();
    /// }
    /// let query = CategoryQuery { filter: CategoryFilter { name: Some("To".into()) }, ..Default::default() };
    /// let page = tokio_test::block_on(svc.list(query)).unwrap();
    /// assert_eq!(page.total_items, 2);
    /// assert_eq!(page.total_pages, 1);
    /// ```
    #[instrument(skip(self, query), fields(page = query.page.page_number, size = query.page.page_size))]
    pub async fn list(&self, query: CategoryQuery) -> Result<Page<Category>, ServiceError> {
        let order = SortOrder::resolve(query.sort_by, query.sort_desc);
        let total = self.repo.count(&query.filter).await?;
        let items = self.repo.find_many(&query.filter, order, query.page.window()).await?;
        Ok(Page::new(query.page, total, items))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<Category, ServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .map(|v| v.item)
            .ok_or_else(|| ServiceError::not_found(ENTITY, id))
    }

    /// Store a new category; any client-supplied id is ignored.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::catalog::CategoryService;
    /// use service::catalog::domain::CategoryInput;
    /// use service::catalog::repository::mock::InMemoryCatalog;
    /// let svc = CategoryService::new(Arc::new(InMemoryCatalog::new()));
    /// let created = tokio_test::block_on(svc.create(CategoryInput { id: 42, name: "Tools".into(), is_deleted: false })).unwrap();
    /// assert_eq!(created.id, 1);
    /// assert_eq!(tokio_test::block_on(svc.get(1)).unwrap().name, "Tools");
    /// ```
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CategoryInput) -> Result<Category, ServiceError> {
        let created = self.repo.insert(input.into()).await?;
        info!(id = created.id, "category_created");
        Ok(created)
    }

    /// Overwrite name and flag. The path id must equal the body id.
    #[instrument(skip(self, input), fields(body_id = input.id))]
    pub async fn update(&self, id: i32, input: CategoryInput) -> Result<Category, ServiceError> {
        if id != input.id {
            return Err(ServiceError::BadRequest(format!("path id {} does not match body id {}", id, input.id)));
        }
        let current = self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found(ENTITY, id))?;
        match self.repo.update_whole(&current, input.into()).await {
            Ok(updated) => {
                info!(id, "category_updated");
                Ok(updated)
            }
            Err(e) => Err(self.settle(id, e).await),
        }
    }

    /// Soft delete.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let current = self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found(ENTITY, id))?;
        match self.repo.mark_deleted(&current).await {
            Ok(()) => {
                info!(id, "category_deleted");
                Ok(())
            }
            Err(e) => Err(self.settle(id, e).await),
        }
    }

    /// A conflict on a row that has since disappeared is reported as not found.
    async fn settle(&self, id: i32, err: RepoError) -> ServiceError {
        if !matches!(err, RepoError::Conflict { .. }) {
            return err.into();
        }
        match self.repo.exists(id).await {
            Ok(false) => {
                warn!(id, "category vanished during write");
                ServiceError::not_found(ENTITY, id)
            }
            Ok(true) => {
                error!(id, "concurrent modification of category");
                err.into()
            }
            Err(e) => e.into(),
        }
    }
}
