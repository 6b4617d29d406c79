use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use super::domain::{Category, Product, ProductInput};
use super::query::{ProductQuery, SortOrder};
use super::repository::ProductRepository;
use crate::errors::{RepoError, ServiceError};
use crate::pagination::Page;

const ENTITY: &str = "product";

/// Product business service, including category membership.
pub struct ProductService<R: ProductRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: ProductRepository + ?Sized> ProductService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Filtered, sorted page of active products.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use rust_decimal::Decimal;
    /// use service::catalog::ProductService;
    /// use service::catalog::domain::ProductInput;
    /// use service::catalog::query::{ProductFilter, ProductQuery, ProductSortKey};
    /// use service::catalog::repository::mock::InMemoryCatalog;
    /// let svc = ProductService::new(Arc::new(InMemoryCatalog::new()));
    /// for (name, price) in [("Hammer", 25), ("Pliers", 12), ("Tape", 5)] {
    ///     let input = ProductInput { id: 0, name: name.into(), description: String::new(), price: Decimal::from(price), is_deleted: false };
    ///     tokio_test::block_on(svc.create(input)).unwrap();
    /// }
    /// let query = ProductQuery {
    ///     filter: ProductFilter { min_price: Some(Decimal::from(10)), ..Default::default() },
    ///     sort_by: Some(ProductSortKey::Price),
    ///     ..Default::default()
    /// };
    /// let page = tokio_test::block_on(svc.list(query)).unwrap();
    /// let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
    /// assert_eq!(names, ["Pliers", "Hammer"]);
    /// ```
    #[instrument(skip(self, query), fields(page = query.page.page_number, size = query.page.page_size))]
    pub async fn list(&self, query: ProductQuery) -> Result<Page<Product>, ServiceError> {
        let order = SortOrder::resolve(query.sort_by, query.sort_desc);
        let total = self.repo.count(&query.filter).await?;
        let items = self.repo.find_many(&query.filter, order, query.page.window()).await?;
        Ok(Page::new(query.page, total, items))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<Product, ServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .map(|v| v.item)
            .ok_or_else(|| ServiceError::not_found(ENTITY, id))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: ProductInput) -> Result<Product, ServiceError> {
        let created = self.repo.insert(input.into()).await?;
        info!(id = created.id, "product_created");
        Ok(created)
    }

    /// Overwrite name, description, price and flag. The path id must equal the body id.
    #[instrument(skip(self, input), fields(body_id = input.id))]
    pub async fn update(&self, id: i32, input: ProductInput) -> Result<Product, ServiceError> {
        if id != input.id {
            return Err(ServiceError::BadRequest(format!("path id {} does not match body id {}", id, input.id)));
        }
        let current = self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found(ENTITY, id))?;
        match self.repo.update_whole(&current, input.into()).await {
            Ok(updated) => {
                info!(id, "product_updated");
                Ok(updated)
            }
            Err(e) => Err(self.settle(id, e).await),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let current = self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found(ENTITY, id))?;
        match self.repo.mark_deleted(&current).await {
            Ok(()) => {
                info!(id, "product_deleted");
                Ok(())
            }
            Err(e) => Err(self.settle(id, e).await),
        }
    }

    /// Active categories of an active product.
    #[instrument(skip(self))]
    pub async fn categories(&self, id: i32) -> Result<Vec<Category>, ServiceError> {
        self.require(id).await?;
        Ok(self.repo.categories_of(id).await?)
    }

    /// Add the product to a category. Repeating the call is a no-op.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use rust_decimal::Decimal;
    /// use service::catalog::{CategoryService, ProductService};
    /// use service::catalog::domain::{CategoryInput, ProductInput};
    /// use service::catalog::repository::mock::InMemoryCatalog;
    /// let store = Arc::new(InMemoryCatalog::new());
    /// let categories = CategoryService::new(store.clone());
    /// let products = ProductService::new(store);
    /// let c = tokio_test::block_on(categories.create(CategoryInput { id: 0, name: "Tools".into(), is_deleted: false })).unwrap();
    /// let p = tokio_test::block_on(products.create(ProductInput { id: 0, name: "Hammer".into(), description: String::new(), price: Decimal::from(25), is_deleted: false })).unwrap();
    /// tokio_test::block_on(products.attach_category(p.id, c.id)).unwrap();
    /// tokio_test::block_on(products.attach_category(p.id, c.id)).unwrap();
    /// assert_eq!(tokio_test::block_on(products.categories(p.id)).unwrap(), vec![c]);
    /// ```
    #[instrument(skip(self))]
    pub async fn attach_category(&self, id: i32, category_id: i32) -> Result<(), ServiceError> {
        self.require(id).await?;
        if !self.repo.attach_category(id, category_id).await? {
            return Err(ServiceError::not_found("category", category_id));
        }
        info!(id, category_id, "product_category_attached");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn detach_category(&self, id: i32, category_id: i32) -> Result<(), ServiceError> {
        self.require(id).await?;
        if !self.repo.detach_category(id, category_id).await? {
            return Err(ServiceError::NotFound(format!("product {} is not in category {}", id, category_id)));
        }
        info!(id, category_id, "product_category_detached");
        Ok(())
    }

    async fn require(&self, id: i32) -> Result<(), ServiceError> {
        if self.repo.exists(id).await? { Ok(()) } else { Err(ServiceError::not_found(ENTITY, id)) }
    }

    async fn settle(&self, id: i32, err: RepoError) -> ServiceError {
        if !matches!(err, RepoError::Conflict { .. }) {
            return err.into();
        }
        match self.repo.exists(id).await {
            Ok(false) => {
                warn!(id, "product vanished during write");
                ServiceError::not_found(ENTITY, id)
            }
            Ok(true) => {
                error!(id, "concurrent modification of product");
                err.into()
            }
            Err(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::CategoryInput;
    use crate::catalog::query::{ProductFilter, ProductSortKey};
    use crate::catalog::repository::mock::{InMemoryCatalog, Interference};
    use crate::catalog::CategoryService;
    use crate::pagination::PageRequest;
    use rust_decimal::Decimal;

    fn input(id: i32, name: &str, price: Decimal) -> ProductInput {
        ProductInput { id, name: name.into(), description: format!("{} description", name), price, is_deleted: false }
    }

    fn setup() -> (Arc<InMemoryCatalog>, ProductService<InMemoryCatalog>) {
        let repo = Arc::new(InMemoryCatalog::new());
        (repo.clone(), ProductService::new(repo))
    }

    #[tokio::test]
    async fn create_then_get_returns_same_attributes() {
        let (_, svc) = setup();
        let created = svc.create(input(77, "Hammer", Decimal::new(1999, 2))).await.unwrap();
        assert_eq!(created.id, 1);
        let loaded = svc.get(created.id).await.unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.description, "Hammer description");
    }

    #[tokio::test]
    async fn second_page_of_fifteen() {
        let (_, svc) = setup();
        for i in 1..=15 {
            svc.create(input(0, &format!("p{:02}", i), Decimal::from(i))).await.unwrap();
        }
        let query = ProductQuery { page: PageRequest { page_number: 2, page_size: 10 }, ..Default::default() };
        let page = svc.list(query).await.unwrap();
        assert_eq!(page.total_items, 15);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items.first().map(|p| p.id), Some(11));
    }

    #[tokio::test]
    async fn non_positive_page_size_yields_empty_page() {
        let (_, svc) = setup();
        svc.create(input(0, "Hammer", Decimal::from(5))).await.unwrap();
        let page = svc.list(ProductQuery { page: PageRequest { page_number: 1, page_size: 0 }, ..Default::default() }).await.unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn mismatched_update_leaves_row_untouched() {
        let (repo, svc) = setup();
        for i in 1..=3 {
            svc.create(input(0, &format!("p{}", i), Decimal::from(i))).await.unwrap();
        }
        let res = svc.update(3, input(4, "changed", Decimal::from(100))).await;
        assert!(matches!(res, Err(ServiceError::BadRequest(_))));
        let row = repo.raw_product(3).unwrap();
        assert_eq!(row.item.name, "p3");
        assert_eq!(row.version, 0);
    }

    #[tokio::test]
    async fn price_range_filter_sorted_by_price() {
        let (_, svc) = setup();
        for (name, cents) in [("a", 2500), ("b", 1000), ("c", 999), ("d", 2000), ("e", 1500)] {
            svc.create(input(0, name, Decimal::new(cents, 2))).await.unwrap();
        }
        let query = ProductQuery {
            filter: ProductFilter { min_price: Some(Decimal::from(10)), max_price: Some(Decimal::from(20)), ..Default::default() },
            sort_by: Some(ProductSortKey::Price),
            ..Default::default()
        };
        let page = svc.list(query).await.unwrap();
        let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "e", "d"]);
        assert!(page.items.iter().all(|p| p.price >= Decimal::from(10) && p.price <= Decimal::from(20)));
    }

    #[tokio::test]
    async fn update_overwrites_every_mutable_field() {
        let (_, svc) = setup();
        svc.create(input(0, "Hammer", Decimal::from(10))).await.unwrap();
        let body = ProductInput { id: 1, name: "Mallet".into(), description: String::new(), price: Decimal::new(1250, 2), is_deleted: false };
        svc.update(1, body.clone()).await.unwrap();
        let loaded = svc.get(1).await.unwrap();
        assert_eq!(loaded, Product { id: 1, name: body.name, description: body.description, price: body.price, is_deleted: false });
    }

    #[tokio::test]
    async fn concurrent_writes_are_settled_by_existence() {
        let (repo, svc) = setup();
        svc.create(input(0, "Hammer", Decimal::from(10))).await.unwrap();
        repo.simulate_concurrent_write(Interference::Modify);
        assert!(matches!(svc.delete(1).await, Err(ServiceError::Conflict(_))));
        repo.simulate_concurrent_write(Interference::Remove);
        assert!(matches!(svc.update(1, input(1, "x", Decimal::ONE)).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn membership_requires_active_rows() {
        let repo = Arc::new(InMemoryCatalog::new());
        let categories = CategoryService::new(repo.clone());
        let products = ProductService::new(repo);
        let tools = categories.create(CategoryInput { id: 0, name: "Tools".into(), is_deleted: false }).await.unwrap();
        let garden = categories.create(CategoryInput { id: 0, name: "Garden".into(), is_deleted: false }).await.unwrap();
        let p = products.create(input(0, "Hammer", Decimal::from(10))).await.unwrap();

        assert!(matches!(products.attach_category(99, tools.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(products.attach_category(p.id, 99).await, Err(ServiceError::NotFound(_))));

        products.attach_category(p.id, garden.id).await.unwrap();
        products.attach_category(p.id, tools.id).await.unwrap();
        let ids: Vec<i32> = products.categories(p.id).await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![tools.id, garden.id]);

        // soft-deleted categories drop out of the membership list
        categories.delete(garden.id).await.unwrap();
        assert_eq!(products.categories(p.id).await.unwrap(), vec![tools.clone()]);
        assert!(matches!(products.attach_category(p.id, garden.id).await, Err(ServiceError::NotFound(_))));

        products.detach_category(p.id, tools.id).await.unwrap();
        assert!(matches!(products.detach_category(p.id, tools.id).await, Err(ServiceError::NotFound(_))));
        assert!(products.categories(p.id).await.unwrap().is_empty());
    }
}
