use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select, Set, TransactionTrait,
};
use tracing::debug;

use models::{category, product, product_category};

use crate::catalog::domain::{Category, CategoryDraft, Product, ProductDraft, Versioned};
use crate::catalog::query::{contains_pattern, CategoryFilter, CategorySortKey, ProductFilter, ProductSortKey, SortOrder};
use crate::catalog::repository::{CategoryRepository, ProductRepository};
use crate::errors::RepoError;
use crate::pagination::Window;

/// Backslash, the escape character used by `contains_pattern`.
const LIKE_ESCAPE: char = '\\';

fn name_like(fragment: &str) -> LikeExpr {
    LikeExpr::new(contains_pattern(fragment)).escape(LIKE_ESCAPE)
}

fn filtered_categories(filter: &CategoryFilter) -> Select<category::Entity> {
    let mut finder = category::find_active();
    if let Some(n) = filter.name_fragment() {
        finder = finder.filter(category::Column::Name.like(name_like(n)));
    }
    finder
}

fn filtered_products(filter: &ProductFilter) -> Select<product::Entity> {
    let mut finder = product::find_active();
    if let Some(n) = filter.name_fragment() {
        finder = finder.filter(product::Column::Name.like(name_like(n)));
    }
    if let Some(min) = filter.min_price {
        finder = finder.filter(product::Column::Price.gte(min));
    }
    if let Some(max) = filter.max_price {
        finder = finder.filter(product::Column::Price.lte(max));
    }
    finder
}

fn ordered<E, C>(finder: Select<E>, column: C, descending: bool, id: C) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    let finder = if descending { finder.order_by_desc(column) } else { finder.order_by_asc(column) };
    finder.order_by_asc(id)
}

/// SeaORM-backed category repository.
pub struct SeaOrmCategoryRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Versioned<Category>>, RepoError> {
        let found = category::find_active_by_id(id).one(&self.db).await?;
        Ok(found.map(Versioned::from))
    }

    async fn exists(&self, id: i32) -> Result<bool, RepoError> {
        Ok(category::find_active_by_id(id).count(&self.db).await? > 0)
    }

    async fn count(&self, filter: &CategoryFilter) -> Result<u64, RepoError> {
        Ok(filtered_categories(filter).count(&self.db).await?)
    }

    async fn find_many(&self, filter: &CategoryFilter, order: SortOrder<CategorySortKey>, window: Window) -> Result<Vec<Category>, RepoError> {
        let column = match order.key {
            CategorySortKey::Id => category::Column::Id,
            CategorySortKey::Name => category::Column::Name,
        };
        let rows = ordered(filtered_categories(filter), column, order.descending, category::Column::Id)
            .offset(window.offset)
            .limit(window.limit)
            .all(&self.db)
            .await?;
        debug!(count = rows.len(), offset = window.offset, limit = window.limit, "categories fetched");
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn insert(&self, draft: CategoryDraft) -> Result<Category, RepoError> {
        let created = category::create(&self.db, &draft.name, draft.is_deleted).await?;
        Ok(created.into())
    }

    async fn update_whole(&self, current: &Versioned<Category>, draft: CategoryDraft) -> Result<Category, RepoError> {
        let id = current.item.id;
        let res = category::Entity::update_many()
            .col_expr(category::Column::Name, Expr::value(draft.name.clone()))
            .col_expr(category::Column::IsDeleted, Expr::value(draft.is_deleted))
            .col_expr(category::Column::RowVersion, Expr::col(category::Column::RowVersion).add(1))
            .filter(category::Column::Id.eq(id))
            .filter(category::Column::RowVersion.eq(current.version))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(RepoError::Conflict { entity: "category", id });
        }
        Ok(Category { id, name: draft.name, is_deleted: draft.is_deleted })
    }

    async fn mark_deleted(&self, current: &Versioned<Category>) -> Result<(), RepoError> {
        let id = current.item.id;
        let res = category::Entity::update_many()
            .col_expr(category::Column::IsDeleted, Expr::value(true))
            .col_expr(category::Column::RowVersion, Expr::col(category::Column::RowVersion).add(1))
            .filter(category::Column::Id.eq(id))
            .filter(category::Column::RowVersion.eq(current.version))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(RepoError::Conflict { entity: "category", id });
        }
        Ok(())
    }
}

/// SeaORM-backed product repository, including the join table.
pub struct SeaOrmProductRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Versioned<Product>>, RepoError> {
        let found = product::find_active_by_id(id).one(&self.db).await?;
        Ok(found.map(Versioned::from))
    }

    async fn exists(&self, id: i32) -> Result<bool, RepoError> {
        Ok(product::find_active_by_id(id).count(&self.db).await? > 0)
    }

    async fn count(&self, filter: &ProductFilter) -> Result<u64, RepoError> {
        Ok(filtered_products(filter).count(&self.db).await?)
    }

    async fn find_many(&self, filter: &ProductFilter, order: SortOrder<ProductSortKey>, window: Window) -> Result<Vec<Product>, RepoError> {
        let column = match order.key {
            ProductSortKey::Id => product::Column::Id,
            ProductSortKey::Name => product::Column::Name,
            ProductSortKey::Price => product::Column::Price,
        };
        let rows = ordered(filtered_products(filter), column, order.descending, product::Column::Id)
            .offset(window.offset)
            .limit(window.limit)
            .all(&self.db)
            .await?;
        debug!(count = rows.len(), offset = window.offset, limit = window.limit, "products fetched");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn insert(&self, draft: ProductDraft) -> Result<Product, RepoError> {
        let created = product::create(&self.db, &draft.name, &draft.description, draft.price, draft.is_deleted).await?;
        Ok(created.into())
    }

    async fn update_whole(&self, current: &Versioned<Product>, draft: ProductDraft) -> Result<Product, RepoError> {
        let id = current.item.id;
        let res = product::Entity::update_many()
            .col_expr(product::Column::Name, Expr::value(draft.name.clone()))
            .col_expr(product::Column::Description, Expr::value(draft.description.clone()))
            .col_expr(product::Column::Price, Expr::value(draft.price))
            .col_expr(product::Column::IsDeleted, Expr::value(draft.is_deleted))
            .col_expr(product::Column::RowVersion, Expr::col(product::Column::RowVersion).add(1))
            .filter(product::Column::Id.eq(id))
            .filter(product::Column::RowVersion.eq(current.version))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(RepoError::Conflict { entity: "product", id });
        }
        Ok(Product { id, name: draft.name, description: draft.description, price: draft.price, is_deleted: draft.is_deleted })
    }

    async fn mark_deleted(&self, current: &Versioned<Product>) -> Result<(), RepoError> {
        let id = current.item.id;
        let res = product::Entity::update_many()
            .col_expr(product::Column::IsDeleted, Expr::value(true))
            .col_expr(product::Column::RowVersion, Expr::col(product::Column::RowVersion).add(1))
            .filter(product::Column::Id.eq(id))
            .filter(product::Column::RowVersion.eq(current.version))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(RepoError::Conflict { entity: "product", id });
        }
        Ok(())
    }

    async fn categories_of(&self, product_id: i32) -> Result<Vec<Category>, RepoError> {
        let rows = category::find_active()
            .join(JoinType::InnerJoin, category::Relation::ProductCategory.def())
            .filter(product_category::Column::ProductId.eq(product_id))
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn attach_category(&self, product_id: i32, category_id: i32) -> Result<bool, RepoError> {
        let txn = self.db.begin().await?;
        if category::find_active_by_id(category_id).count(&txn).await? == 0 {
            txn.rollback().await?;
            return Ok(false);
        }
        let existing = product_category::Entity::find_by_id((product_id, category_id)).one(&txn).await?;
        if existing.is_none() {
            product_category::ActiveModel { product_id: Set(product_id), category_id: Set(category_id) }
                .insert(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(true)
    }

    async fn detach_category(&self, product_id: i32, category_id: i32) -> Result<bool, RepoError> {
        let res = product_category::Entity::delete_by_id((product_id, category_id)).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}
