use sea_orm::{DbBackend, EntityTrait, QueryFilter, QuerySelect, QueryTrait, RelationTrait, JoinType, ColumnTrait};

use crate::{category, product, product_category};

#[test]
fn active_category_query_filters_soft_deleted() {
    let sql = category::find_active().build(DbBackend::Postgres).to_string();
    assert!(sql.starts_with(r#"SELECT "category"."id""#), "{sql}");
    assert!(sql.contains("WHERE"), "{sql}");
    assert!(sql.contains(r#""category"."is_deleted""#), "{sql}");
}

#[test]
fn active_product_by_id_combines_both_predicates() {
    let sql = product::find_active_by_id(7).build(DbBackend::Postgres).to_string();
    assert!(sql.contains(r#""product"."is_deleted""#), "{sql}");
    assert!(sql.contains(r#""product"."id" = 7"#), "{sql}");
}

#[test]
fn plain_find_has_no_implicit_filter() {
    let sql = product::Entity::find().build(DbBackend::Postgres).to_string();
    assert!(!sql.contains("WHERE"), "{sql}");
}

#[test]
fn categories_join_through_membership_table() {
    let sql = category::find_active()
        .join(JoinType::InnerJoin, category::Relation::ProductCategory.def())
        .filter(product_category::Column::ProductId.eq(3))
        .build(DbBackend::Postgres)
        .to_string();
    assert!(sql.contains(r#"INNER JOIN "product_category""#), "{sql}");
    assert!(sql.contains(r#""product_category"."product_id" = 3"#), "{sql}");
}
