//! Filters and sort keys for list operations.
//!
//! Sort keys are parsed case-insensitively at the boundary; anything else is
//! rejected instead of silently falling back to id order.

use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::domain::{Category, Product};
use crate::errors::ServiceError;
use crate::pagination::PageRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySortKey {
    Id,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortKey {
    Id,
    Name,
    Price,
}

impl FromStr for CategorySortKey {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            other => Err(ServiceError::InvalidQuery(format!("unsupported sortBy '{}' (expected id or name)", other))),
        }
    }
}

impl FromStr for ProductSortKey {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "price" => Ok(Self::Price),
            other => Err(ServiceError::InvalidQuery(format!("unsupported sortBy '{}' (expected id, name or price)", other))),
        }
    }
}

/// Parse an optional `sortBy` value; empty strings mean "not given".
pub fn parse_sort_key<K: FromStr<Err = ServiceError>>(raw: Option<&str>) -> Result<Option<K>, ServiceError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

/// Resolved ordering. Non-id keys are tie-broken by id ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder<K> {
    pub key: K,
    pub descending: bool,
}

/// Sort keys with an identifier key used as the default order.
pub trait SortKey: Copy + PartialEq {
    const ID: Self;
}

impl SortKey for CategorySortKey {
    const ID: Self = CategorySortKey::Id;
}

impl SortKey for ProductSortKey {
    const ID: Self = ProductSortKey::Id;
}

impl<K: SortKey> SortOrder<K> {
    /// Id order is always ascending; `descending` only applies to the other keys.
    pub fn resolve(key: Option<K>, descending: bool) -> Self {
        match key {
            Some(key) if key != K::ID => Self { key, descending },
            _ => Self { key: K::ID, descending: false },
        }
    }
}

impl SortOrder<CategorySortKey> {
    pub fn compare(&self, a: &Category, b: &Category) -> Ordering {
        let primary = match self.key {
            CategorySortKey::Id => a.id.cmp(&b.id),
            CategorySortKey::Name => a.name.cmp(&b.name),
        };
        directed(primary, self.descending).then_with(|| a.id.cmp(&b.id))
    }
}

impl SortOrder<ProductSortKey> {
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let primary = match self.key {
            ProductSortKey::Id => a.id.cmp(&b.id),
            ProductSortKey::Name => a.name.cmp(&b.name),
            ProductSortKey::Price => a.price.cmp(&b.price),
        };
        directed(primary, self.descending).then_with(|| a.id.cmp(&b.id))
    }
}

fn directed(o: Ordering, descending: bool) -> Ordering {
    if descending { o.reverse() } else { o }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    /// Case-sensitive substring of the name.
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub name: Option<String>,
    /// Inclusive lower bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper bound.
    pub max_price: Option<Decimal>,
}

impl CategoryFilter {
    pub fn name_fragment(&self) -> Option<&str> { non_empty(&self.name) }

    pub fn matches(&self, c: &Category) -> bool {
        self.name_fragment().map_or(true, |n| c.name.contains(n))
    }
}

impl ProductFilter {
    pub fn name_fragment(&self) -> Option<&str> { non_empty(&self.name) }

    pub fn matches(&self, p: &Product) -> bool {
        self.name_fragment().map_or(true, |n| p.name.contains(n))
            && self.min_price.map_or(true, |min| p.price >= min)
            && self.max_price.map_or(true, |max| p.price <= max)
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|n| !n.is_empty())
}

/// `%fragment%` LIKE pattern with `\`, `%` and `_` escaped by backslash.
pub fn contains_pattern(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + 2);
    out.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

/// Everything a category list call needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryQuery {
    pub filter: CategoryFilter,
    pub sort_by: Option<CategorySortKey>,
    pub sort_desc: bool,
    pub page: PageRequest,
}

/// Everything a product list call needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub filter: ProductFilter,
    pub sort_by: Option<ProductSortKey>,
    pub sort_desc: bool,
    pub page: PageRequest,
}
