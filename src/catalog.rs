//!
//! Product catalog
//! ---------------
//! In-memory product collection with CRUD, stock adjustment and the seed
//! dataset used on first start. List retrieval goes through the shared query
//! pipeline via `query_spec()`.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::query::{CollectionSpec, SortKey};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub original_price: i64,
    pub featured: bool,
    pub is_new: bool,
    pub category: String,
    pub brand: String,
    pub size: String,
    pub stock: i64,
    pub images: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload. Everything is optional; `create` insists on name
/// and price, `update` applies whatever is present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub original_price: Option<i64>,
    pub featured: Option<bool>,
    pub is_new: Option<bool>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub stock: Option<i64>,
    pub images: Option<Vec<String>>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockOp {
    Add,
    Subtract,
    Set,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub id: &'static str,
    pub name: &'static str,
    pub count: usize,
}

const CATEGORIES: &[(&str, &str)] =
    &[("luxury", "Luxury"), ("mens", "Men"), ("womens", "Women"), ("unisex", "Unisex")];

#[derive(Clone, Default)]
pub struct ProductCatalog(Arc<RwLock<Vec<Product>>>);

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Product> {
        self.0.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<Product> {
        self.0.read().iter().find(|p| p.id == id).cloned()
    }

    pub fn create(&self, draft: ProductDraft) -> AppResult<Product> {
        let (Some(name), Some(price)) = (draft.name.clone(), draft.price) else {
            return Err(AppError::user("missing_fields", "Name and price are required"));
        };
        let now = Utc::now();
        let product = Product {
            id: format!("prod_{}", Uuid::new_v4()),
            name,
            description: draft.description.unwrap_or_default(),
            price,
            original_price: draft.original_price.unwrap_or(price),
            featured: draft.featured.unwrap_or(false),
            is_new: draft.is_new.unwrap_or(false),
            category: draft.category.unwrap_or_default(),
            brand: draft.brand.unwrap_or_default(),
            size: draft.size.unwrap_or_default(),
            stock: draft.stock.unwrap_or(0),
            images: draft.images.unwrap_or_default(),
            status: draft.status.unwrap_or_else(|| "active".to_string()),
            created_at: now,
            updated_at: now,
        };
        self.0.write().push(product.clone());
        info!(id = %product.id, "product created");
        Ok(product)
    }

    /// Patch semantics: present fields overwrite, the id never changes.
    pub fn update(&self, id: &str, draft: ProductDraft) -> AppResult<Product> {
        let mut products = self.0.write();
        let Some(p) = products.iter_mut().find(|p| p.id == id) else {
            return Err(AppError::not_found("product_missing", "Product not found"));
        };
        if let Some(v) = draft.name { p.name = v; }
        if let Some(v) = draft.description { p.description = v; }
        if let Some(v) = draft.price { p.price = v; }
        if let Some(v) = draft.original_price { p.original_price = v; }
        if let Some(v) = draft.featured { p.featured = v; }
        if let Some(v) = draft.is_new { p.is_new = v; }
        if let Some(v) = draft.category { p.category = v; }
        if let Some(v) = draft.brand { p.brand = v; }
        if let Some(v) = draft.size { p.size = v; }
        if let Some(v) = draft.stock { p.stock = v; }
        if let Some(v) = draft.images { p.images = v; }
        if let Some(v) = draft.status { p.status = v; }
        p.updated_at = Utc::now();
        Ok(p.clone())
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        let mut products = self.0.write();
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(AppError::not_found("product_missing", "Product not found"));
        }
        Ok(())
    }

    /// Remove every listed id; unknown ids are skipped. Returns the removed
    /// products so the caller can report what actually went away.
    pub fn bulk_delete(&self, ids: &[String]) -> Vec<Product> {
        let mut products = self.0.write();
        let mut removed = Vec::new();
        products.retain(|p| {
            if ids.contains(&p.id) {
                removed.push(p.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Adjust stock; `Subtract` floors at zero.
    pub fn set_stock(&self, id: &str, amount: i64, op: StockOp) -> AppResult<Product> {
        let mut products = self.0.write();
        let Some(p) = products.iter_mut().find(|p| p.id == id) else {
            return Err(AppError::not_found("product_missing", "Product not found"));
        };
        p.stock = match op {
            StockOp::Add => p.stock + amount,
            StockOp::Subtract => (p.stock - amount).max(0),
            StockOp::Set => amount,
        };
        p.updated_at = Utc::now();
        Ok(p.clone())
    }

    pub fn featured(&self) -> Vec<Product> {
        self.0.read().iter().filter(|p| p.featured && p.status == "active").cloned().collect()
    }

    pub fn newest(&self) -> Vec<Product> {
        self.0.read().iter().filter(|p| p.is_new && p.status == "active").cloned().collect()
    }

    pub fn category_counts(&self) -> Vec<CategorySummary> {
        let products = self.0.read();
        CATEGORIES
            .iter()
            .map(|(id, name)| CategorySummary {
                id,
                name,
                count: products.iter().filter(|p| p.category == *id).count(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Demo inventory created on first start with an empty catalog.
    pub fn seed_demo(&self) {
        let mut products = self.0.write();
        if !products.is_empty() {
            return;
        }
        let day = |d: u32| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).single().unwrap_or_else(Utc::now);
        products.extend([
            Product {
                id: "prod_123".into(),
                name: "Chanel No. 5".into(),
                description: "The classic Chanel fragrance with jasmine and ylang-ylang notes".into(),
                price: 1_500_000,
                original_price: 1_800_000,
                featured: true,
                is_new: false,
                category: "luxury".into(),
                brand: "Chanel".into(),
                size: "100ml".into(),
                stock: 10,
                images: vec!["/images/chanel-no5.jpg".into()],
                status: "active".into(),
                created_at: day(1),
                updated_at: day(1),
            },
            Product {
                id: "prod_124".into(),
                name: "Dior Sauvage".into(),
                description: "A bold masculine scent with bergamot and pepper notes".into(),
                price: 1_200_000,
                original_price: 1_400_000,
                featured: false,
                is_new: true,
                category: "mens".into(),
                brand: "Dior".into(),
                size: "100ml".into(),
                stock: 15,
                images: vec!["/images/dior-sauvage.jpg".into()],
                status: "active".into(),
                created_at: day(10),
                updated_at: day(10),
            },
            Product {
                id: "prod_125".into(),
                name: "Tom Ford Black Orchid".into(),
                description: "A seductive blend of black orchid and vanilla".into(),
                price: 2_200_000,
                original_price: 2_500_000,
                featured: true,
                is_new: true,
                category: "unisex".into(),
                brand: "Tom Ford".into(),
                size: "50ml".into(),
                stock: 8,
                images: vec!["/images/tom-ford-black-orchid.jpg".into()],
                status: "active".into(),
                created_at: day(15),
                updated_at: day(15),
            },
        ]);
        info!(count = products.len(), "seeded demo catalog");
    }
}

/// Pipeline accessors for products: search over name/description/brand,
/// exact filters on category and status, numeric sort for price and stock.
pub fn query_spec() -> CollectionSpec<Product> {
    CollectionSpec {
        search_text: |p| vec![p.name.clone(), p.description.clone(), p.brand.clone()],
        field: |p, f| match f {
            "category" => Some(p.category.clone()),
            "status" => Some(p.status.clone()),
            _ => None,
        },
        sort_key: |p, f| match f {
            "price" => Some(SortKey::Int(p.price)),
            "stock" => Some(SortKey::Int(p.stock)),
            "name" => Some(SortKey::Text(p.name.clone())),
            "createdAt" => Some(SortKey::Time(p.created_at)),
            "updatedAt" => Some(SortKey::Time(p.updated_at)),
            _ => None,
        },
        date_field: |p| Some(p.created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> ProductCatalog {
        let catalog = ProductCatalog::new();
        catalog.seed_demo();
        catalog
    }

    #[test]
    fn create_requires_name_and_price() {
        let catalog = ProductCatalog::new();
        let err = catalog.create(ProductDraft { name: Some("X".into()), ..Default::default() }).unwrap_err();
        assert_eq!(err.http_status(), 400);
        let p = catalog
            .create(ProductDraft { name: Some("X".into()), price: Some(100), ..Default::default() })
            .unwrap();
        assert!(p.id.starts_with("prod_"));
        assert_eq!(p.status, "active");
        assert_eq!(p.original_price, 100);
    }

    #[test]
    fn update_patches_and_preserves_id() {
        let catalog = seeded();
        let updated = catalog
            .update("prod_123", ProductDraft { price: Some(1_600_000), ..Default::default() })
            .unwrap();
        assert_eq!(updated.id, "prod_123");
        assert_eq!(updated.price, 1_600_000);
        assert_eq!(updated.name, "Chanel No. 5");
        assert!(updated.updated_at > updated.created_at);
    }

    #[test]
    fn subtract_stock_floors_at_zero() {
        let catalog = seeded();
        let p = catalog.set_stock("prod_125", 100, StockOp::Subtract).unwrap();
        assert_eq!(p.stock, 0);
        let p = catalog.set_stock("prod_125", 5, StockOp::Add).unwrap();
        assert_eq!(p.stock, 5);
        let p = catalog.set_stock("prod_125", 2, StockOp::Set).unwrap();
        assert_eq!(p.stock, 2);
    }

    #[test]
    fn bulk_delete_skips_unknown_ids() {
        let catalog = seeded();
        let removed =
            catalog.bulk_delete(&["prod_123".to_string(), "prod_999".to_string()]);
        assert_eq!(removed.len(), 1);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn featured_and_newest_respect_status() {
        let catalog = seeded();
        catalog.update("prod_125", ProductDraft { status: Some("archived".into()), ..Default::default() }).unwrap();
        let featured: Vec<_> = catalog.featured().into_iter().map(|p| p.id).collect();
        assert_eq!(featured, vec!["prod_123"]);
        let newest: Vec<_> = catalog.newest().into_iter().map(|p| p.id).collect();
        assert_eq!(newest, vec!["prod_124"]);
    }

    #[test]
    fn category_counts_cover_the_fixed_list() {
        let catalog = seeded();
        let counts = catalog.category_counts();
        assert_eq!(counts.len(), 4);
        let luxury = counts.iter().find(|c| c.id == "luxury").unwrap();
        assert_eq!(luxury.count, 1);
        let womens = counts.iter().find(|c| c.id == "womens").unwrap();
        assert_eq!(womens.count, 0);
    }
}
