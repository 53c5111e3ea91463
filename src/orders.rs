//!
//! Order management
//! ----------------
//! In-memory order book: creation from the storefront, admin-side status and
//! fulfilment updates, and list retrieval through the shared query pipeline.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::query::{CollectionSpec, SortKey};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub price: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub status: String,
    pub total: i64,
    pub order_date: DateTime<Utc>,
    pub customer_info: CustomerInfo,
    pub items: Vec<OrderItem>,
    pub payment_status: String,
    pub shipping_address: String,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storefront order submission; all three fields are required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_info: Option<CustomerInfo>,
    pub items: Option<Vec<OrderItem>>,
    pub total: Option<i64>,
}

/// Admin-side patch: present fields overwrite, the id never changes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    pub status: Option<String>,
    pub total: Option<i64>,
    pub customer_info: Option<CustomerInfo>,
    pub items: Option<Vec<OrderItem>>,
    pub payment_status: Option<String>,
    pub shipping_address: Option<String>,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
}

#[derive(Clone, Default)]
pub struct OrderBook(Arc<RwLock<Vec<Order>>>);

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Order> {
        self.0.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<Order> {
        self.0.read().iter().find(|o| o.id == id).cloned()
    }

    pub fn create(&self, new: NewOrder) -> AppResult<Order> {
        let (Some(customer), Some(items), Some(total)) = (new.customer_info, new.items, new.total)
        else {
            return Err(AppError::user(
                "missing_fields",
                "Customer info, items, and total are required",
            ));
        };
        let now = Utc::now();
        let order = Order {
            id: format!("ORD-{}", now.timestamp_millis()),
            status: "pending".into(),
            total,
            order_date: now,
            shipping_address: customer.address.clone(),
            customer_info: customer,
            items,
            payment_status: "pending".into(),
            tracking_number: None,
            carrier: None,
            created_at: now,
            updated_at: now,
        };
        self.0.write().push(order.clone());
        info!(id = %order.id, total = order.total, "order created");
        Ok(order)
    }

    pub fn update(&self, id: &str, patch: OrderPatch) -> AppResult<Order> {
        let mut orders = self.0.write();
        let Some(o) = orders.iter_mut().find(|o| o.id == id) else {
            return Err(AppError::not_found("order_missing", "Order not found"));
        };
        if let Some(v) = patch.status { o.status = v; }
        if let Some(v) = patch.total { o.total = v; }
        if let Some(v) = patch.customer_info { o.customer_info = v; }
        if let Some(v) = patch.items { o.items = v; }
        if let Some(v) = patch.payment_status { o.payment_status = v; }
        if let Some(v) = patch.shipping_address { o.shipping_address = v; }
        if let Some(v) = patch.tracking_number { o.tracking_number = Some(v); }
        if let Some(v) = patch.carrier { o.carrier = Some(v); }
        o.updated_at = Utc::now();
        Ok(o.clone())
    }

    pub fn set_status(&self, id: &str, status: String) -> AppResult<Order> {
        self.update(id, OrderPatch { status: Some(status), ..Default::default() })
    }

    pub fn set_payment_status(&self, id: &str, status: String) -> AppResult<Order> {
        self.update(id, OrderPatch { payment_status: Some(status), ..Default::default() })
    }

    pub fn set_tracking(&self, id: &str, number: String, carrier: Option<String>) -> AppResult<Order> {
        self.update(id, OrderPatch { tracking_number: Some(number), carrier, ..Default::default() })
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        let mut orders = self.0.write();
        let before = orders.len();
        orders.retain(|o| o.id != id);
        if orders.len() == before {
            return Err(AppError::not_found("order_missing", "Order not found"));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Demo order created on first start with an empty book.
    pub fn seed_demo(&self) {
        let mut orders = self.0.write();
        if !orders.is_empty() {
            return;
        }
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).single().unwrap_or_else(Utc::now);
        orders.push(Order {
            id: "ORD-1703123456789".into(),
            status: "pending".into(),
            total: 3_000_000,
            order_date: at,
            customer_info: CustomerInfo {
                first_name: "An".into(),
                last_name: "Nguyen".into(),
                email: "user@example.com".into(),
                phone: "0123456789".into(),
                address: "123 High Street, District 1".into(),
            },
            items: vec![OrderItem {
                product_id: "prod_123".into(),
                product_name: "Chanel No. 5".into(),
                quantity: 2,
                price: 1_500_000,
                total: 3_000_000,
            }],
            payment_status: "pending".into(),
            shipping_address: "123 High Street, District 1".into(),
            tracking_number: None,
            carrier: None,
            created_at: at,
            updated_at: at,
        });
        info!("seeded demo order");
    }
}

/// Pipeline accessors for orders: search over id, customer name and email;
/// numeric sort on total, temporal sort on the date fields; date-range filter
/// over the order date.
pub fn query_spec() -> CollectionSpec<Order> {
    CollectionSpec {
        search_text: |o| {
            vec![
                o.id.clone(),
                format!("{} {}", o.customer_info.first_name, o.customer_info.last_name),
                o.customer_info.email.clone(),
            ]
        },
        field: |o, f| match f {
            "status" => Some(o.status.clone()),
            _ => None,
        },
        sort_key: |o, f| match f {
            "total" => Some(SortKey::Int(o.total)),
            "orderDate" => Some(SortKey::Time(o.order_date)),
            "createdAt" => Some(SortKey::Time(o.created_at)),
            "updatedAt" => Some(SortKey::Time(o.updated_at)),
            _ => None,
        },
        date_field: |o| Some(o.order_date),
    }
}
