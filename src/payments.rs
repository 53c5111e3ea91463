//!
//! Payment processing (mock)
//! -------------------------
//! Payment-intent lifecycle against an in-memory ledger: create, process,
//! admin confirmation, refunds, plus history (via the shared query pipeline)
//! and a small analytics rollup. No real gateway is involved; the status a
//! payment reports is exactly the status the ledger holds.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::orders::CustomerInfo;
use crate::query::{CollectionSpec, SortKey};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refund {
    pub refund_id: String,
    pub payment_id: String,
    pub amount: i64,
    pub reason: Option<String>,
    pub status: String,
    pub refunded_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub order_id: String,
    pub status: String,
    pub client_secret: String,
    pub customer_info: Option<CustomerInfo>,
    pub payment_method: Option<String>,
    pub payment_details: Option<Value>,
    pub processed_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub confirmed_by: Option<String>,
    pub confirmation_data: Option<Value>,
    pub refunds: Vec<Refund>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethod {
    pub id: &'static str,
    pub name: &'static str,
}

const METHODS: &[PaymentMethod] = &[
    PaymentMethod { id: "bank_transfer", name: "Bank transfer" },
    PaymentMethod { id: "momo", name: "MoMo" },
    PaymentMethod { id: "zalopay", name: "ZaloPay" },
    PaymentMethod { id: "vnpay", name: "VNPay" },
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPaymentIntent {
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub order_id: Option<String>,
    pub customer_info: Option<CustomerInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAnalytics {
    pub total_payments: usize,
    pub total_amount: i64,
    pub status_breakdown: StatusBreakdown,
    pub average_amount: f64,
}

fn opaque_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

#[derive(Clone, Default)]
pub struct PaymentLedger(Arc<RwLock<Vec<PaymentIntent>>>);

impl PaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn methods() -> &'static [PaymentMethod] {
        METHODS
    }

    pub fn snapshot(&self) -> Vec<PaymentIntent> {
        self.0.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<PaymentIntent> {
        self.0.read().iter().find(|p| p.id == id).cloned()
    }

    pub fn create_intent(&self, new: NewPaymentIntent) -> AppResult<PaymentIntent> {
        let (Some(amount), Some(order_id)) = (new.amount, new.order_id) else {
            return Err(AppError::user("missing_fields", "Amount and orderId are required"));
        };
        let id = opaque_id("pi");
        let intent = PaymentIntent {
            client_secret: format!("{id}_secret_{}", Uuid::new_v4().simple()),
            id,
            amount,
            currency: new.currency.unwrap_or_else(|| "VND".to_string()),
            order_id,
            status: "requires_payment_method".into(),
            customer_info: new.customer_info,
            payment_method: None,
            payment_details: None,
            processed_at: None,
            confirmed_at: None,
            confirmed_by: None,
            confirmation_data: None,
            refunds: Vec::new(),
            created_at: Utc::now(),
        };
        self.0.write().push(intent.clone());
        info!(id = %intent.id, order = %intent.order_id, "payment intent created");
        Ok(intent)
    }

    /// Mark an intent as processing and record how it is being paid.
    pub fn process(&self, id: &str, method: Option<String>, details: Option<Value>) -> AppResult<PaymentIntent> {
        self.with_intent(id, |p| {
            p.status = "processing".into();
            p.payment_method = method;
            p.payment_details = details;
            p.processed_at = Some(Utc::now());
        })
    }

    /// Manual admin verification: marks the intent completed and records who
    /// confirmed it.
    pub fn confirm(&self, id: &str, data: Option<Value>, admin_id: &str) -> AppResult<PaymentIntent> {
        self.with_intent(id, |p| {
            p.status = "completed".into();
            p.confirmation_data = data;
            p.confirmed_at = Some(Utc::now());
            p.confirmed_by = Some(admin_id.to_string());
        })
    }

    /// Initiate a refund; defaults to the full amount when none is given.
    pub fn refund(
        &self,
        id: &str,
        amount: Option<i64>,
        reason: Option<String>,
        admin_id: &str,
    ) -> AppResult<Refund> {
        let mut payments = self.0.write();
        let Some(p) = payments.iter_mut().find(|p| p.id == id) else {
            return Err(AppError::not_found("payment_missing", "Payment not found"));
        };
        let refund = Refund {
            refund_id: opaque_id("rf"),
            payment_id: p.id.clone(),
            amount: amount.unwrap_or(p.amount),
            reason,
            status: "processing".into(),
            refunded_by: admin_id.to_string(),
            created_at: Utc::now(),
        };
        p.refunds.push(refund.clone());
        info!(id = %p.id, refund = %refund.refund_id, "refund initiated");
        Ok(refund)
    }

    /// Rollup over intents created inside the (optional) date range.
    pub fn analytics(&self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> PaymentAnalytics {
        let payments = self.0.read();
        let kept: Vec<&PaymentIntent> = payments
            .iter()
            .filter(|p| {
                from.map_or(true, |f| p.created_at >= f) && to.map_or(true, |t| p.created_at <= t)
            })
            .collect();
        let total_amount: i64 = kept.iter().map(|p| p.amount).sum();
        let count_status = |s: &str| kept.iter().filter(|p| p.status == s).count();
        PaymentAnalytics {
            total_payments: kept.len(),
            total_amount,
            status_breakdown: StatusBreakdown {
                pending: count_status("pending"),
                processing: count_status("processing"),
                completed: count_status("completed"),
                failed: count_status("failed"),
            },
            average_amount: if kept.is_empty() {
                0.0
            } else {
                total_amount as f64 / kept.len() as f64
            },
        }
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_intent(
        &self,
        id: &str,
        apply: impl FnOnce(&mut PaymentIntent),
    ) -> AppResult<PaymentIntent> {
        let mut payments = self.0.write();
        let Some(p) = payments.iter_mut().find(|p| p.id == id) else {
            return Err(AppError::not_found("payment_missing", "Payment not found"));
        };
        apply(p);
        Ok(p.clone())
    }
}

/// Pipeline accessors for payment history: search over intent and order ids,
/// exact status filter, date range over creation time.
pub fn query_spec() -> CollectionSpec<PaymentIntent> {
    CollectionSpec {
        search_text: |p| vec![p.id.clone(), p.order_id.clone()],
        field: |p, f| match f {
            "status" => Some(p.status.clone()),
            _ => None,
        },
        sort_key: |p, f| match f {
            "amount" => Some(SortKey::Int(p.amount)),
            "createdAt" => Some(SortKey::Time(p.created_at)),
            _ => None,
        },
        date_field: |p| Some(p.created_at),
    }
}
