//! # Domain Types
//!
//! Core domain types for the shop counter.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartLine     │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │◄──│  product_id     │   │  id (i64)       │       │
//! │  │  name, unit     │   │  name, unit  ┐  │   │  customer_*     │       │
//! │  │  price          │   │  price       ┘snapshots  items: lines │       │
//! │  │  stock          │   │  quantity       │──►│  total          │       │
//! │  └─────────────────┘   │  total          │   │  payment_method │       │
//! │                        └─────────────────┘   └────────┬────────┘       │
//! │  ┌─────────────────┐                                  │                │
//! │  │    Customer     │  order_ids ◄─────────────────────┘                │
//! │  │  id, name,phone │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every collection hands out ids as `max(existing) + 1` (1 when empty).
//! Orders are never deleted, so order ids are never reused.
//!
//! ## Persisted Layout
//! Field names serialize in camelCase (`productId`, `orderIds`,
//! `epochMillis`), money and quantities as decimal numbers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::{Money, Quantity};

/// Display name used on orders when no customer is selected.
pub const WALK_IN_CUSTOMER_NAME: &str = "Walk-in Customer";

/// Returns the next id for a collection: `max(existing) + 1`, or 1 if empty.
///
/// ```rust
/// use maligai_core::types::next_id;
///
/// assert_eq!(next_id(std::iter::empty()), 1);
/// assert_eq!(next_id([3, 1, 7]), 8);
/// ```
pub fn next_id<I>(existing: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    existing.into_iter().max().map_or(1, |max| max + 1)
}

// =============================================================================
// Product
// =============================================================================

/// A product on the shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    /// Price per `unit`.
    pub price: Money,
    /// Selling unit: `kg`, `pack`, `pc`.
    pub unit: String,
    /// Units on hand. Mutated by checkout (decrement) and manual correction.
    pub stock: Quantity,
    /// Optional picture path or URL. Empty when unset.
    #[serde(default)]
    pub image: String,
}

/// Form input for creating or editing a product.
///
/// `id: None` (or an id that matches nothing) creates a new product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub id: Option<i64>,
    pub name: String,
    pub category: String,
    pub price: Money,
    pub unit: String,
    pub stock: Quantity,
    #[serde(default)]
    pub image: String,
}

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the cart, and later inside a committed order.
///
/// ## Snapshot Pattern
/// `name`, `price` and `unit` are copied from the product when the line is
/// created. Later catalog edits (or deletion) never reach back into the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: i64,
    pub name: String,
    pub price: Money,
    pub unit: String,
    pub quantity: Quantity,
    /// Always `quantity × price`; recomputed whenever quantity changes.
    pub total: Money,
}

impl CartLine {
    /// Creates a line, snapshotting the product's current name/price/unit.
    pub fn from_product(product: &Product, quantity: Quantity) -> Self {
        CartLine {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            unit: product.unit.clone(),
            quantity,
            total: product.price.times(quantity),
        }
    }

    /// Sets a new quantity and recomputes the line total from the snapshot price.
    pub fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
        self.total = self.price.times(quantity);
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    /// Unique among customers at creation time.
    pub phone: String,
    /// Ids of orders placed by this customer, in checkout order.
    #[serde(default)]
    pub order_ids: Vec<i64>,
}

/// Form input for creating or editing a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDraft {
    pub id: Option<i64>,
    pub name: String,
    pub phone: String,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    /// Physical cash. The default when nothing is selected.
    #[default]
    Cash,
    /// Card on an external terminal.
    Card,
    /// Customer scans a payment code shown by the counter.
    Qr,
    /// Counter scans a payment code shown by the customer.
    QrScan,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Qr,
        PaymentMethod::QrScan,
    ];

    /// Persisted form: `cash`, `card`, `qr`, `qr-scan`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Qr => "qr",
            PaymentMethod::QrScan => "qr-scan",
        }
    }
}

/// Receipt form: upper-cased (`CASH`, `QR-SCAN`).
impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "qr" => Ok(PaymentMethod::Qr),
            "qr-scan" | "qr_scan" | "qrscan" => Ok(PaymentMethod::QrScan),
            other => Err(ValidationError::InvalidFormat {
                field: "payment method".to_string(),
                reason: format!("'{}' is not one of cash, card, qr, qr-scan", other),
            }),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A committed sale. Immutable once created; never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    /// `None` for walk-in sales.
    pub customer_id: Option<i64>,
    /// Customer name at checkout time (or the walk-in name).
    pub customer_name: String,
    /// Customer phone at checkout time; empty for walk-in sales.
    pub customer_phone: String,
    /// Deep copy of the cart at checkout.
    pub items: Vec<CartLine>,
    /// Sum of `items[].total`.
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub date: DateTime<Utc>,
    pub epoch_millis: i64,
}

impl Order {
    /// Number of lines on the order.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Whether `total` still equals the sum of its lines.
    pub fn is_consistent(&self) -> bool {
        self.items.iter().map(|i| i.total).sum::<Money>() == self.total
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
