//! # Shop State
//!
//! The four collections the counter works on, held as one explicit value.
//!
//! ```text
//! ┌──────────────────────────── ShopState ────────────────────────────┐
//! │  catalog: Catalog            (key "catalog")                      │
//! │  cart: Cart                  (key "cart")                         │
//! │  customers: CustomerRegistry (key "customers")                    │
//! │  orders: OrderLedger         (key "orders", append-only)          │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is global: the app owns one `ShopState` and lends it to
//! each command.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::customers::CustomerRegistry;
use crate::error::{CoreError, CoreResult};
use crate::money::Quantity;
use crate::types::{next_id, Order};

// =============================================================================
// Order Ledger
// =============================================================================

/// Committed orders. Append-only: there is no way to edit or delete one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderLedger {
    orders: Vec<Order>,
}

impl OrderLedger {
    pub fn new() -> Self {
        OrderLedger::default()
    }

    pub fn from_orders(orders: Vec<Order>) -> Self {
        OrderLedger { orders }
    }

    /// Id the next committed order will get.
    pub fn next_id(&self) -> i64 {
        next_id(self.orders.iter().map(|o| o.id))
    }

    pub fn get(&self, id: i64) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub(crate) fn append(&mut self, order: Order) {
        self.orders.push(order);
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

// =============================================================================
// Shop State
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShopState {
    pub catalog: Catalog,
    pub cart: Cart,
    pub customers: CustomerRegistry,
    pub orders: OrderLedger,
}

impl ShopState {
    pub fn new() -> Self {
        ShopState::default()
    }

    /// Adds a catalog product to the cart by id.
    ///
    /// ## Errors
    /// - `ProductNotFound` for an unknown id
    /// - anything [`Cart::add_item`] returns
    pub fn add_to_cart(&mut self, product_id: i64, quantity: Quantity) -> CoreResult<()> {
        let product = self
            .catalog
            .get(product_id)
            .ok_or(CoreError::ProductNotFound(product_id))?;
        self.cart.add_item(product, quantity)
    }

    /// Raises the id marks of the catalog and the registry above every id
    /// the cart or the ledger still refers to.
    ///
    /// Called after loading, so that a shop saved before the marks were
    /// stored still never hands out the id of a deleted product or customer
    /// that orders or cart lines point at.
    pub fn reserve_referenced_ids(&mut self) {
        let product_floor = self
            .cart
            .lines()
            .iter()
            .chain(self.orders.orders().iter().flat_map(|o| o.items.iter()))
            .map(|line| line.product_id)
            .max()
            .unwrap_or(0);
        self.catalog.reserve_ids(product_floor);

        let customer_floor = self
            .orders
            .orders()
            .iter()
            .filter_map(|o| o.customer_id)
            .max()
            .unwrap_or(0);
        self.customers.reserve_ids(customer_floor);
    }
}
