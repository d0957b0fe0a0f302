//! # Cart Manager
//!
//! The transient list of lines between "add to cart" and checkout.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator Action          Cart Method              Cart Change          │
//! │  ───────────────          ───────────              ───────────          │
//! │                                                                         │
//! │  Add (new product) ─────► add_item() ────────────► lines.push(line)     │
//! │  Add (same product) ────► add_item() ────────────► line.qty += qty      │
//! │  Trash icon ────────────► remove_item(index) ────► lines.remove(index)  │
//! │  Checkout confirmed ────► clear() ───────────────► lines.clear()        │
//! │  Cart badge ────────────► total_quantity() ──────► (read only)          │
//! │                                                                         │
//! │  Persisting the cart after a change is the caller's job; this type     │
//! │  never touches storage.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Quantity};
use crate::types::{CartLine, Product};
use crate::validation::validate_quantity;

/// The shopping cart.
///
/// ## Invariants
/// - At most one line per product (adding again merges quantities)
/// - A merged line keeps the price captured by its first add
/// - `line.total == line.quantity × line.price` for every line
///
/// Persisted as a bare JSON array of lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Rebuilds a cart from persisted lines.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Cart { lines }
    }

    /// Adds `quantity` of `product`, merging with an existing line.
    ///
    /// ## Behavior
    /// - Product already in cart: quantities are summed, total recomputed
    ///   from the line's original price snapshot
    /// - Product not in cart: new line with name/price/unit snapshotted now
    ///
    /// ## Errors
    /// - `OutOfStock` if the resulting line quantity exceeds `product.stock`
    /// - `Validation` if `quantity` is not positive
    ///
    /// On error the cart is left exactly as it was.
    pub fn add_item(&mut self, product: &Product, quantity: Quantity) -> CoreResult<()> {
        validate_quantity(quantity)?;

        let existing = self.lines.iter().position(|l| l.product_id == product.id);
        let current = existing.map_or(Quantity::zero(), |i| self.lines[i].quantity);
        let requested = current + quantity;

        if requested > product.stock {
            return Err(CoreError::OutOfStock {
                product_id: product.id,
                name: product.name.clone(),
                unit: product.unit.clone(),
                available: product.stock,
                requested,
            });
        }

        match existing {
            Some(index) => self.lines[index].set_quantity(requested),
            None => self.lines.push(CartLine::from_product(product, quantity)),
        }
        Ok(())
    }

    /// Removes the line at `index`. Out-of-range indices are ignored.
    pub fn remove_item(&mut self, index: usize) -> Option<CartLine> {
        if index < self.lines.len() {
            Some(self.lines.remove(index))
        } else {
            None
        }
    }

    /// Sum of all line totals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| l.total).sum()
    }

    /// Number of lines.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all quantities (the cart badge number).
    pub fn total_quantity(&self) -> Quantity {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line_for(&self, product_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
