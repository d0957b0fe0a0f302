//! # Cart Commands
//!
//! Cart manipulation. Every change is saved before the command returns.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Order   │       │
//! │  │  Cart    │     │          │     │          │     │ (cart    │       │
//! │  └──────────┘     └──────────┘     └──────────┘     │ cleared) │       │
//! │                        │                            └──────────┘       │
//! │                   add_to_cart                                          │
//! │                   remove_from_cart                                     │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;
use maligai_core::validation::normalize_requested_quantity;
use maligai_core::{Cart, CartLine, Money, Quantity};

/// Cart response including lines and totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub total: Money,
    pub item_count: usize,
    /// Sum of quantities, shown on the cart badge.
    pub total_quantity: Quantity,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            lines: cart.lines().to_vec(),
            total: cart.total(),
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
        }
    }
}

/// Gets the current cart contents.
pub fn get_cart(state: &AppState) -> CartResponse {
    debug!("get_cart command");
    CartResponse::from(&state.shop.cart)
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - `quantity` is operator input: blank or unreadable means 1, anything
///   under half a unit becomes 0.5
/// - Already in cart: quantities merge, the first price snapshot is kept
/// - Merged quantity above stock: `OUT_OF_STOCK`, cart unchanged
pub async fn add_to_cart(
    state: &mut AppState,
    product_id: i64,
    quantity: &str,
) -> Result<CartResponse, ApiError> {
    let quantity = normalize_requested_quantity(quantity);
    debug!(product_id, %quantity, "add_to_cart command");

    let mut shop = state.shop.clone();
    shop.add_to_cart(product_id, quantity)?;
    state.collections().save_cart(&shop.cart).await?;
    state.shop = shop;

    Ok(CartResponse::from(&state.shop.cart))
}

/// Removes the line at `index` (0-based). Out of range is a no-op.
pub async fn remove_from_cart(state: &mut AppState, index: usize) -> Result<CartResponse, ApiError> {
    debug!(index, "remove_from_cart command");

    let mut cart = state.shop.cart.clone();
    if cart.remove_item(index).is_some() {
        state.collections().save_cart(&cart).await?;
        state.shop.cart = cart;
    }

    Ok(CartResponse::from(&state.shop.cart))
}

/// Clears all lines from the cart.
pub async fn clear_cart(state: &mut AppState) -> Result<CartResponse, ApiError> {
    debug!("clear_cart command");

    let cart = Cart::new();
    state.collections().save_cart(&cart).await?;
    state.shop.cart = cart;

    info!("Cart cleared");
    Ok(CartResponse::from(&state.shop.cart))
}
