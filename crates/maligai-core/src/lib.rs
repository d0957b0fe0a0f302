//! # maligai-core: Pure Business Logic for the Maligai Counter
//!
//! Everything the shop counter decides lives here; nothing here touches a
//! disk, a camera or a clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Maligai POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 maligai (operator CLI, apps/counter)            │   │
//! │  │    product ──► cart ──► checkout ──► receipt / history          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ maligai-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌──────────────────┐  │   │
//! │  │   │ catalog  │ │   cart   │ │ customers │ │ checkout/payment │  │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └──────────────────┘  │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌──────────────────┐  │   │
//! │  │   │  money   │ │  types   │ │validation │ │     history      │  │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • CLOCK PASSED IN                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                maligai-store (SQLite collections)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - `Money` (paise) and `Quantity` (thousandths), integer math
//! - [`types`] - Product, CartLine, Customer, Order, PaymentMethod
//! - [`catalog`], [`cart`], [`customers`] - the three managers
//! - [`shop`] - `ShopState`, the four collections as one value
//! - [`checkout`] - the checkout state machine
//! - [`payment`] - payment-code payloads
//! - [`history`] - order history views
//! - [`validation`], [`error`]
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use maligai_core::{CheckoutSession, Money, ProductDraft, Quantity, ShopState};
//!
//! let mut shop = ShopState::new();
//! let onion = shop.catalog.upsert(ProductDraft {
//!     name: "Onion".into(),
//!     category: "vegetables".into(),
//!     price: Money::from_major_minor(45, 0),
//!     unit: "kg".into(),
//!     stock: Quantity::from_units(10),
//!     ..Default::default()
//! }).unwrap();
//!
//! shop.add_to_cart(onion.id, Quantity::from_units(3)).unwrap();
//! shop.add_to_cart(onion.id, Quantity::from_units(3)).unwrap();
//!
//! let mut session = CheckoutSession::open(&shop).unwrap();
//! let order = session.confirm(&mut shop, Utc::now()).unwrap();
//!
//! assert_eq!(order.total, Money::from_major_minor(270, 0));
//! assert_eq!(shop.catalog.get(onion.id).unwrap().stock, Quantity::from_units(4));
//! assert!(shop.cart.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod customers;
pub mod error;
pub mod history;
pub mod money;
pub mod payment;
pub mod shop;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use catalog::Catalog;
pub use checkout::{CheckoutSession, CheckoutState, PaymentPrompt, ScanReview};
pub use customers::CustomerRegistry;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Quantity};
pub use payment::PaymentRequest;
pub use shop::{OrderLedger, ShopState};
pub use types::*;
