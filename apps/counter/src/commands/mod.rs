//! # Counter Commands
//!
//! One function per operator action. Each takes the [`AppState`] it works
//! on plus explicit ids or indices, and returns a serializable response.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── catalog.rs   ◄─── Product list / save / remove
//! ├── cart.rs      ◄─── Cart add / remove / clear
//! ├── customer.rs  ◄─── Customer list / save / remove
//! ├── checkout.rs  ◄─── Payment flow and order commit
//! └── history.rs   ◄─── Order history, detail, share text
//! ```
//!
//! ## Persistence Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Copy the collection(s) the command changes                          │
//! │  2. Apply the change to the copy (business rules run here)              │
//! │  3. Save the copy                                                       │
//! │  4. Only then replace the in-memory collection                          │
//! │                                                                         │
//! │  A failed rule or a failed save leaves both memory and disk as before.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`AppState`]: crate::state::AppState

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod customer;
pub mod history;
