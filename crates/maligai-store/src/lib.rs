//! # maligai-store: Persistence for the Maligai Counter
//!
//! Keeps the shop's four collections in a local SQLite file, one JSON
//! document per collection.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  maligai command (cart add, checkout, ...)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   maligai-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌──────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │   │   Collection     │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │◄──│   Repository     │   │  (embedded)  │   │   │
//! │  │   │  SqlitePool   │   │  load / save     │   │ 001_*.sql    │   │   │
//! │  │   └───────────────┘   └────────┬─────────┘   └──────────────┘   │   │
//! │  │                                │                                │   │
//! │  │                        backfill (old layouts)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  maligai.db                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - Connection pool and `Database` handle
//! - [`migrations`] - Embedded schema migrations
//! - [`repository`] - Collection load/save
//! - [`backfill`] - Load-time upgrade of older documents
//! - [`seed`] - Sample catalog
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use maligai_store::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("maligai.db")).await?;
//! let mut shop = db.collections().load_state().await?;
//! shop.add_to_cart(1, Quantity::ONE)?;
//! db.collections().save_cart(&shop.cart).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backfill;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use repository::collections::{CollectionKey, CollectionRepository};
