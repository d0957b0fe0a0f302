//! # Repository Module
//!
//! Database access for the collection store.
//!
//! ```text
//! command handler
//!      │  db.collections().save_cart(&shop.cart)
//!      ▼
//! CollectionRepository ──► collections table (one JSON document per key)
//! ```
//!
//! ## Available Repositories
//!
//! - [`collections::CollectionRepository`] - whole-collection load/save

pub mod collections;
