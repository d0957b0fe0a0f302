//! # Sample Catalog
//!
//! The starter shelf of a local grocery and vegetable shop, loaded when the
//! catalog is empty so a fresh install has something to sell.

use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::pool::Database;
use maligai_core::{Catalog, Money, ProductDraft, Quantity};

/// `(name, category, price in rupees, unit, stock)`
const SAMPLE_PRODUCTS: &[(&str, &str, i64, &str, i64)] = &[
    ("Onion", "vegetables", 45, "kg", 50),
    ("Tomato", "vegetables", 60, "kg", 40),
    ("Potato", "vegetables", 35, "kg", 60),
    ("Brinjal", "vegetables", 40, "kg", 30),
    ("Ladies Finger", "vegetables", 50, "kg", 25),
    ("Carrot", "vegetables", 55, "kg", 20),
    ("Rice", "groceries", 120, "kg", 100),
    ("Wheat Flour", "groceries", 45, "kg", 80),
    ("Sugar", "groceries", 42, "kg", 75),
    ("Salt", "groceries", 25, "pack", 50),
    ("Turmeric Powder", "groceries", 180, "kg", 30),
    ("Cooking Oil", "groceries", 140, "pack", 40),
];

/// Drafts for the sample shelf, in shelf order (ids 1 to 12 on an empty
/// catalog).
pub fn sample_products() -> Vec<ProductDraft> {
    SAMPLE_PRODUCTS
        .iter()
        .map(|&(name, category, rupees, unit, stock)| ProductDraft {
            id: None,
            name: name.to_string(),
            category: category.to_string(),
            price: Money::from_major_minor(rupees, 0),
            unit: unit.to_string(),
            stock: Quantity::from_units(stock),
            image: String::new(),
        })
        .collect()
}

/// Fills an empty catalog with the sample shelf. Returns how many products
/// were added; a non-empty catalog is left alone and 0 is returned.
pub fn seed_catalog(catalog: &mut Catalog) -> StoreResult<usize> {
    if !catalog.is_empty() {
        return Ok(0);
    }
    for draft in sample_products() {
        catalog
            .upsert(draft)
            .map_err(|e| StoreError::Internal(format!("sample product rejected: {e}")))?;
    }
    Ok(catalog.len())
}

/// Loads the stored catalog, seeds it if empty and saves it back.
pub async fn seed_if_empty(db: &Database) -> StoreResult<usize> {
    let repo = db.collections();
    let mut catalog = repo.load_catalog().await?;

    let added = seed_catalog(&mut catalog)?;
    if added > 0 {
        repo.save_catalog(&catalog).await?;
        info!(products = added, "Seeded sample catalog");
    }
    Ok(added)
}
