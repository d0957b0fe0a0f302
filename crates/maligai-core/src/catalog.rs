//! # Catalog Manager
//!
//! Create, edit and delete products; look up current price and stock.
//!
//! Deleting a product never touches carts or orders: both hold their own
//! copies of name, price and unit, so a deleted product simply leaves
//! orphaned snapshots behind.
//!
//! ## Id High-Water Mark
//! ```text
//! create A, B, C      ids 1, 2, 3     last_id = 3
//! remove C            ids 1, 2        last_id = 3
//! create D            ids 1, 2, 4     last_id = 4
//! ```
//! An id is never handed out twice, so an orphaned cart line or order item
//! can never start pointing at a newer product.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreResult;
use crate::money::Quantity;
use crate::types::{next_id, Product, ProductDraft};
use crate::validation::{validate_name, validate_price, validate_stock};

/// Category value that means "no filter" in the product grid.
pub const ALL_CATEGORIES: &str = "all";

/// The product catalog.
///
/// Persisted as a bare JSON array. `last_id` is not part of that document;
/// the store keeps it alongside and restores it with [`Catalog::reserve_ids`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
    last_id: i64,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    pub fn from_products(products: Vec<Product>) -> Self {
        let last_id = products.iter().map(|p| p.id).max().unwrap_or(0);
        Catalog { products, last_id }
    }

    /// Highest id ever assigned, including deleted products.
    pub fn last_id(&self) -> i64 {
        self.last_id
    }

    /// Makes sure no id at or below `floor` is assigned again.
    pub fn reserve_ids(&mut self, floor: i64) {
        self.last_id = self.last_id.max(floor);
    }

    /// Creates or edits a product.
    ///
    /// ## Behavior
    /// - `draft.id` matches an existing product: every field but `id` is
    ///   replaced
    /// - otherwise: the next id above every id ever assigned is used and the
    ///   product appended
    ///
    /// ## Errors
    /// Empty name/category/unit, negative price or negative stock.
    pub fn upsert(&mut self, draft: ProductDraft) -> CoreResult<Product> {
        validate_name("name", &draft.name)?;
        validate_name("category", &draft.category)?;
        validate_name("unit", &draft.unit)?;
        validate_price(draft.price)?;
        validate_stock(draft.stock)?;

        let existing = draft
            .id
            .and_then(|id| self.products.iter_mut().find(|p| p.id == id));

        if let Some(product) = existing {
            product.name = draft.name.trim().to_string();
            product.category = draft.category.trim().to_string();
            product.price = draft.price;
            product.unit = draft.unit.trim().to_string();
            product.stock = draft.stock;
            product.image = draft.image.trim().to_string();
            return Ok(product.clone());
        }

        let id = next_id(
            self.products
                .iter()
                .map(|p| p.id)
                .chain(std::iter::once(self.last_id)),
        );
        self.last_id = id;

        let product = Product {
            id,
            name: draft.name.trim().to_string(),
            category: draft.category.trim().to_string(),
            price: draft.price,
            unit: draft.unit.trim().to_string(),
            stock: draft.stock,
            image: draft.image.trim().to_string(),
        };
        self.products.push(product.clone());
        Ok(product)
    }

    /// Deletes a product by id, returning it if it existed.
    pub fn remove(&mut self, id: i64) -> Option<Product> {
        let index = self.products.iter().position(|p| p.id == id)?;
        Some(self.products.remove(index))
    }

    pub fn get(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Mutable lookup for manual stock correction.
    pub fn get_mut(&mut self, id: i64) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    /// Lowers stock by `quantity`, never below zero.
    ///
    /// Returns `false` when the product no longer exists.
    pub fn decrement_stock(&mut self, id: i64, quantity: Quantity) -> bool {
        match self.products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                product.stock = product.stock.minus_floored(quantity);
                true
            }
            None => false,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products in `category`; `"all"` returns everything.
    pub fn by_category(&self, category: &str) -> Vec<&Product> {
        if category.eq_ignore_ascii_case(ALL_CATEGORIES) {
            return self.products.iter().collect();
        }
        self.products
            .iter()
            .filter(|p| p.category == category)
            .collect()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for product in &self.products {
            if !seen.contains(&product.category.as_str()) {
                seen.push(&product.category);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.products.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Product>::deserialize(deserializer).map(Catalog::from_products)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
