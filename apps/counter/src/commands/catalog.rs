//! # Product Commands
//!
//! Shelf listing and manual product maintenance.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;
use maligai_core::catalog::ALL_CATEGORIES;
use maligai_core::{Product, ProductDraft};

/// Product grid for one category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    /// The filter that was applied (`all` for none).
    pub category: String,
    /// Every category on the shelf, for the filter buttons.
    pub categories: Vec<String>,
    pub products: Vec<Product>,
}

/// Lists products, optionally restricted to one category.
pub fn list_products(state: &AppState, category: Option<&str>) -> ProductListResponse {
    let category = category.unwrap_or(ALL_CATEGORIES);
    debug!(%category, "list_products command");

    let catalog = &state.shop.catalog;
    ProductListResponse {
        category: category.to_string(),
        categories: catalog.categories().into_iter().map(String::from).collect(),
        products: catalog.by_category(category).into_iter().cloned().collect(),
    }
}

/// Creates or edits a product.
///
/// ## Behavior
/// - `draft.id` of an existing product: every field but the id is replaced
/// - no id, or an id that matches nothing: a new product with the next id
pub async fn save_product(state: &mut AppState, draft: ProductDraft) -> Result<Product, ApiError> {
    debug!(id = ?draft.id, name = %draft.name, "save_product command");

    let mut catalog = state.shop.catalog.clone();
    let product = catalog.upsert(draft)?;
    state.collections().save_catalog(&catalog).await?;
    state.shop.catalog = catalog;

    info!(product_id = product.id, name = %product.name, "Product saved");
    Ok(product)
}

/// Deletes a product. Cart lines that reference it keep their snapshot.
pub async fn remove_product(state: &mut AppState, id: i64) -> Result<Product, ApiError> {
    debug!(id, "remove_product command");

    let mut catalog = state.shop.catalog.clone();
    let removed = catalog
        .remove(id)
        .ok_or_else(|| ApiError::not_found("Product", id))?;
    state.collections().save_catalog(&catalog).await?;
    state.shop.catalog = catalog;

    info!(product_id = id, "Product removed");
    Ok(removed)
}
