//! # Customer Commands
//!
//! Customer registry maintenance. Orders are never touched from here.

use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;
use maligai_core::{Customer, CustomerDraft};

pub fn list_customers(state: &AppState) -> Vec<Customer> {
    debug!("list_customers command");
    state.shop.customers.customers().to_vec()
}

/// Creates or edits a customer.
///
/// A new customer must have a phone number nobody else has. Edits keep the
/// customer's order history and skip the phone check.
pub async fn save_customer(
    state: &mut AppState,
    draft: CustomerDraft,
) -> Result<Customer, ApiError> {
    debug!(id = ?draft.id, "save_customer command");

    let mut customers = state.shop.customers.clone();
    let customer = customers.upsert(draft)?;
    state.collections().save_customers(&customers).await?;
    state.shop.customers = customers;

    info!(customer_id = customer.id, "Customer saved");
    Ok(customer)
}

/// Deletes a customer. Their orders stay in history under the name and
/// phone they were placed with.
pub async fn remove_customer(state: &mut AppState, id: i64) -> Result<Customer, ApiError> {
    debug!(id, "remove_customer command");

    let mut customers = state.shop.customers.clone();
    let removed = customers
        .remove(id)
        .ok_or_else(|| ApiError::not_found("Customer", id))?;
    state.collections().save_customers(&customers).await?;
    state.shop.customers = customers;

    info!(customer_id = id, "Customer removed");
    Ok(removed)
}
