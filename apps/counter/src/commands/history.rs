//! # History Commands
//!
//! Read-only views over the order ledger.
//!
//! ```text
//! history --customer 1 --month 2026-03
//!     │
//!     ▼
//! filter_orders ──► newest first ──► monthly_totals (same orders)
//!                                         │
//!                                         ▼
//!                       HistoryResponse { orders, monthly, months }
//! ```

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::receipt::ReceiptView;
use crate::state::AppState;
use maligai_core::history::{self, HistoryQuery, MonthlyTotal};
use maligai_core::{Money, Order};

/// One month in the summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub month: String,
    /// `March 2026`
    pub label: String,
    pub order_count: usize,
    pub total: Money,
}

impl From<&MonthlyTotal> for MonthlySummary {
    fn from(total: &MonthlyTotal) -> Self {
        MonthlySummary {
            month: total.month.to_string(),
            label: total.month.long_name(),
            order_count: total.order_count,
            total: total.total,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    /// Matching orders, newest first.
    pub orders: Vec<Order>,
    /// Totals of exactly those orders, newest month first.
    pub monthly: Vec<MonthlySummary>,
    /// Every month that has orders, for the month filter.
    pub months: Vec<String>,
}

/// An order with its printable forms.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order: Order,
    /// `Onion - 6 kg × ₹45.00 = ₹270.00`
    pub lines: Vec<String>,
    pub receipt: ReceiptView,
}

/// Message body for sending an order to the customer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareMessage {
    /// Digits only; empty for walk-in sales.
    pub phone: String,
    pub text: String,
}

pub fn list_history(state: &AppState, query: HistoryQuery) -> HistoryResponse {
    debug!(customer_id = ?query.customer_id, month = ?query.month, "list_history command");

    let offset = state.config.utc_offset();
    let orders = state.shop.orders.orders();
    let view = history::history_view(orders, &query, offset);

    HistoryResponse {
        orders: view.orders.into_iter().cloned().collect(),
        monthly: view.monthly.iter().map(MonthlySummary::from).collect(),
        months: history::months(orders, offset)
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}

pub fn order_detail(state: &AppState, id: i64) -> Result<OrderDetail, ApiError> {
    debug!(id, "order_detail command");

    let order = find_order(state, id)?;
    Ok(OrderDetail {
        lines: history::detail_lines(order, &state.config.currency_symbol),
        receipt: ReceiptView::new(order, &state.config),
        order: order.clone(),
    })
}

pub fn share_order(state: &AppState, id: i64) -> Result<ShareMessage, ApiError> {
    debug!(id, "share_order command");

    let order = find_order(state, id)?;
    let config = &state.config;
    Ok(ShareMessage {
        phone: history::share_phone(order),
        text: history::share_text(
            order,
            &config.shop_name,
            &config.currency_symbol,
            config.utc_offset(),
        ),
    })
}

fn find_order(state: &AppState, id: i64) -> Result<&Order, ApiError> {
    state
        .shop
        .orders
        .get(id)
        .ok_or_else(|| ApiError::not_found("Order", id))
}
