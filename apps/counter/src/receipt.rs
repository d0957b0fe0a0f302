//! # Receipt View
//!
//! Read-only view of a committed order, laid out for a narrow receipt.
//!
//! ```text
//! ========================================
//!               BALU MALIGAI
//!     Local Grocery & Vegetables Shop
//!                Receipt #1
//! ========================================
//! Date:     14/03/2026 15:00
//! Customer: Walk-in Customer
//! Payment:  CASH
//! ----------------------------------------
//! Onion (6 kg)                     ₹270.00
//! ----------------------------------------
//!                           Total: ₹270.00
//! ========================================
//!      Thank you for shopping with us!
//!             Visit us again!
//! ```

use chrono::FixedOffset;
use serde::Serialize;

use crate::state::ConfigState;
use maligai_core::{Money, Order};

const RECEIPT_WIDTH: usize = 40;

/// One printed item line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptLine {
    /// `Onion (6 kg)`
    pub label: String,
    pub amount: Money,
}

/// Everything printed on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptView {
    pub shop_name: String,
    pub tagline: String,
    pub receipt_no: i64,
    pub date: String,
    pub customer: String,
    /// Omitted for walk-in sales.
    pub phone: Option<String>,
    /// Upper-cased method, e.g. `QR-SCAN`.
    pub payment: String,
    pub lines: Vec<ReceiptLine>,
    pub total: Money,
    #[serde(skip)]
    currency_symbol: String,
}

impl ReceiptView {
    pub fn new(order: &Order, config: &ConfigState) -> Self {
        Self::with_offset(order, config, config.utc_offset())
    }

    pub fn with_offset(order: &Order, config: &ConfigState, offset: FixedOffset) -> Self {
        ReceiptView {
            shop_name: config.shop_name.clone(),
            tagline: config.shop_tagline.clone(),
            receipt_no: order.id,
            date: order
                .date
                .with_timezone(&offset)
                .format("%d/%m/%Y %H:%M")
                .to_string(),
            customer: order.customer_name.clone(),
            phone: (!order.customer_phone.is_empty()).then(|| order.customer_phone.clone()),
            payment: order.payment_method.to_string(),
            lines: order
                .items
                .iter()
                .map(|item| ReceiptLine {
                    label: format!("{} ({} {})", item.name, item.quantity, item.unit),
                    amount: item.total,
                })
                .collect(),
            total: order.total,
            currency_symbol: config.currency_symbol.clone(),
        }
    }

    /// Plain-text receipt.
    pub fn render(&self) -> String {
        let heavy = "=".repeat(RECEIPT_WIDTH);
        let light = "-".repeat(RECEIPT_WIDTH);
        let mut out = Vec::new();

        out.push(heavy.clone());
        out.push(center(&self.shop_name.to_uppercase()));
        out.push(center(&self.tagline));
        out.push(center(&format!("Receipt #{}", self.receipt_no)));
        out.push(heavy.clone());
        out.push(format!("Date:     {}", self.date));
        out.push(format!("Customer: {}", self.customer));
        if let Some(phone) = &self.phone {
            out.push(format!("Phone:    {}", phone));
        }
        out.push(format!("Payment:  {}", self.payment));
        out.push(light.clone());
        for line in &self.lines {
            out.push(spread(&line.label, &line.amount.format_with(&self.currency_symbol)));
        }
        out.push(light);
        out.push(right(&format!(
            "Total: {}",
            self.total.format_with(&self.currency_symbol)
        )));
        out.push(heavy);
        out.push(center("Thank you for shopping with us!"));
        out.push(center("Visit us again!"));

        out.join("\n")
    }
}

fn width(text: &str) -> usize {
    text.chars().count()
}

fn center(text: &str) -> String {
    let pad = RECEIPT_WIDTH.saturating_sub(width(text)) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

fn right(text: &str) -> String {
    let pad = RECEIPT_WIDTH.saturating_sub(width(text));
    format!("{}{}", " ".repeat(pad), text)
}

fn spread(left: &str, right: &str) -> String {
    let pad = RECEIPT_WIDTH.saturating_sub(width(left) + width(right)).max(1);
    format!("{}{}{}", left, " ".repeat(pad), right)
}
