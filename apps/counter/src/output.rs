//! # Text Output
//!
//! Plain-text rendering of command responses for the terminal. With
//! `--json` the responses are serialized instead and nothing here runs.

use chrono::FixedOffset;

use crate::commands::cart::CartResponse;
use crate::commands::catalog::ProductListResponse;
use crate::commands::checkout::CheckoutOutcome;
use crate::commands::history::{HistoryResponse, OrderDetail, ShareMessage};
use maligai_core::{Customer, Product};

pub fn product_list(list: &ProductListResponse, symbol: &str) -> String {
    let mut out = vec![format!(
        "Category: {}  (available: {})",
        list.category,
        list.categories.join(", ")
    )];
    if list.products.is_empty() {
        out.push("No products.".to_string());
    }
    out.extend(list.products.iter().map(|p| product(p, symbol)));
    out.join("\n")
}

pub fn product(p: &Product, symbol: &str) -> String {
    format!(
        "{:>4}  {:<20} {:<12} {:>10}/{:<5} stock {} {}",
        p.id,
        p.name,
        p.category,
        p.price.format_with(symbol),
        p.unit,
        p.stock,
        p.unit
    )
}

pub fn cart(cart: &CartResponse, symbol: &str) -> String {
    if cart.lines.is_empty() {
        return "Cart is empty.".to_string();
    }

    let mut out: Vec<String> = cart
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            format!(
                "{:>3}. {:<20} {} {} × {} = {}",
                i + 1,
                line.name,
                line.quantity,
                line.unit,
                line.price.format_with(symbol),
                line.total.format_with(symbol)
            )
        })
        .collect();
    out.push(format!(
        "Items: {} ({} units)  Total: {}",
        cart.item_count,
        cart.total_quantity,
        cart.total.format_with(symbol)
    ));
    out.join("\n")
}

pub fn customers(customers: &[Customer]) -> String {
    if customers.is_empty() {
        return "No customers.".to_string();
    }
    customers.iter().map(customer).collect::<Vec<_>>().join("\n")
}

pub fn customer(c: &Customer) -> String {
    format!(
        "{:>4}  {:<20} {:<15} {} orders",
        c.id,
        c.name,
        c.phone,
        c.order_ids.len()
    )
}

pub fn checkout(outcome: &CheckoutOutcome) -> String {
    match outcome {
        CheckoutOutcome::Completed { receipt, .. } => receipt.render(),
        CheckoutOutcome::Cancelled { reason } => {
            format!("Checkout cancelled ({}). The cart is unchanged.", reason)
        }
    }
}

pub fn history(history: &HistoryResponse, symbol: &str, offset: FixedOffset) -> String {
    if history.orders.is_empty() {
        return "No orders found.".to_string();
    }

    let mut out: Vec<String> = history
        .orders
        .iter()
        .map(|o| {
            format!(
                "#{:<4} {}  {:<20} {:<8} {:>10}  ({} items)",
                o.id,
                o.date.with_timezone(&offset).format("%d/%m/%Y %H:%M"),
                o.customer_name,
                o.payment_method.to_string(),
                o.total.format_with(symbol),
                o.item_count()
            )
        })
        .collect();

    out.push(String::new());
    out.push("Monthly totals".to_string());
    for month in &history.monthly {
        out.push(format!(
            "  {:<15} {:>3} orders  {}",
            month.label,
            month.order_count,
            month.total.format_with(symbol)
        ));
    }
    out.join("\n")
}

pub fn order_detail(detail: &OrderDetail) -> String {
    let mut out = detail.lines.clone();
    out.push(String::new());
    out.push(detail.receipt.render());
    out.join("\n")
}

pub fn share(message: &ShareMessage) -> String {
    let to = if message.phone.is_empty() {
        "(walk-in, no phone)"
    } else {
        message.phone.as_str()
    };
    format!("To: {}\n\n{}", to, message.text)
}
