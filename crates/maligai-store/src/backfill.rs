//! # Load-time Back-fill
//!
//! Upgrades collections written by older versions before they are decoded.
//!
//! There is no version field in the stored documents. Instead every load
//! runs each document through these passes; a pass that changes something
//! reports it so the repository can write the upgraded document back.
//!
//! | Collection | Missing / legacy field      | Becomes                          |
//! |------------|-----------------------------|----------------------------------|
//! | catalog    | `image`                     | `""`                             |
//! | catalog    | `category`                  | `"general"`                      |
//! | catalog    | `unit`                      | `"pc"`                           |
//! | customers  | `orders` (legacy name)      | `orderIds`                       |
//! | customers  | `orderIds`                  | `[]`                             |
//! | orders     | `timestamp` (legacy name)   | `epochMillis`                    |
//! | orders     | `epochMillis`               | parsed from `date`               |
//! | cart/items | line `total`                | `quantity × price`               |

use chrono::DateTime;
use serde_json::{Map, Value};

use maligai_core::{Money, Quantity};

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_UNIT: &str = "pc";

/// Back-fills every product in a catalog document.
pub fn backfill_catalog(doc: &mut Value) -> bool {
    let mut changed = false;
    for product in objects(doc) {
        changed |= default_field(product, "image", Value::from(""));
        changed |= default_field(product, "category", Value::from(DEFAULT_CATEGORY));
        changed |= default_field(product, "unit", Value::from(DEFAULT_UNIT));
    }
    changed
}

/// Back-fills every line in a cart document.
pub fn backfill_cart(doc: &mut Value) -> bool {
    let mut changed = false;
    for line in objects(doc) {
        changed |= backfill_line_total(line);
    }
    changed
}

/// Back-fills every customer in a customers document.
pub fn backfill_customers(doc: &mut Value) -> bool {
    let mut changed = false;
    for customer in objects(doc) {
        changed |= rename_field(customer, "orders", "orderIds");
        changed |= default_field(customer, "orderIds", Value::Array(Vec::new()));
    }
    changed
}

/// Back-fills every order (and its lines) in an orders document.
pub fn backfill_orders(doc: &mut Value) -> bool {
    let mut changed = false;
    for order in objects(doc) {
        changed |= rename_field(order, "timestamp", "epochMillis");

        if !order.contains_key("epochMillis") {
            let millis = order
                .get("date")
                .and_then(Value::as_str)
                .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                .map_or(0, |d| d.timestamp_millis());
            order.insert("epochMillis".to_string(), Value::from(millis));
            changed = true;
        }

        if let Some(items) = order.get_mut("items") {
            for line in objects(items) {
                changed |= backfill_line_total(line);
            }
        }
    }
    changed
}

fn backfill_line_total(line: &mut Map<String, Value>) -> bool {
    if line.contains_key("total") {
        return false;
    }

    let price = line
        .get("price")
        .and_then(|v| serde_json::from_value::<Money>(v.clone()).ok());
    let quantity = line
        .get("quantity")
        .and_then(|v| serde_json::from_value::<Quantity>(v.clone()).ok());

    match (price, quantity) {
        (Some(price), Some(quantity)) => match serde_json::to_value(price.times(quantity)) {
            Ok(total) => {
                line.insert("total".to_string(), total);
                true
            }
            Err(_) => false,
        },
        // leave it for the decoder to report
        _ => false,
    }
}

fn objects(doc: &mut Value) -> impl Iterator<Item = &mut Map<String, Value>> {
    doc.as_array_mut()
        .into_iter()
        .flatten()
        .filter_map(Value::as_object_mut)
}

fn default_field(object: &mut Map<String, Value>, key: &str, default: Value) -> bool {
    if object.contains_key(key) {
        return false;
    }
    object.insert(key.to_string(), default);
    true
}

fn rename_field(object: &mut Map<String, Value>, from: &str, to: &str) -> bool {
    if object.contains_key(to) {
        return false;
    }
    match object.remove(from) {
        Some(value) => {
            object.insert(to.to_string(), value);
            true
        }
        None => false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
