//! # Payment Codes
//!
//! The JSON payload behind a scannable payment code, in both directions.
//!
//! ## Payload Flow
//! ```text
//!  qr (counter shows code)                 qr-scan (counter reads code)
//!  ───────────────────────                 ────────────────────────────
//!  PaymentRequest::new(total, shop, now)   raw text from the reader
//!          │                                       │
//!          ▼                                       ▼
//!  to_payload() ──► {"amount":270.0,       parse_scanned(raw)
//!                    "shop":"Balu Maligai",        │
//!                    "timestamp":"..."}            ├── not a JSON object ──► DecodeSchemaMismatch
//!          │                                       │
//!          ▼                                       └── ScannedPayment { amount?, shop? }
//!  CodeGenerator (app layer)
//! ```
//!
//! Verification is trust-on-scan: an amount equal to the cart total is all
//! it takes. Nothing here talks to a payment gateway.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// Payload shown to the customer when paying by `qr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: Money,
    pub shop: String,
    pub timestamp: String,
}

impl PaymentRequest {
    pub fn new(amount: Money, shop: impl Into<String>, now: DateTime<Utc>) -> Self {
        PaymentRequest {
            amount,
            shop: shop.into(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Compact JSON text to encode into the code image.
    pub fn to_payload(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(|e| CoreError::DecodeSchemaMismatch {
            reason: e.to_string(),
        })
    }
}

/// What could be read out of a scanned payment code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScannedPayment {
    /// `None` when the field is missing, zero or not a number.
    pub amount: Option<Money>,
    pub shop: Option<String>,
}

impl ScannedPayment {
    /// True when the scanned amount equals `expected` exactly.
    pub fn matches(&self, expected: Money) -> bool {
        self.amount == Some(expected)
    }
}

/// Parses raw scanned text.
///
/// ## Errors
/// `DecodeSchemaMismatch` when the text is not a JSON object (UPI links,
/// plain text, bare numbers).
///
/// ```rust
/// use maligai_core::money::Money;
/// use maligai_core::payment::parse_scanned;
///
/// let scanned = parse_scanned(r#"{"amount": 270}"#).unwrap();
/// assert!(scanned.matches(Money::from_major_minor(270, 0)));
///
/// assert!(parse_scanned("upi://pay?pa=shop@bank").is_err());
/// ```
pub fn parse_scanned(raw: &str) -> CoreResult<ScannedPayment> {
    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|e| CoreError::DecodeSchemaMismatch {
            reason: e.to_string(),
        })?;

    let object = value
        .as_object()
        .ok_or_else(|| CoreError::DecodeSchemaMismatch {
            reason: "expected a JSON object".to_string(),
        })?;

    let amount = object
        .get("amount")
        .and_then(|v| serde_json::from_value::<Money>(v.clone()).ok())
        .filter(|m| !m.is_zero());

    let shop = object
        .get("shop")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(ScannedPayment { amount, shop })
}

// =============================================================================
// Unit Tests
// =============================================================================
