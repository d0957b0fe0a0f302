//! # Validation Module
//!
//! Input validation for catalog and customer forms.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Command line (clap)                                          │
//! │  └── Type parsing (ids, decimal strings)                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rule validation (non-negative price/stock, names)        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Managers (Catalog, CustomerRegistry, Cart)                   │
//! │  └── Cross-entity rules (stock, unique phone)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::{Money, Quantity};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_PHONE_LEN: usize = 20;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product or customer).
///
/// ```rust
/// use maligai_core::validation::validate_name;
///
/// assert!(validate_name("name", "Ladies Finger").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be empty
/// - Digits, spaces, `+` and `-` only
/// - At most 20 characters
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.len() > MAX_PHONE_LEN {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: MAX_PHONE_LEN,
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, '+' and '-'".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Price must be zero or more (zero = free item).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Stock must be zero or more.
pub fn validate_stock(stock: Quantity) -> ValidationResult<()> {
    if stock.is_negative() {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

/// Cart quantities must be strictly positive.
pub fn validate_quantity(quantity: Quantity) -> ValidationResult<()> {
    if !quantity.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Turns raw operator input into a cart quantity.
///
/// Mirrors the quantity box next to each product: unparseable, empty or
/// zero input falls back to 1, anything below half a unit (negative
/// included) is raised to 0.5, and extra decimals are rounded to the
/// nearest thousandth.
///
/// ```rust
/// use maligai_core::money::Quantity;
/// use maligai_core::validation::normalize_requested_quantity;
///
/// assert_eq!(normalize_requested_quantity(""), Quantity::ONE);
/// assert_eq!(normalize_requested_quantity("0.2"), Quantity::MIN_STEP);
/// assert_eq!(normalize_requested_quantity("2.5"), Quantity::from_milli(2500));
/// ```
pub fn normalize_requested_quantity(input: &str) -> Quantity {
    // 0.0001 rounds to zero thousandths but is not a zero entry
    match input.trim().parse::<f64>() {
        Ok(value) if value != 0.0 => Quantity::from_units_rounded(value)
            .map_or(Quantity::ONE, Quantity::clamp_to_minimum),
        _ => Quantity::ONE,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
