//! # Error Types
//!
//! Domain-specific error types for maligai-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  maligai-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  maligai-store errors (separate crate)                                 │
//! │  └── StoreError       - Persistence failures                           │
//! │                                                                         │
//! │  counter app errors                                                    │
//! │  ├── CollaboratorError - Scanner / code generator unavailable          │
//! │  └── ApiError          - What the operator sees                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Operator               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error here is recoverable: the operation is aborted before any
//! state is touched and the operator is told why.

use thiserror::Error;

use crate::money::Quantity;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not exist in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Customer id does not exist in the registry.
    #[error("Customer not found: {0}")]
    CustomerNotFound(i64),

    /// Requested (or merged) quantity exceeds current stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Add Onion (qty: 3 kg), cart already holds 8 kg
    ///      │
    ///      ▼
    /// Check stock: available=10, requested=11
    ///      │
    ///      ▼
    /// OutOfStock { .. }  →  "Only 10 kg of Onion available in stock"
    /// ```
    #[error("Only {available} {unit} of {name} available in stock (requested {requested})")]
    OutOfStock {
        product_id: i64,
        name: String,
        unit: String,
        available: Quantity,
        requested: Quantity,
    },

    /// Checkout opened with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A customer with this phone number already exists.
    #[error("Customer with phone {phone} already exists")]
    DuplicatePhone { phone: String },

    /// Scanned text is not a payment payload. Not fatal: the raw text is
    /// shown to the operator for manual confirmation.
    #[error("Scanned code is not a payment payload: {reason}")]
    DecodeSchemaMismatch { reason: String },

    /// A checkout transition was attempted from the wrong state.
    #[error("Checkout is {current}, cannot {action}")]
    InvalidCheckoutState {
        current: &'static str,
        action: &'static str,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparseable number, bad month key).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
