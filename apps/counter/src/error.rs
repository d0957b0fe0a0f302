//! # API Error Type
//!
//! Unified error type for counter commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Counter                            │
//! │                                                                         │
//! │  maligai cart add 1 3                                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Store Error? ──── StoreError::QueryFailed("...") ──┐            │  │
//! │  │         │                                           │            │  │
//! │  │         ▼                                           ▼            │  │
//! │  │  Business Error? ── CoreError::OutOfStock ──────── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Scanner Error? ── CollaboratorError::Unavailable ──┘            │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: "error: Only 10 kg of Onion available in stock (requested 11)" │
//! │  exit status: 1                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No error is fatal to the shop data: every command either completes or
//! leaves the stored collections as they were.

use serde::Serialize;
use std::fmt;

use crate::collaborators::CollaboratorError;
use crate::state::ConfigError;
use maligai_core::{CoreError, ValidationError};
use maligai_store::StoreError;

/// Error returned from counter commands.
///
/// ## Serialization
/// With `--json` the operator (or a wrapping script) receives:
/// ```json
/// {
///   "code": "OUT_OF_STOCK",
///   "message": "Only 10 kg of Onion available in stock (requested 11)"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product, customer or order id does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Requested quantity exceeds stock
    OutOfStock,

    /// Checkout opened on an empty cart
    EmptyCart,

    /// Another customer already has this phone number
    DuplicatePhone,

    /// Scanned code is not a payment payload
    DecodeSchemaMismatch,

    /// Checkout step attempted out of order
    InvalidState,

    /// Scanner or code generator cannot be used
    CollaboratorUnavailable,

    /// Store operation failed
    StorageError,

    /// Configuration could not be loaded
    ConfigError,

    /// Internal error
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::OutOfStock => "OUT_OF_STOCK",
            ErrorCode::EmptyCart => "EMPTY_CART",
            ErrorCode::DuplicatePhone => "DUPLICATE_PHONE",
            ErrorCode::DecodeSchemaMismatch => "DECODE_SCHEMA_MISMATCH",
            ErrorCode::InvalidState => "INVALID_STATE",
            ErrorCode::CollaboratorUnavailable => "COLLABORATOR_UNAVAILABLE",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConnectionFailed(e) => {
                tracing::error!("Store connection failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Could not open the shop database")
            }
            StoreError::MigrationFailed(e) => {
                tracing::error!("Store migration failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Database migration failed")
            }
            StoreError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Store query failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Database operation failed")
            }
            StoreError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(
                    ErrorCode::StorageError,
                    "Sale could not be saved; nothing was changed",
                )
            }
            StoreError::Corrupt { key, reason } => {
                tracing::error!(%key, %reason, "Stored collection is corrupt");
                ApiError::new(
                    ErrorCode::StorageError,
                    format!("Stored {} data is unreadable", key),
                )
            }
            StoreError::PoolExhausted => {
                ApiError::new(
                    ErrorCode::StorageError,
                    "Shop database is busy; try again",
                )
            }
            StoreError::Internal(e) => {
                tracing::error!("Internal store error: {}", e);
                ApiError::new(ErrorCode::StorageError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", id),
            CoreError::CustomerNotFound(id) => ApiError::not_found("Customer", id),
            err @ CoreError::OutOfStock { .. } => {
                ApiError::new(ErrorCode::OutOfStock, err.to_string())
            }
            err @ CoreError::EmptyCart => ApiError::new(ErrorCode::EmptyCart, err.to_string()),
            err @ CoreError::DuplicatePhone { .. } => {
                ApiError::new(ErrorCode::DuplicatePhone, err.to_string())
            }
            err @ CoreError::DecodeSchemaMismatch { .. } => {
                ApiError::new(ErrorCode::DecodeSchemaMismatch, err.to_string())
            }
            err @ CoreError::InvalidCheckoutState { .. } => {
                ApiError::new(ErrorCode::InvalidState, err.to_string())
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CollaboratorError> for ApiError {
    fn from(err: CollaboratorError) -> Self {
        tracing::warn!(error = %err, "Collaborator failed");
        ApiError::new(ErrorCode::CollaboratorUnavailable, err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use maligai_core::Quantity;

    #[test]
    fn test_out_of_stock_maps_to_code() {
        let err: ApiError = CoreError::OutOfStock {
            product_id: 1,
            name: "Onion".to_string(),
            unit: "kg".to_string(),
            available: Quantity::from_units(10),
            requested: Quantity::from_units(11),
        }
        .into();
        assert_eq!(err.code, ErrorCode::OutOfStock);
        assert!(err.message.contains("Only 10 kg of Onion"));
    }

    #[test]
    fn test_validation_inside_core_error_is_unwrapped() {
        let err: ApiError = CoreError::Validation(ValidationError::Required {
            field: "name".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "name is required");
    }

    #[test]
    fn test_store_error_hides_details() {
        let err: ApiError = StoreError::QueryFailed("disk I/O error at page 7".to_string()).into();
        assert_eq!(err.code, ErrorCode::StorageError);
        assert!(!err.message.contains("page 7"));
    }

    #[test]
    fn test_serialized_code_matches_as_str() {
        let err = ApiError::new(ErrorCode::CollaboratorUnavailable, "no camera");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], ErrorCode::CollaboratorUnavailable.as_str());
        assert_eq!(json["message"], "no camera");
    }
}
