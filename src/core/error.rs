//! Typed error handling for the order-origination core
//!
//! Every failure the orchestrator, the repositories or the external
//! gateways can produce is a variant of [`OrderError`], so callers can
//! match specific failures instead of unwrapping a generic
//! `anyhow::Error`.
//!
//! # Error categories
//!
//! - `Validation`: a malformed or out-of-range input field (caller-fixable)
//! - `LoanTypeNotFound`: unknown loan-type reference
//! - `InvalidLoanAmount`: amount outside the loan type's bounds
//! - `OrderNotFound`: lookup by id or document missed
//! - `BusinessConfiguration`: a data-setup defect such as a missing
//!   "PENDING" status row, never a user error
//! - `Unauthorized`: token missing, invalid or lacking the required role
//! - `Gateway`: the auth/user-profile service could not be reached or
//!   answered with an error
//! - `Persistence`: a store-level failure, propagated unmodified

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The main error type for the order-origination service.
#[derive(Debug)]
pub enum OrderError {
    /// A single input field violated its invariant.
    Validation(FieldError),

    /// The referenced loan type does not exist in the catalog.
    LoanTypeNotFound { loan_type_id: Uuid },

    /// The requested amount falls outside the loan type's bounds.
    InvalidLoanAmount {
        amount: Decimal,
        minimum: Decimal,
        maximum: Decimal,
    },

    /// No order matched the given id or document.
    OrderNotFound { reference: String },

    /// The status/type catalogs are missing required seed data.
    BusinessConfiguration {
        code: &'static str,
        message: String,
    },

    /// Token missing, rejected by the auth service, or wrong role.
    Unauthorized { message: String },

    /// An external collaborator call failed at the transport level.
    Gateway { message: String },

    /// Store-level failure, surfaced as-is.
    Persistence(anyhow::Error),
}

/// A field name together with the reason it was rejected.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderError::Validation(e) => {
                write!(f, "Validation error for field '{}': {}", e.field, e.message)
            }
            OrderError::LoanTypeNotFound { loan_type_id } => {
                write!(f, "Loan type '{}' not found", loan_type_id)
            }
            OrderError::InvalidLoanAmount {
                amount,
                minimum,
                maximum,
            } => {
                write!(
                    f,
                    "Amount {} is outside the allowed range [{}, {}]",
                    amount, minimum, maximum
                )
            }
            OrderError::OrderNotFound { reference } => {
                write!(f, "No loan request found for '{}'", reference)
            }
            OrderError::BusinessConfiguration { code, message } => {
                write!(f, "{}: {}", code, message)
            }
            OrderError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            OrderError::Gateway { message } => write!(f, "Gateway error: {}", message),
            OrderError::Persistence(e) => write!(f, "Persistence error: {}", e),
        }
    }
}

impl std::error::Error for OrderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrderError::Persistence(e) => e.source(),
            _ => None,
        }
    }
}

/// Error response structure for HTTP responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl OrderError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderError::Validation(_) => StatusCode::BAD_REQUEST,
            OrderError::LoanTypeNotFound { .. } => StatusCode::NOT_FOUND,
            OrderError::InvalidLoanAmount { .. } => StatusCode::BAD_REQUEST,
            OrderError::OrderNotFound { .. } => StatusCode::NOT_FOUND,
            OrderError::BusinessConfiguration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            OrderError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            OrderError::Gateway { .. } => StatusCode::BAD_GATEWAY,
            OrderError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the stable error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            OrderError::Validation(_) => "VALIDATION_ERROR",
            OrderError::LoanTypeNotFound { .. } => "LOAN_TYPE_NOT_FOUND",
            OrderError::InvalidLoanAmount { .. } => "INVALID_LOAN_AMOUNT",
            OrderError::OrderNotFound { .. } => "ORDER_NOT_FOUND",
            OrderError::BusinessConfiguration { code, .. } => code,
            OrderError::Unauthorized { .. } => "UNAUTHORIZED",
            OrderError::Gateway { .. } => "GATEWAY_ERROR",
            OrderError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Convert to the wire error body.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            OrderError::Validation(e) => Some(serde_json::json!({ "field": e.field })),
            OrderError::InvalidLoanAmount {
                amount,
                minimum,
                maximum,
            } => Some(serde_json::json!({
                "amount": amount.to_string(),
                "minimum": minimum.to_string(),
                "maximum": maximum.to_string(),
            })),
            OrderError::LoanTypeNotFound { loan_type_id } => {
                Some(serde_json::json!({ "loan_type_id": loan_type_id.to_string() }))
            }
            _ => None,
        }
    }

    /// Shortcut for a single-field validation failure.
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        OrderError::Validation(FieldError::new(field, message))
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl From<FieldError> for OrderError {
    fn from(err: FieldError) -> Self {
        OrderError::Validation(err)
    }
}
