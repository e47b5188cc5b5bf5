//! The loan request ("order") entity and its creation invariants
//!
//! An [`Order`] is immutable after construction from the domain's point
//! of view: the only way to obtain one with a fresh identity is
//! [`Order::create_new`], which stamps the id and both timestamps and
//! runs the full invariant check. Repositories rehydrate persisted rows
//! through plain struct construction; they never re-run validation.

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

use crate::core::error::OrderError;

/// Upper bound on the repayment deadline, in months (30 years).
pub const MAX_DEADLINE_MONTHS: i32 = 360;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email regex")
});

static DOCUMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{8,12}$").expect("document regex"));

/// A loan request as the platform tracks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    /// Applicant identity document, 8 to 12 digits.
    pub document_id: String,
    /// Requested amount; positive, at most two fractional digits.
    pub amount: Decimal,
    /// Repayment deadline in months, 1..=360.
    pub deadline_months: i32,
    pub email_address: String,
    pub loan_type_id: Uuid,
    pub status_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build a brand-new, validated loan request.
    ///
    /// Stamps a fresh v4 id, sets `created_at == updated_at`, assigns
    /// the resolved pending status and runs [`Self::validate_for_creation`].
    /// This is the only construction path for unpersisted orders;
    /// callers must not hand-assemble an entity with their own id.
    pub fn create_new(
        document_id: impl Into<String>,
        amount: Decimal,
        deadline_months: i32,
        email_address: impl Into<String>,
        loan_type_id: Uuid,
        pending_status_id: Uuid,
    ) -> Result<Self, OrderError> {
        let now = Utc::now();
        let order = Self {
            id: Uuid::new_v4(),
            document_id: document_id.into(),
            amount,
            deadline_months,
            email_address: email_address.into(),
            loan_type_id,
            status_id: pending_status_id,
            created_at: now,
            updated_at: now,
        };
        order.validate_for_creation()?;
        Ok(order)
    }

    /// Check every creation invariant, failing on the first violation.
    ///
    /// The check order is a contract: document id, amount, deadline,
    /// email, loan type. Error messages are deterministic because the
    /// first broken rule always wins.
    pub fn validate_for_creation(&self) -> Result<(), OrderError> {
        self.validate_document_id()?;
        self.validate_amount()?;
        self.validate_deadline()?;
        self.validate_email()?;
        self.validate_loan_type()?;
        Ok(())
    }

    fn validate_document_id(&self) -> Result<(), OrderError> {
        if self.document_id.trim().is_empty() {
            return Err(OrderError::field("document_id", "document id is required"));
        }
        if !DOCUMENT_RE.is_match(&self.document_id) {
            return Err(OrderError::field(
                "document_id",
                "document id must be 8 to 12 digits",
            ));
        }
        Ok(())
    }

    fn validate_amount(&self) -> Result<(), OrderError> {
        if self.amount <= Decimal::ZERO {
            return Err(OrderError::field("amount", "amount must be greater than 0"));
        }
        // normalize() drops trailing zeros so 50000.00 counts as scale 0
        if self.amount.normalize().scale() > 2 {
            return Err(OrderError::field(
                "amount",
                "amount cannot have more than 2 decimal places",
            ));
        }
        Ok(())
    }

    fn validate_deadline(&self) -> Result<(), OrderError> {
        if self.deadline_months <= 0 {
            return Err(OrderError::field(
                "deadline_months",
                "deadline must be greater than 0",
            ));
        }
        if self.deadline_months > MAX_DEADLINE_MONTHS {
            return Err(OrderError::field(
                "deadline_months",
                format!("deadline cannot exceed {} months", MAX_DEADLINE_MONTHS),
            ));
        }
        Ok(())
    }

    fn validate_email(&self) -> Result<(), OrderError> {
        if self.email_address.trim().is_empty() {
            return Err(OrderError::field(
                "email_address",
                "email address is required",
            ));
        }
        if !EMAIL_RE.is_match(&self.email_address) {
            return Err(OrderError::field(
                "email_address",
                "email address has an invalid format",
            ));
        }
        Ok(())
    }

    fn validate_loan_type(&self) -> Result<(), OrderError> {
        if self.loan_type_id.is_nil() {
            return Err(OrderError::field("loan_type_id", "loan type is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_order(
        document_id: &str,
        amount: Decimal,
        deadline: i32,
        email: &str,
        loan_type_id: Uuid,
    ) -> Result<Order, OrderError> {
        Order::create_new(
            document_id,
            amount,
            deadline,
            email,
            loan_type_id,
            Uuid::new_v4(),
        )
    }

    fn rejected_field(result: Result<Order, OrderError>) -> &'static str {
        match result {
            Err(OrderError::Validation(e)) => e.field,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn create_new_stamps_identity_and_equal_timestamps() {
        let loan_type = Uuid::new_v4();
        let status = Uuid::new_v4();
        let order = Order::create_new(
            "12345678",
            dec!(50000.00),
            24,
            "test@example.com",
            loan_type,
            status,
        )
        .unwrap();

        assert!(!order.id.is_nil());
        assert_eq!(order.status_id, status);
        assert_eq!(order.loan_type_id, loan_type);
        assert_eq!(order.created_at, order.updated_at);
    }

    #[test]
    fn two_orders_never_share_an_id() {
        let a = new_order("12345678", dec!(100), 12, "a@example.com", Uuid::new_v4()).unwrap();
        let b = new_order("12345678", dec!(100), 12, "a@example.com", Uuid::new_v4()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn rejects_empty_document_id() {
        let r = new_order("", dec!(100), 12, "a@example.com", Uuid::new_v4());
        assert_eq!(rejected_field(r), "document_id");
    }

    #[test]
    fn rejects_non_numeric_document_id() {
        let r = new_order("12345abc", dec!(100), 12, "a@example.com", Uuid::new_v4());
        assert_eq!(rejected_field(r), "document_id");
    }

    #[test]
    fn rejects_document_id_with_wrong_length() {
        let short = new_order("1234567", dec!(100), 12, "a@example.com", Uuid::new_v4());
        assert_eq!(rejected_field(short), "document_id");
        let long = new_order("1234567890123", dec!(100), 12, "a@example.com", Uuid::new_v4());
        assert_eq!(rejected_field(long), "document_id");
    }

    #[test]
    fn rejects_zero_and_negative_amounts() {
        let zero = new_order("12345678", dec!(0), 12, "a@example.com", Uuid::new_v4());
        assert_eq!(rejected_field(zero), "amount");
        let negative = new_order("12345678", dec!(-10), 12, "a@example.com", Uuid::new_v4());
        assert_eq!(rejected_field(negative), "amount");
    }

    #[test]
    fn rejects_amount_with_more_than_two_decimals() {
        let r = new_order("12345678", dec!(10.123), 12, "a@example.com", Uuid::new_v4());
        assert_eq!(rejected_field(r), "amount");
    }

    #[test]
    fn accepts_amount_with_trailing_zero_decimals() {
        // 100.100 normalizes to one effective fractional digit
        assert!(new_order("12345678", dec!(100.100), 12, "a@example.com", Uuid::new_v4()).is_ok());
    }

    #[test]
    fn rejects_deadline_out_of_range() {
        let zero = new_order("12345678", dec!(100), 0, "a@example.com", Uuid::new_v4());
        assert_eq!(rejected_field(zero), "deadline_months");
        let too_long = new_order("12345678", dec!(100), 361, "a@example.com", Uuid::new_v4());
        assert_eq!(rejected_field(too_long), "deadline_months");
    }

    #[test]
    fn accepts_deadline_boundaries() {
        assert!(new_order("12345678", dec!(100), 1, "a@example.com", Uuid::new_v4()).is_ok());
        assert!(new_order("12345678", dec!(100), 360, "a@example.com", Uuid::new_v4()).is_ok());
    }

    #[test]
    fn rejects_malformed_email_even_when_other_fields_are_valid() {
        let r = new_order("12345678", dec!(50000), 24, "invalid-email", Uuid::new_v4());
        match r {
            Err(OrderError::Validation(e)) => {
                assert_eq!(e.field, "email_address");
                assert!(e.message.contains("format"));
            }
            other => panic!("expected an email validation error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_nil_loan_type() {
        let r = new_order("12345678", dec!(100), 12, "a@example.com", Uuid::nil());
        assert_eq!(rejected_field(r), "loan_type_id");
    }

    #[test]
    fn validation_order_reports_document_before_amount() {
        // Both fields are broken; the document check must win.
        let r = new_order("bad", dec!(-1), 0, "nope", Uuid::nil());
        assert_eq!(rejected_field(r), "document_id");
    }

    #[test]
    fn validation_order_reports_amount_before_deadline() {
        let r = new_order("12345678", dec!(-1), 0, "nope", Uuid::nil());
        assert_eq!(rejected_field(r), "amount");
    }

    #[test]
    fn validation_order_reports_deadline_before_email() {
        let r = new_order("12345678", dec!(100), 0, "nope", Uuid::nil());
        assert_eq!(rejected_field(r), "deadline_months");
    }

    #[test]
    fn validation_order_reports_email_before_loan_type() {
        let r = new_order("12345678", dec!(100), 12, "nope", Uuid::nil());
        assert_eq!(rejected_field(r), "email_address");
    }
}
