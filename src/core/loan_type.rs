//! Loan-type catalog values
//!
//! Loan types are read-only reference data owned by the catalog; this
//! core only consults them for amount-range eligibility.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry of the loan-type catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanType {
    pub id: Uuid,
    pub name: String,
    pub minimum_amount: Decimal,
    pub maximum_amount: Decimal,
    /// Annual interest rate as a fraction, e.g. 0.15 for 15%.
    pub interest_rate: Decimal,
    pub automatic_validation: bool,
}

impl LoanType {
    /// Whether `amount` lies within this type's inclusive bounds.
    pub fn accepts_amount(&self, amount: Decimal) -> bool {
        amount >= self.minimum_amount && amount <= self.maximum_amount
    }
}
