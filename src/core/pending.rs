//! Pending-request reporting: the read-side projection and the
//! user-directory port that enriches it
//!
//! A [`PendingLoanRequest`] is assembled per query from the joined
//! orders/status/loan-type rows; it is never persisted. Enrichment
//! (applicant name and base salary) comes from the external user
//! directory and is strictly best-effort: a row that cannot be
//! enriched keeps its base fields and `None` applicant data.

use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::core::error::OrderError;

/// One row of the pending-requests report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingLoanRequest {
    pub amount: Decimal,
    pub deadline_months: i32,
    pub email_address: String,
    /// Loan-type name from the catalog join.
    pub loan_type: String,
    pub interest_rate: Decimal,
    /// Status name from the status join.
    pub status: String,
    /// Monthly annuity installment for this request.
    pub total_monthly_debt: Decimal,
    /// Applicant display name, filled by enrichment.
    pub applicant_name: Option<String>,
    /// Applicant base salary, filled by enrichment.
    pub base_salary: Option<Decimal>,
}

impl PendingLoanRequest {
    /// Fold the directory profile into this row.
    pub fn enriched_with(mut self, profile: ApplicantProfile) -> Self {
        self.applicant_name = Some(format!("{} {}", profile.name, profile.last_name));
        self.base_salary = Some(profile.base_salary);
        self
    }
}

/// The user-directory answer for one email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub name: String,
    #[serde(alias = "lastName")]
    pub last_name: String,
    #[serde(alias = "baseSalary")]
    pub base_salary: Decimal,
}

/// External user-profile collaborator.
///
/// Read-only and side-effect-free from this core's perspective. The
/// caller's bearer token is forwarded on every call.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user_by_email(
        &self,
        token: &str,
        email: &str,
    ) -> Result<ApplicantProfile, OrderError>;
}

/// Standard annuity installment for `amount` at `annual_rate` over
/// `months`, rounded to 2 decimals.
///
/// Zero interest degenerates to straight division. The power term is
/// built by repeated multiplication; deadlines are capped at 360
/// months so the loop is bounded. A rate extreme enough to overflow
/// the power term yields `ZERO` (an unpriced row) rather than a
/// panic; the catalog is external data and cannot be trusted to stay
/// in a sane range.
pub fn monthly_installment(amount: Decimal, annual_rate: Decimal, months: i32) -> Decimal {
    if months <= 0 {
        return Decimal::ZERO;
    }
    let periods = Decimal::from(months);
    let monthly_rate = annual_rate / Decimal::from(12);
    if monthly_rate.is_zero() {
        return (amount / periods).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    }
    let base = Decimal::ONE + monthly_rate;
    let mut factor = Decimal::ONE;
    for _ in 0..months {
        factor = match factor.checked_mul(base) {
            Some(f) => f,
            None => return Decimal::ZERO,
        };
    }
    let numerator = match amount
        .checked_mul(monthly_rate)
        .and_then(|v| v.checked_mul(factor))
    {
        Some(v) => v,
        None => return Decimal::ZERO,
    };
    (numerator / (factor - Decimal::ONE))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
