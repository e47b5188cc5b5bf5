//! Loan-request orchestration
//!
//! [`OrdersUseCase`] sequences the creation pipeline (loan-type lookup,
//! amount-range check, pending-status resolution, entity construction,
//! save) and serves the read operations, including the enriched
//! pending-requests page.
//!
//! Every creation stage awaits the previous one and short-circuits
//! with `?`; nothing is written to the store before the final save, so
//! a failure at any stage leaves no partial state behind.

use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::error::OrderError;
use crate::core::order::Order;
use crate::core::pending::{PendingLoanRequest, UserDirectory};
use crate::core::repository::{
    LoanTypeRepository, OrdersRepository, PageRequest, PendingFilter,
};

/// Orchestrates loan-request operations over the storage and
/// collaborator ports.
pub struct OrdersUseCase {
    orders: Arc<dyn OrdersRepository>,
    loan_types: Arc<dyn LoanTypeRepository>,
    users: Arc<dyn UserDirectory>,
}

impl OrdersUseCase {
    pub fn new(
        orders: Arc<dyn OrdersRepository>,
        loan_types: Arc<dyn LoanTypeRepository>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            orders,
            loan_types,
            users,
        }
    }

    /// Create and persist a loan request.
    ///
    /// Stages, in order: resolve the loan type, check the amount
    /// against its bounds, resolve the pending status, build and
    /// validate the entity, save. The first failing stage wins and no
    /// later stage runs.
    pub async fn create_loan_request(
        &self,
        document_id: &str,
        amount: Decimal,
        deadline_months: i32,
        email_address: &str,
        loan_type_id: Uuid,
    ) -> Result<Order, OrderError> {
        let loan_type = self
            .loan_types
            .find_by_id(loan_type_id)
            .await?
            .ok_or(OrderError::LoanTypeNotFound { loan_type_id })?;

        if !loan_type.accepts_amount(amount) {
            return Err(OrderError::InvalidLoanAmount {
                amount,
                minimum: loan_type.minimum_amount,
                maximum: loan_type.maximum_amount,
            });
        }

        let pending_status_id = self.orders.find_pending_status_id().await?.ok_or(
            OrderError::BusinessConfiguration {
                code: "PENDING_STATUS_NOT_FOUND",
                message: "status catalog has no PENDING entry".into(),
            },
        )?;

        let order = Order::create_new(
            document_id,
            amount,
            deadline_months,
            email_address,
            loan_type_id,
            pending_status_id,
        )?;

        debug!(order_id = %order.id, document_id, "saving loan request");
        self.orders.save(order).await
    }

    /// Look up one order by id; absence is an error.
    pub async fn find_by_id(&self, order_id: Uuid) -> Result<Order, OrderError> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound {
                reference: order_id.to_string(),
            })
    }

    /// Look up one order by applicant document; absence is an error.
    pub async fn find_by_document_id(&self, document_id: &str) -> Result<Order, OrderError> {
        self.orders
            .find_by_document_id(document_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound {
                reference: document_id.to_string(),
            })
    }

    /// All orders for an email address; an empty list is a valid answer.
    pub async fn find_by_email_address(&self, email: &str) -> Result<Vec<Order>, OrderError> {
        self.orders.find_by_email_address(email).await
    }

    /// Whether the document already has an order in the given status.
    pub async fn exists_by_document_id_and_status(
        &self,
        document_id: &str,
        status_id: Uuid,
    ) -> Result<bool, OrderError> {
        self.orders
            .exists_by_document_id_and_status(document_id, status_id)
            .await
    }

    /// One page of pending requests, enriched per row from the user
    /// directory.
    ///
    /// Enrichment calls run concurrently and independently; a failed
    /// call downgrades that single row to its un-enriched form instead
    /// of failing the page. The result is 1:1 with the store rows and
    /// keeps their order.
    pub async fn find_pending_requests(
        &self,
        token: &str,
        filter: &PendingFilter,
        page: &PageRequest,
    ) -> Result<Vec<PendingLoanRequest>, OrderError> {
        let rows = self.orders.find_pending_orders(filter, page).await?;

        let enriched = join_all(rows.into_iter().map(|row| {
            let users = Arc::clone(&self.users);
            async move {
                match users.get_user_by_email(token, &row.email_address).await {
                    Ok(profile) => row.enriched_with(profile),
                    Err(err) => {
                        warn!(
                            email = %row.email_address,
                            error = %err,
                            "profile enrichment failed, serving base row"
                        );
                        row
                    }
                }
            }
        }))
        .await;

        Ok(enriched)
    }
}
