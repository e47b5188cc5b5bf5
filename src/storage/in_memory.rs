//! In-memory implementations of the storage ports for testing and
//! development
//!
//! Uses `RwLock`-guarded maps for thread-safe access. The upsert
//! semantics mirror the Postgres adapter: an unknown id inserts the
//! row as given, a known id replaces the row and refreshes
//! `updated_at`.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::core::error::OrderError;
use crate::core::loan_type::LoanType;
use crate::core::order::Order;
use crate::core::pending::{PendingLoanRequest, monthly_installment};
use crate::core::repository::{
    LoanTypeRepository, OrdersRepository, PageRequest, PendingFilter,
};

/// In-memory loan-type catalog.
#[derive(Clone, Default)]
pub struct InMemoryLoanTypeRepository {
    types: Arc<RwLock<HashMap<Uuid, LoanType>>>,
}

impl InMemoryLoanTypeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one catalog entry.
    pub fn insert(&self, loan_type: LoanType) {
        if let Ok(mut types) = self.types.write() {
            types.insert(loan_type.id, loan_type);
        }
    }
}

#[async_trait]
impl LoanTypeRepository for InMemoryLoanTypeRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LoanType>, OrderError> {
        let types = self
            .types
            .read()
            .map_err(|e| OrderError::Persistence(anyhow!("lock poisoned: {}", e)))?;
        Ok(types.get(&id).cloned())
    }
}

/// In-memory order store with a small status catalog.
#[derive(Clone)]
pub struct InMemoryOrdersRepository {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
    statuses: Arc<RwLock<HashMap<Uuid, String>>>,
    loan_types: InMemoryLoanTypeRepository,
}

impl InMemoryOrdersRepository {
    pub fn new(loan_types: InMemoryLoanTypeRepository) -> Self {
        Self {
            orders: Arc::new(RwLock::new(HashMap::new())),
            statuses: Arc::new(RwLock::new(HashMap::new())),
            loan_types,
        }
    }

    /// Seed one status catalog entry.
    pub fn seed_status(&self, id: Uuid, name: impl Into<String>) {
        if let Ok(mut statuses) = self.statuses.write() {
            statuses.insert(id, name.into());
        }
    }

    /// Number of stored orders. Test helper.
    pub fn len(&self) -> usize {
        self.orders.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_orders(&self) -> Result<Vec<Order>, OrderError> {
        let orders = self
            .orders
            .read()
            .map_err(|e| OrderError::Persistence(anyhow!("lock poisoned: {}", e)))?;
        Ok(orders.values().cloned().collect())
    }
}

#[async_trait]
impl OrdersRepository for InMemoryOrdersRepository {
    async fn save(&self, order: Order) -> Result<Order, OrderError> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| OrderError::Persistence(anyhow!("lock poisoned: {}", e)))?;

        let mut stored = order;
        if orders.contains_key(&stored.id) {
            stored.updated_at = Utc::now();
        }
        orders.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, OrderError> {
        let orders = self
            .orders
            .read()
            .map_err(|e| OrderError::Persistence(anyhow!("lock poisoned: {}", e)))?;
        Ok(orders.get(&id).cloned())
    }

    async fn find_by_document_id(&self, document_id: &str) -> Result<Option<Order>, OrderError> {
        let mut matches: Vec<Order> = self
            .read_orders()?
            .into_iter()
            .filter(|o| o.document_id == document_id)
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches.into_iter().next())
    }

    async fn find_by_email_address(&self, email: &str) -> Result<Vec<Order>, OrderError> {
        let mut matches: Vec<Order> = self
            .read_orders()?
            .into_iter()
            .filter(|o| o.email_address == email)
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn exists_by_document_id_and_status(
        &self,
        document_id: &str,
        status_id: Uuid,
    ) -> Result<bool, OrderError> {
        Ok(self
            .read_orders()?
            .iter()
            .any(|o| o.document_id == document_id && o.status_id == status_id))
    }

    async fn find_pending_status_id(&self) -> Result<Option<Uuid>, OrderError> {
        let statuses = self
            .statuses
            .read()
            .map_err(|e| OrderError::Persistence(anyhow!("lock poisoned: {}", e)))?;
        Ok(statuses
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case("PENDING"))
            .map(|(id, _)| *id))
    }

    async fn find_pending_orders(
        &self,
        filter: &PendingFilter,
        page: &PageRequest,
    ) -> Result<Vec<PendingLoanRequest>, OrderError> {
        let statuses = self
            .statuses
            .read()
            .map_err(|e| OrderError::Persistence(anyhow!("lock poisoned: {}", e)))?
            .clone();

        let mut rows: Vec<Order> = self
            .read_orders()?
            .into_iter()
            .filter(|o| filter.status_id.is_none_or(|s| o.status_id == s))
            .filter(|o| {
                filter
                    .email_address
                    .as_deref()
                    .is_none_or(|e| o.email_address == e)
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        // Same page bound as the SQL adapter.
        let offset = page.sql_offset()? as usize;

        let mut projections = Vec::new();
        for order in rows
            .into_iter()
            .skip(offset)
            .take(page.size as usize)
        {
            // Inner join semantics: rows whose catalogs are missing do
            // not appear, matching the SQL adapter.
            let Some(loan_type) = self.loan_types.find_by_id(order.loan_type_id).await? else {
                continue;
            };
            let Some(status) = statuses.get(&order.status_id) else {
                continue;
            };
            projections.push(PendingLoanRequest {
                total_monthly_debt: monthly_installment(
                    order.amount,
                    loan_type.interest_rate,
                    order.deadline_months,
                ),
                amount: order.amount,
                deadline_months: order.deadline_months,
                email_address: order.email_address,
                loan_type: loan_type.name,
                interest_rate: loan_type.interest_rate,
                status: status.clone(),
                applicant_name: None,
                base_salary: None,
            });
        }
        Ok(projections)
    }
}
