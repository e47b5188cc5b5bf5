//! Persistence ports for orders and the loan-type catalog
//!
//! Implementations provide storage for a specific backend; the core is
//! agnostic to the underlying store. All operations return the typed
//! crate error so orchestration can fail fast without inspecting
//! backend details.

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::OrderError;
use crate::core::loan_type::LoanType;
use crate::core::order::Order;
use crate::core::pending::PendingLoanRequest;

/// Zero-based page request for the pending listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Row offset of this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Row offset as the store's signed type. `page * size` past
    /// `i64::MAX` is a caller error, not a store error.
    pub fn sql_offset(&self) -> Result<i64, OrderError> {
        i64::try_from(self.offset())
            .map_err(|_| OrderError::field("page", "page and size exceed the supported range"))
    }
}

/// Optional filters for the pending listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingFilter {
    pub status_id: Option<Uuid>,
    pub email_address: Option<String>,
}

/// Storage port for loan requests.
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Persist `order`, inserting when its id is new and updating the
    /// full row when it already exists. Returns the stored entity.
    async fn save(&self, order: Order) -> Result<Order, OrderError>;

    /// Look up one order by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, OrderError>;

    /// Look up one order by applicant document.
    async fn find_by_document_id(&self, document_id: &str) -> Result<Option<Order>, OrderError>;

    /// All orders for an email address; absence is an empty result.
    async fn find_by_email_address(&self, email: &str) -> Result<Vec<Order>, OrderError>;

    /// Whether any order exists for the document in the given status.
    async fn exists_by_document_id_and_status(
        &self,
        document_id: &str,
        status_id: Uuid,
    ) -> Result<bool, OrderError>;

    /// Identifier of the "PENDING" status catalog entry, if seeded.
    async fn find_pending_status_id(&self) -> Result<Option<Uuid>, OrderError>;

    /// One page of un-enriched pending projections, in store order.
    async fn find_pending_orders(
        &self,
        filter: &PendingFilter,
        page: &PageRequest,
    ) -> Result<Vec<PendingLoanRequest>, OrderError>;
}

/// Read-only port into the loan-type catalog.
#[async_trait]
pub trait LoanTypeRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LoanType>, OrderError>;
}
