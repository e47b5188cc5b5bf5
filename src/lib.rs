//! # Crediya Orders
//!
//! Loan-request origination service for the Crediya lending platform.
//!
//! ## Features
//!
//! - **Hexagonal layout**: domain entities and ports in `core`, the
//!   orchestration logic in `usecase`, adapters in `storage` and `clients`
//! - **Fixed-order validation**: loan requests are checked field by field
//!   in a stable order so clients always see the first failing rule
//! - **Upsert-safe persistence**: saving an order inserts or updates
//!   inside one transaction, keyed by the order id
//! - **Pending-request review**: paginated listing of pending requests,
//!   enriched per row from the user directory with per-row failure
//!   isolation
//! - **Token-gated API**: every endpoint validates a bearer token against
//!   the auth service, with optional role restrictions per operation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crediya_orders::prelude::*;
//!
//! let loan_types = InMemoryLoanTypeRepository::new();
//! let orders = InMemoryOrdersRepository::new(loan_types.clone());
//! let auth = Arc::new(AuthServiceClient::new("http://localhost:8090"));
//!
//! let use_case = OrdersUseCase::new(
//!     Arc::new(orders),
//!     Arc::new(loan_types),
//!     auth.clone(),
//! );
//!
//! let state = AppState {
//!     use_case: Arc::new(use_case),
//!     auth,
//!     client_role_id: None,
//!     advisor_role_id: None,
//! };
//! let app = build_router(state);
//! ```

pub mod clients;
pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod usecase;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{AuthGateway, AuthenticatedUser},
        error::{ErrorResponse, FieldError, OrderError},
        loan_type::LoanType,
        order::Order,
        pending::{ApplicantProfile, PendingLoanRequest, UserDirectory, monthly_installment},
        repository::{LoanTypeRepository, OrdersRepository, PageRequest, PendingFilter},
    };

    // === Use case ===
    pub use crate::usecase::OrdersUseCase;

    // === Storage ===
    pub use crate::storage::{
        InMemoryLoanTypeRepository, InMemoryOrdersRepository, PgLoanTypeRepository,
        PgOrdersRepository, ensure_schema,
    };

    // === Clients ===
    pub use crate::clients::AuthServiceClient;

    // === Config ===
    pub use crate::config::Settings;

    // === Server ===
    pub use crate::server::{AppState, build_router};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
