//! Core module containing the domain entities, ports and errors

pub mod auth;
pub mod error;
pub mod loan_type;
pub mod order;
pub mod pending;
pub mod repository;

pub use auth::{AuthGateway, AuthenticatedUser};
pub use error::{FieldError, OrderError};
pub use loan_type::LoanType;
pub use order::Order;
pub use pending::{ApplicantProfile, PendingLoanRequest, UserDirectory, monthly_installment};
pub use repository::{LoanTypeRepository, OrdersRepository, PageRequest, PendingFilter};
