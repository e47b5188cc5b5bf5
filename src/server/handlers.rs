//! HTTP handlers for the loan-request endpoints
//!
//! Thin layer: extract and check the bearer token, decode the DTO,
//! call the use case, map the entity to the response shape. Role ids
//! are optional deployment data; when absent, any valid token passes.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::core::auth::AuthGateway;
use crate::core::error::OrderError;
use crate::core::order::Order;
use crate::core::pending::PendingLoanRequest;
use crate::core::repository::{PageRequest, PendingFilter};
use crate::usecase::OrdersUseCase;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub use_case: Arc<OrdersUseCase>,
    pub auth: Arc<dyn AuthGateway>,
    pub client_role_id: Option<Uuid>,
    pub advisor_role_id: Option<Uuid>,
}

/// Request body for creating a loan request. Field names follow the
/// platform's public API contract.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLoanRequestDto {
    #[serde(rename = "documento_identidad")]
    pub document_id: String,
    pub amount: Decimal,
    pub deadline: i32,
    pub email_address: String,
    #[serde(rename = "id_tipo_prestamo")]
    pub loan_type_id: Uuid,
}

/// Response body for a stored loan request.
#[derive(Debug, Clone, Serialize)]
pub struct LoanRequestResponseDto {
    pub id: Uuid,
    pub document_id: String,
    pub amount: Decimal,
    pub deadline: i32,
    pub email_address: String,
    pub loan_type_id: Uuid,
    pub status_id: Uuid,
    pub creation_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
}

impl From<Order> for LoanRequestResponseDto {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            document_id: order.document_id,
            amount: order.amount,
            deadline: order.deadline_months,
            email_address: order.email_address,
            loan_type_id: order.loan_type_id,
            status_id: order.status_id,
            creation_date: order.created_at,
            update_date: order.updated_at,
        }
    }
}

/// Query parameters for the pending listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingQuery {
    pub status_id: Option<Uuid>,
    pub email: Option<String>,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
}

fn default_page_size() -> u32 {
    10
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, OrderError> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| OrderError::Unauthorized {
            message: "Authorization header missing or invalid".into(),
        })
}

async fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    required_role: Option<Uuid>,
) -> Result<String, OrderError> {
    let token = bearer_token(headers)?;
    let user = state.auth.validate_token(token).await?;
    if !user.has_role(required_role) {
        return Err(OrderError::Unauthorized {
            message: "role not allowed for this operation".into(),
        });
    }
    Ok(token.to_string())
}

/// `POST /api/v1/solicitud`
pub async fn create_loan_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(dto): Json<CreateLoanRequestDto>,
) -> Result<Json<LoanRequestResponseDto>, OrderError> {
    authorize(&state, &headers, state.client_role_id).await?;

    info!(document_id = %dto.document_id, "processing loan request");
    let order = state
        .use_case
        .create_loan_request(
            &dto.document_id,
            dto.amount,
            dto.deadline,
            &dto.email_address,
            dto.loan_type_id,
        )
        .await?;

    info!(order_id = %order.id, "loan request created");
    Ok(Json(order.into()))
}

/// `GET /api/v1/solicitud/{id}`
pub async fn get_loan_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<LoanRequestResponseDto>, OrderError> {
    authorize(&state, &headers, state.advisor_role_id).await?;

    let order = state.use_case.find_by_id(id).await?;
    Ok(Json(order.into()))
}

/// `GET /api/v1/solicitud/pendientes`
pub async fn list_pending_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PendingQuery>,
) -> Result<Json<Vec<PendingLoanRequest>>, OrderError> {
    let token = authorize(&state, &headers, state.advisor_role_id).await?;

    let filter = PendingFilter {
        status_id: query.status_id,
        email_address: query.email,
    };
    let page = PageRequest::new(query.page, query.size);
    let rows = state
        .use_case
        .find_pending_requests(&token, &filter, &page)
        .await?;
    Ok(Json(rows))
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
