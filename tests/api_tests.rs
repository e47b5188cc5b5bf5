//! HTTP-level tests for the loan-request API, running the real router
//! over in-memory adapters and stubbed auth collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use uuid::Uuid;

use crediya_orders::core::auth::{AuthGateway, AuthenticatedUser};
use crediya_orders::core::error::OrderError;
use crediya_orders::core::loan_type::LoanType;
use crediya_orders::core::pending::{ApplicantProfile, UserDirectory};
use crediya_orders::server::{AppState, build_router};
use crediya_orders::storage::{InMemoryLoanTypeRepository, InMemoryOrdersRepository};
use crediya_orders::usecase::OrdersUseCase;

/// Accepts any token and answers with a fixed user and profile.
struct StubAuth {
    role_id: Uuid,
}

#[async_trait]
impl AuthGateway for StubAuth {
    async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, OrderError> {
        if token == "valid-token" {
            Ok(AuthenticatedUser {
                user_id: Uuid::new_v4(),
                role_id: self.role_id,
            })
        } else {
            Err(OrderError::Unauthorized {
                message: "token rejected".into(),
            })
        }
    }
}

#[async_trait]
impl UserDirectory for StubAuth {
    async fn get_user_by_email(
        &self,
        _token: &str,
        _email: &str,
    ) -> Result<ApplicantProfile, OrderError> {
        Ok(ApplicantProfile {
            name: "Ana".into(),
            last_name: "Gomez".into(),
            base_salary: dec!(3500.00),
        })
    }
}

struct TestContext {
    server: TestServer,
    loan_type_id: Uuid,
}

fn create_test_server(role_id: Uuid, required_role: Option<Uuid>) -> TestContext {
    let loan_types = InMemoryLoanTypeRepository::new();
    let loan_type_id = Uuid::new_v4();
    loan_types.insert(LoanType {
        id: loan_type_id,
        name: "personal".into(),
        minimum_amount: dec!(10000),
        maximum_amount: dec!(100000),
        interest_rate: dec!(0.15),
        automatic_validation: true,
    });
    let orders = InMemoryOrdersRepository::new(loan_types.clone());
    orders.seed_status(Uuid::new_v4(), "PENDING");

    let auth = Arc::new(StubAuth { role_id });
    let use_case = OrdersUseCase::new(Arc::new(orders), Arc::new(loan_types), auth.clone());

    let state = AppState {
        use_case: Arc::new(use_case),
        auth,
        client_role_id: required_role,
        advisor_role_id: required_role,
    };
    let server = TestServer::new(build_router(state));
    TestContext {
        server,
        loan_type_id,
    }
}

fn open_server() -> TestContext {
    create_test_server(Uuid::new_v4(), None)
}

fn create_body(ctx: &TestContext) -> Value {
    json!({
        "documento_identidad": "12345678",
        "amount": "50000.00",
        "deadline": 24,
        "email_address": "test@example.com",
        "id_tipo_prestamo": ctx.loan_type_id,
    })
}

#[tokio::test]
async fn health_endpoint_is_open() {
    let ctx = open_server();
    let response = ctx.server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn create_requires_a_bearer_token() {
    let ctx = open_server();
    let body = create_body(&ctx);

    let response = ctx.server.post("/api/v1/solicitud").json(&body).await;
    response.assert_status_unauthorized();

    let error: Value = response.json();
    assert_eq!(error["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn create_rejects_an_invalid_token() {
    let ctx = open_server();
    let body = create_body(&ctx);

    let response = ctx
        .server
        .post("/api/v1/solicitud")
        .authorization_bearer("wrong-token")
        .json(&body)
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn create_returns_the_stored_request() {
    let ctx = open_server();
    let body = create_body(&ctx);

    let response = ctx
        .server
        .post("/api/v1/solicitud")
        .authorization_bearer("valid-token")
        .json(&body)
        .await;
    response.assert_status_ok();

    let created: Value = response.json();
    assert_eq!(created["document_id"], "12345678");
    assert_eq!(created["deadline"], 24);
    assert_eq!(created["email_address"], "test@example.com");
    assert!(created["id"].as_str().is_some());
    assert_eq!(created["creation_date"], created["update_date"]);
}

#[tokio::test]
async fn create_surfaces_validation_errors_as_bad_request() {
    let ctx = open_server();
    let body = json!({
        "documento_identidad": "12AB",
        "amount": "50000.00",
        "deadline": 24,
        "email_address": "test@example.com",
        "id_tipo_prestamo": ctx.loan_type_id,
    });

    let response = ctx
        .server
        .post("/api/v1/solicitud")
        .authorization_bearer("valid-token")
        .json(&body)
        .await;
    response.assert_status_bad_request();

    let error: Value = response.json();
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert_eq!(error["details"]["field"], "document_id");
}

#[tokio::test]
async fn create_reports_amount_bounds_for_out_of_range_requests() {
    let ctx = open_server();
    let body = json!({
        "documento_identidad": "12345678",
        "amount": "5.00",
        "deadline": 24,
        "email_address": "test@example.com",
        "id_tipo_prestamo": ctx.loan_type_id,
    });

    let response = ctx
        .server
        .post("/api/v1/solicitud")
        .authorization_bearer("valid-token")
        .json(&body)
        .await;
    response.assert_status_bad_request();

    let error: Value = response.json();
    assert_eq!(error["code"], "INVALID_LOAN_AMOUNT");
    assert_eq!(error["details"]["minimum"], "10000");
    assert_eq!(error["details"]["maximum"], "100000");
}

#[tokio::test]
async fn create_enforces_the_configured_role() {
    let user_role = Uuid::new_v4();
    let required = Uuid::new_v4();
    let ctx = create_test_server(user_role, Some(required));
    let body = create_body(&ctx);

    let response = ctx
        .server
        .post("/api/v1/solicitud")
        .authorization_bearer("valid-token")
        .json(&body)
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn get_by_id_round_trips_a_created_request() {
    let ctx = open_server();
    let body = create_body(&ctx);

    let created: Value = ctx
        .server
        .post("/api/v1/solicitud")
        .authorization_bearer("valid-token")
        .json(&body)
        .await
        .json();
    let id = created["id"].as_str().map(str::to_owned).unwrap();

    let response = ctx
        .server
        .get(&format!("/api/v1/solicitud/{id}"))
        .authorization_bearer("valid-token")
        .await;
    response.assert_status_ok();

    let fetched: Value = response.json();
    assert_eq!(fetched["id"], id.as_str());
    assert_eq!(fetched["document_id"], "12345678");
}

#[tokio::test]
async fn get_by_id_misses_with_not_found() {
    let ctx = open_server();

    let response = ctx
        .server
        .get(&format!("/api/v1/solicitud/{}", Uuid::new_v4()))
        .authorization_bearer("valid-token")
        .await;
    response.assert_status_not_found();

    let error: Value = response.json();
    assert_eq!(error["code"], "ORDER_NOT_FOUND");
}

#[tokio::test]
async fn pending_listing_returns_enriched_rows() {
    let ctx = open_server();
    let body = create_body(&ctx);
    ctx.server
        .post("/api/v1/solicitud")
        .authorization_bearer("valid-token")
        .json(&body)
        .await
        .assert_status_ok();

    let response = ctx
        .server
        .get("/api/v1/solicitud/pendientes")
        .authorization_bearer("valid-token")
        .await;
    response.assert_status_ok();

    let rows: Vec<Value> = response.json();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["email_address"], "test@example.com");
    assert_eq!(rows[0]["loan_type"], "personal");
    assert_eq!(rows[0]["status"], "PENDING");
    assert_eq!(rows[0]["applicant_name"], "Ana Gomez");
}

#[tokio::test]
async fn pending_listing_honors_pagination_params() {
    let ctx = open_server();
    for i in 0..3 {
        let body = json!({
            "documento_identidad": format!("1234567{i}"),
            "amount": "20000",
            "deadline": 12,
            "email_address": format!("user{i}@example.com"),
            "id_tipo_prestamo": ctx.loan_type_id,
        });
        ctx.server
            .post("/api/v1/solicitud")
            .authorization_bearer("valid-token")
            .json(&body)
            .await
            .assert_status_ok();
    }

    let response = ctx
        .server
        .get("/api/v1/solicitud/pendientes")
        .add_query_param("page", 1)
        .add_query_param("size", 2)
        .authorization_bearer("valid-token")
        .await;
    response.assert_status_ok();

    let rows: Vec<Value> = response.json();
    assert_eq!(rows.len(), 1);
}
