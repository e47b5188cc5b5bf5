use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crediya_orders::clients::AuthServiceClient;
use crediya_orders::config;
use crediya_orders::server::{AppState, build_router};
use crediya_orders::storage::{PgLoanTypeRepository, PgOrdersRepository, ensure_schema};
use crediya_orders::usecase::OrdersUseCase;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("crediya_orders=debug,tower_http=info")),
        )
        .init();

    let settings = config::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&settings.database_url)
        .await
        .context("connecting to the orders database")?;
    ensure_schema(&pool).await?;

    let auth = Arc::new(AuthServiceClient::new(&settings.auth_service_base_url));
    let use_case = OrdersUseCase::new(
        Arc::new(PgOrdersRepository::new(pool.clone())),
        Arc::new(PgLoanTypeRepository::new(pool)),
        auth.clone(),
    );

    let state = AppState {
        use_case: Arc::new(use_case),
        auth,
        client_role_id: settings.client_role_id,
        advisor_role_id: settings.advisor_role_id,
    };
    let app = build_router(state);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;
    info!(%addr, "orders service listening");
    axum::serve(listener, app).await.context("serving HTTP")?;

    Ok(())
}
