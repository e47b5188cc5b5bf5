//! Environment-driven service settings

use std::env;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub auth_service_base_url: String,
    pub host: String,
    pub port: u16,
    /// Role allowed to create loan requests. `None` disables role gating.
    pub client_role_id: Option<Uuid>,
    /// Role allowed to read and list loan requests.
    pub advisor_role_id: Option<Uuid>,
}

/// Load settings from the environment, with local-dev defaults for
/// everything except `DATABASE_URL`.
pub fn load() -> anyhow::Result<Settings> {
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

    let auth_service_base_url = env::var("AUTH_SERVICE_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:8090".to_string());

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8080);

    let client_role_id = parse_role("CLIENT_ROLE_ID")?;
    let advisor_role_id = parse_role("ADVISOR_ROLE_ID")?;

    Ok(Settings {
        database_url,
        auth_service_base_url,
        host,
        port,
        client_role_id,
        advisor_role_id,
    })
}

fn parse_role(var: &str) -> anyhow::Result<Option<Uuid>> {
    match env::var(var) {
        Ok(value) => Uuid::parse_str(&value)
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} is not a valid UUID: {}", var, e)),
        Err(_) => Ok(None),
    }
}
