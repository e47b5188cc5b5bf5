//! HTTP client for the external auth / user-profile service
//!
//! Implements both collaborator ports: token validation
//! (`GET /api/v1/auth/validate`) and user lookup by email
//! (`GET /api/v1/users/byEmail/{email}`). The caller's bearer token is
//! forwarded on every request; this client adds no retries or
//! timeouts of its own.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::core::auth::{AuthGateway, AuthenticatedUser};
use crate::core::error::OrderError;
use crate::core::pending::{ApplicantProfile, UserDirectory};

#[derive(Clone)]
pub struct AuthServiceClient {
    http: Client,
    base_url: String,
}

impl AuthServiceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AuthGateway for AuthServiceClient {
    async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, OrderError> {
        let url = format!("{}/api/v1/auth/validate", self.base_url);
        let res = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| OrderError::Gateway {
                message: format!("auth service unreachable: {}", e),
            })?;

        match res.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(OrderError::Unauthorized {
                message: "token rejected by the auth service".into(),
            }),
            status if !status.is_success() => Err(OrderError::Gateway {
                message: format!("auth service answered {}", status),
            }),
            _ => res
                .json::<AuthenticatedUser>()
                .await
                .map_err(|e| OrderError::Gateway {
                    message: format!("invalid auth service response: {}", e),
                }),
        }
    }
}

#[async_trait]
impl UserDirectory for AuthServiceClient {
    async fn get_user_by_email(
        &self,
        token: &str,
        email: &str,
    ) -> Result<ApplicantProfile, OrderError> {
        let url = format!("{}/api/v1/users/byEmail/{}", self.base_url, email);
        let res = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| OrderError::Gateway {
                message: format!("user service unreachable: {}", e),
            })?;

        if !res.status().is_success() {
            return Err(OrderError::Gateway {
                message: format!("user lookup for '{}' answered {}", email, res.status()),
            });
        }

        res.json::<ApplicantProfile>()
            .await
            .map_err(|e| OrderError::Gateway {
                message: format!("invalid user service response: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = AuthServiceClient::new("http://localhost:8090/");
        assert_eq!(client.base_url, "http://localhost:8090");
    }
}
