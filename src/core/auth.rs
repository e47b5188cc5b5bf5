//! Authentication collaborator port
//!
//! Token validation and role lookup live in an external service; this
//! core only consumes the narrow contract below. The server layer is
//! the sole caller, the orchestrator never inspects tokens itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::OrderError;

/// The auth service's answer for a valid token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    #[serde(alias = "userId")]
    pub user_id: Uuid,
    #[serde(alias = "idRol", alias = "roleId")]
    pub role_id: Uuid,
}

impl AuthenticatedUser {
    /// Whether this user holds `role`. `None` means no role constraint.
    pub fn has_role(&self, role: Option<Uuid>) -> bool {
        role.is_none_or(|required| self.role_id == required)
    }
}

/// External token-validation collaborator.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, OrderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconstrained_role_always_passes() {
        let user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            role_id: Uuid::new_v4(),
        };
        assert!(user.has_role(None));
    }

    #[test]
    fn role_check_compares_ids() {
        let role = Uuid::new_v4();
        let user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            role_id: role,
        };
        assert!(user.has_role(Some(role)));
        assert!(!user.has_role(Some(Uuid::new_v4())));
    }
}
