//! Actor identity interface.
//!
//! Authentication lives in the gateway in front of this service; by the time
//! a request reaches a handler the gateway has verified the caller and
//! stamped `x-user-id` / `x-user-role` headers. This module only extracts
//! that identity so services can record `created_by` on the rows they write.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Role hierarchy, ordered by rank. Comparisons use the numeric rank so
/// `Role::Admin >= Role::Manager` reads the way authorization checks expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    Staff,
}

impl Role {
    pub fn rank(&self) -> u8 {
        match self {
            Role::SuperAdmin => 4,
            Role::Admin => 3,
            Role::Manager => 2,
            Role::Staff => 1,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "super_admin" => Some(Role::SuperAdmin),
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }

    pub fn at_least(&self, required: Role) -> bool {
        self.rank() >= required.rank()
    }
}

/// The authenticated caller, as asserted by the upstream gateway.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or_else(|| ServiceError::Unauthorized("missing or invalid x-user-id".into()))?;

        let role = parts
            .headers
            .get("x-user-role")
            .and_then(|v| v.to_str().ok())
            .and_then(Role::parse)
            .ok_or_else(|| ServiceError::Unauthorized("missing or invalid x-user-role".into()))?;

        Ok(AuthUser { id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ranking() {
        assert!(Role::SuperAdmin.at_least(Role::Admin));
        assert!(Role::Admin.at_least(Role::Admin));
        assert!(!Role::Staff.at_least(Role::Manager));
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in [Role::SuperAdmin, Role::Admin, Role::Manager, Role::Staff] {
            assert_eq!(Role::parse(&role.to_string()), Some(role));
        }
        assert_eq!(Role::parse("intern"), None);
    }
}
