//! Identity extractors.
//!
//! Authentication itself lives in the upstream gateway, which verifies the
//! caller and forwards the resolved identity as trusted headers. These
//! extractors turn those headers into typed values and reject requests that
//! arrive without them.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::utils::error::AppError;

pub const PARTICIPANT_ID_HEADER: &str = "x-participant-id";
pub const ORGANIZER_ID_HEADER: &str = "x-organizer-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Authenticated participant (ticket buyer).
#[derive(Debug, Clone, Copy)]
pub struct AuthParticipant {
    pub id: Uuid,
}

/// Role of a CMS user. Owners are platform operators and see every
/// organizer's data; organizers see only their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Organizer,
    Owner,
}

/// Authenticated CMS user (organizer staff or platform owner).
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub organizer_id: Uuid,
    pub role: Role,
}

fn header_uuid(parts: &Parts, name: &str) -> Result<Uuid, AppError> {
    let value = parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::AuthError(format!("missing '{}' header", name)))?;

    value
        .parse()
        .map_err(|_| AppError::AuthError(format!("invalid '{}' header", name)))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthParticipant
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_uuid(parts, PARTICIPANT_ID_HEADER)?;
        Ok(AuthParticipant { id })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let organizer_id = header_uuid(parts, ORGANIZER_ID_HEADER)?;

        let role = match parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            Some("owner") => Role::Owner,
            Some("organizer") | None => Role::Organizer,
            Some(other) => {
                return Err(AppError::AuthError(format!("unknown role '{}'", other)));
            }
        };

        Ok(AuthUser { organizer_id, role })
    }
}
