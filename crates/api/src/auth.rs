//! Header-based caller identity
//!
//! The platform's identity layer sits in front of this service; by the time
//! a request arrives, authentication has happened upstream and the caller's
//! id and role travel in `X-User-Id` and `X-Role` headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bookslot_domain::BookslotError;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl Role {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "student" => Some(Role::Student),
            "instructor" => Some(Role::Instructor),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    /// Instructors may only manage their own resources; admins manage any.
    pub fn can_manage_instructor(&self, instructor_id: Uuid) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Instructor => self.user_id == instructor_id,
            Role::Student => false,
        }
    }

    pub fn require_instructor_access(&self, instructor_id: Uuid) -> Result<(), ApiError> {
        if self.can_manage_instructor(instructor_id) {
            return Ok(());
        }
        Err(ApiError(BookslotError::Authorization(
            "instructor or admin role required".to_string(),
        )))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    ApiError(BookslotError::Authorization(format!("missing {name} header")))
                })
        };

        let user_id: Uuid = header("x-user-id")?.parse().map_err(|_| {
            ApiError(BookslotError::Authorization("malformed x-user-id header".to_string()))
        })?;
        let role = Role::parse(header("x-role")?).ok_or_else(|| {
            ApiError(BookslotError::Authorization("unknown role".to_string()))
        })?;

        Ok(Caller { user_id, role })
    }
}
