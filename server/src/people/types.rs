//! People Endpoint Type Definitions

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::{Person, Post};

/// Error types for people endpoints.
#[derive(Debug, thiserror::Error)]
pub enum PeopleError {
    #[error("Person not found")]
    NotFound,

    #[error("Remote lookup is not enabled on this server")]
    LookupDisabled,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for PeopleError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                "PERSON_NOT_FOUND",
                "Person not found".to_string(),
            ),
            Self::LookupDisabled => (
                StatusCode::NOT_FOUND,
                "LOOKUP_DISABLED",
                "Remote lookup is not enabled on this server".to_string(),
            ),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            Self::Database(err) => {
                tracing::error!(%err, "People endpoint database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Database error".to_string(),
                )
            }
        };
        (
            status,
            Json(serde_json::json!({ "error": code, "message": message })),
        )
            .into_response()
    }
}

/// The viewer's relationship to a profile owner. Decides which posts are
/// visible and whether commenting is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerRelation {
    /// Viewing their own profile.
    Owner,
    /// The owner shares at least one aspect with the viewer.
    Contact,
    /// Authenticated, but not in any of the owner's aspects.
    NonContact,
    /// Not authenticated.
    Anonymous,
}

impl ViewerRelation {
    /// Commenting is open to the owner and their contacts only.
    #[must_use]
    pub const fn commenting_disabled(self) -> bool {
        match self {
            Self::Owner | Self::Contact => false,
            Self::NonContact | Self::Anonymous => true,
        }
    }
}

/// Query parameters for person search.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    /// Search text. A leading `#` redirects to the tag listing.
    pub q: Option<String>,
    /// Number of results per page (1-`SEARCH_MAX_LIMIT`, default 20).
    pub limit: Option<i64>,
    /// Offset for pagination (default 0).
    pub offset: Option<i64>,
}

/// Query parameters for paginated listings.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    /// Number of results per page (1-`SEARCH_MAX_LIMIT`, default 20).
    pub limit: Option<i64>,
    /// Offset for pagination (default 0).
    pub offset: Option<i64>,
}

/// Query parameters for the remote-lookup endpoint.
#[derive(Debug, Deserialize, Validate, utoipa::IntoParams)]
pub struct RemoteLookupQuery {
    /// Handle to resolve, e.g. `eve@remote.example`.
    #[validate(length(min = 3, max = 254))]
    pub handle: String,
}

/// A page of people with the total match count.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PeoplePage {
    pub people: Vec<Person>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl PeoplePage {
    /// An empty page (blank search query shortcut).
    #[must_use]
    pub const fn empty(limit: i64, offset: i64) -> Self {
        Self {
            people: Vec::new(),
            total: 0,
            limit,
            offset,
        }
    }
}

/// Profile view: the person plus the posts this viewer may see.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub person: Person,
    /// Visible posts, newest first.
    pub posts: Vec<Post>,
    pub commenting_disabled: bool,
}

/// Outcome of a remote-lookup request.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RemoteLookupResponse {
    pub handle: String,
    pub status: LookupStatus,
    /// Set when the handle was already known locally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
}

/// Remote-lookup status discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LookupStatus {
    /// Handle already resolved on this pod.
    Known,
    /// Lookup job accepted; resolution happens in the background.
    Enqueued,
}

/// Clamp pagination parameters the way all listing endpoints do.
#[must_use]
pub fn clamp_page(limit: Option<i64>, offset: Option<i64>, max_limit: i64) -> (i64, i64) {
    (
        limit.unwrap_or(20).clamp(1, max_limit),
        offset.unwrap_or(0).clamp(0, 10_000),
    )
}

/// Extract the tag name from a `#tag` search query.
///
/// Returns `None` when the query is not a tag search. All `#` characters
/// are stripped and the remainder lowercased, so `#Foo` and `##foo` both
/// name the tag `foo`.
#[must_use]
pub fn tag_query(q: &str) -> Option<String> {
    let trimmed = q.trim();
    if !trimmed.starts_with('#') {
        return None;
    }
    Some(trimmed.replace('#', "").trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commenting_disabled_by_relation() {
        assert!(!ViewerRelation::Owner.commenting_disabled());
        assert!(!ViewerRelation::Contact.commenting_disabled());
        assert!(ViewerRelation::NonContact.commenting_disabled());
        assert!(ViewerRelation::Anonymous.commenting_disabled());
    }

    #[test]
    fn test_tag_query_detection() {
        assert_eq!(tag_query("#babies"), Some("babies".into()));
        assert_eq!(tag_query("  #Babies "), Some("babies".into()));
        assert_eq!(tag_query("##babies"), Some("babies".into()));
        assert_eq!(tag_query("#"), Some(String::new()));
        assert_eq!(tag_query("babies"), None);
        assert_eq!(tag_query("ba#bies"), None);
    }

    #[test]
    fn test_clamp_page_bounds() {
        assert_eq!(clamp_page(None, None, 50), (20, 0));
        assert_eq!(clamp_page(Some(500), Some(-3), 50), (50, 0));
        assert_eq!(clamp_page(Some(0), Some(1_000_000), 50), (1, 10_000));
    }
}
