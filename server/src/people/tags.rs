//! Tag Listing Handler

use std::sync::LazyLock;

use axum::extract::{Path, Query, State};
use axum::Json;
use regex::Regex;

use super::types::{clamp_page, PageQuery, PeopleError, PeoplePage};
use crate::api::AppState;
use crate::auth::AuthPerson;
use crate::db;

/// Tag names: lowercase alphanumerics, underscore, hyphen.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]{1,32}$").expect("valid tag regex"));

/// Whether a (lowercased) string is a well-formed tag name.
#[must_use]
pub fn is_valid_tag(tag: &str) -> bool {
    TAG_RE.is_match(tag)
}

/// List searchable people carrying a profile tag.
/// GET `/api/people/tags/{name}`
#[utoipa::path(
    get,
    path = "/api/people/tags/{name}",
    tag = "people",
    params(
        ("name" = String, Path, description = "Tag name, case-insensitive"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "People carrying the tag", body = PeoplePage),
        (status = 400, description = "Malformed tag name"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, _viewer))]
pub async fn tag_index(
    State(state): State<AppState>,
    _viewer: AuthPerson,
    Path(name): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PeoplePage>, PeopleError> {
    let tag = name.trim().to_lowercase();
    if !is_valid_tag(&tag) {
        return Err(PeopleError::Validation(format!("Malformed tag name: {name}")));
    }

    let (limit, offset) = clamp_page(query.limit, query.offset, state.config.search_max_limit);
    let (people, total) = db::people_by_tag(&state.db, &tag, limit, offset).await?;

    Ok(Json(PeoplePage {
        people,
        total,
        limit,
        offset,
    }))
}

#[cfg(test)]
mod tests {
    use super::is_valid_tag;

    #[test]
    fn test_tag_shape() {
        assert!(is_valid_tag("babies"));
        assert!(is_valid_tag("rust_lang"));
        assert!(is_valid_tag("a-1"));

        assert!(!is_valid_tag(""));
        assert!(!is_valid_tag("Babies")); // callers lowercase first
        assert!(!is_valid_tag("espa ce"));
        assert!(!is_valid_tag(&"x".repeat(33)));
    }
}
