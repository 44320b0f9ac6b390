//! Person Search Handler

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;

use super::tags::is_valid_tag;
use super::types::{clamp_page, tag_query, PeopleError, PeoplePage, SearchQuery};
use crate::api::AppState;
use crate::auth::AuthPerson;
use crate::db;

/// Search people by name or exact handle.
/// GET `/api/people?q=...`
///
/// A query starting with `#` is a tag search and redirects to the tag
/// listing. A blank query returns an empty page without touching the
/// database. Single matches are returned in the list like any other
/// result, never as a redirect.
#[utoipa::path(
    get,
    path = "/api/people",
    tag = "people",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching people", body = PeoplePage),
        (status = 303, description = "Tag search, see the tag listing"),
        (status = 400, description = "Malformed query"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, _viewer))]
pub async fn search(
    State(state): State<AppState>,
    _viewer: AuthPerson,
    Query(query): Query<SearchQuery>,
) -> Result<Response, PeopleError> {
    let q = query.q.unwrap_or_default();
    let q = q.trim();

    if q.len() > 200 {
        return Err(PeopleError::Validation(
            "Search query too long (max 200 characters)".to_string(),
        ));
    }

    // `#tag` queries are tag searches, not person searches.
    if let Some(tag) = tag_query(q) {
        if !is_valid_tag(&tag) {
            return Err(PeopleError::Validation(
                "Malformed tag in search query".to_string(),
            ));
        }
        return Ok(Redirect::to(&format!("/api/people/tags/{tag}")).into_response());
    }

    let (limit, offset) = clamp_page(query.limit, query.offset, state.config.search_max_limit);

    if q.is_empty() {
        return Ok(Json(PeoplePage::empty(limit, offset)).into_response());
    }

    let (people, total) = db::search_people(&state.db, q, limit, offset).await?;

    Ok(Json(PeoplePage {
        people,
        total,
        limit,
        offset,
    })
    .into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    use super::*;
    use crate::config::Config;
    use crate::jobs::Dispatcher;

    /// State over a lazy pool. Handler paths that complete without a
    /// connection prove they never issued a query.
    fn offline_state() -> AppState {
        let config = Config::default_for_test();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("Failed to build lazy pool");
        let (jobs, _) = Dispatcher::new();
        AppState::new(pool, config, jobs)
    }

    fn viewer() -> AuthPerson {
        AuthPerson {
            id: Uuid::now_v7(),
            handle: "alice@example.org".into(),
            first_name: "Alice".into(),
            last_name: "Aster".into(),
        }
    }

    async fn run_search(q: Option<&str>) -> Result<Response, PeopleError> {
        search(
            State(offline_state()),
            viewer(),
            Query(SearchQuery {
                q: q.map(str::to_string),
                limit: None,
                offset: None,
            }),
        )
        .await
    }

    #[tokio::test]
    async fn test_blank_query_returns_empty_page_without_database() {
        for q in [None, Some(""), Some("   ")] {
            let response = run_search(q)
                .await
                .expect("Blank query must succeed with no database");
            assert_eq!(response.status(), StatusCode::OK);

            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["total"], 0);
            assert!(body["people"].as_array().unwrap().is_empty());
            assert_eq!(body["limit"], 20);
        }
    }

    #[tokio::test]
    async fn test_overlong_query_is_rejected() {
        let q = "a".repeat(201);
        let err = run_search(Some(&q))
            .await
            .expect_err("201 characters exceeds the cap");
        assert!(matches!(err, PeopleError::Validation(_)));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_query_at_cap_passes_length_check() {
        // 200 characters is within the cap, so the handler proceeds to
        // the search query itself.
        let q = "a".repeat(200);
        let result = run_search(Some(&q)).await;
        assert!(!matches!(result, Err(PeopleError::Validation(_))));
    }
}
