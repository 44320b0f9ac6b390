//! Remote Lookup Handler
//!
//! Accepts a handle and schedules asynchronous webfinger discovery. The
//! request returns as soon as the job is enqueued; resolution happens in
//! the background with no completion guarantee observed by the caller.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use validator::Validate;

use super::types::{LookupStatus, PeopleError, RemoteLookupQuery, RemoteLookupResponse};
use crate::api::AppState;
use crate::auth::AuthPerson;
use crate::db;
use crate::jobs::webfinger;

/// Resolve a handle, scheduling remote discovery when needed.
/// GET `/api/people/remote?handle=...`
#[utoipa::path(
    get,
    path = "/api/people/remote",
    tag = "people",
    params(RemoteLookupQuery),
    responses(
        (status = 200, description = "Handle already known", body = RemoteLookupResponse),
        (status = 202, description = "Lookup enqueued", body = RemoteLookupResponse),
        (status = 400, description = "Malformed handle"),
        (status = 404, description = "Remote lookup disabled, or unknown local handle"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, viewer))]
pub async fn retrieve_remote(
    State(state): State<AppState>,
    viewer: AuthPerson,
    Query(query): Query<RemoteLookupQuery>,
) -> Result<Response, PeopleError> {
    if !state.config.enable_remote_lookup {
        return Err(PeopleError::LookupDisabled);
    }

    query
        .validate()
        .map_err(|e| PeopleError::Validation(e.to_string()))?;

    let handle = query.handle.trim().to_lowercase();
    if !webfinger::is_valid_handle(&handle) {
        return Err(PeopleError::Validation(format!(
            "Malformed handle: {}",
            query.handle
        )));
    }

    if let Some(person) = db::find_person_by_handle(&state.db, &handle).await? {
        return Ok(Json(RemoteLookupResponse {
            handle,
            status: LookupStatus::Known,
            person: Some(person),
        })
        .into_response());
    }

    // Local handles live here or nowhere; there is no pod to ask.
    if state.config.is_local_handle(&handle) {
        return Err(PeopleError::NotFound);
    }

    state.jobs.enqueue_webfinger(&handle, viewer.id);

    Ok((
        StatusCode::ACCEPTED,
        Json(RemoteLookupResponse {
            handle,
            status: LookupStatus::Enqueued,
            person: None,
        }),
    )
        .into_response())
}
