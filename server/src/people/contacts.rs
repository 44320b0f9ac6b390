//! Contacts-of-Contact Handler

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use super::types::{clamp_page, PageQuery, PeopleError, PeoplePage};
use crate::api::AppState;
use crate::auth::AuthPerson;
use crate::db;

/// List the contacts of a person ("contacts of contact").
/// GET `/api/people/{id}/contacts`
#[utoipa::path(
    get,
    path = "/api/people/{id}/contacts",
    tag = "people",
    params(
        ("id" = Uuid, Path, description = "Person ID"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "The person's contacts", body = PeoplePage),
        (status = 404, description = "Person not found"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, _viewer))]
pub async fn contacts_of_contact(
    State(state): State<AppState>,
    _viewer: AuthPerson,
    Path(person_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PeoplePage>, PeopleError> {
    db::find_person_by_id(&state.db, person_id)
        .await?
        .ok_or(PeopleError::NotFound)?;

    let (limit, offset) = clamp_page(query.limit, query.offset, state.config.search_max_limit);
    let (people, total) = db::contacts_of_person(&state.db, person_id, limit, offset).await?;

    Ok(Json(PeoplePage {
        people,
        total,
        limit,
        offset,
    }))
}
