//! Profile Handler
//!
//! Renders a person's profile with the posts the viewer is allowed to see.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use uuid::Uuid;

use super::types::{PeopleError, ProfileResponse, ViewerRelation};
use crate::api::AppState;
use crate::auth::MaybeAuthPerson;
use crate::db::{self, Person, Post};

/// Show a person's profile.
/// GET `/api/people/{id}`
///
/// Serves anonymous viewers. An unparseable or unknown id redirects to the
/// people listing rather than failing; a remote person's profile is
/// not-found for anonymous viewers.
#[utoipa::path(
    get,
    path = "/api/people/{id}",
    tag = "people",
    params(("id" = String, Path, description = "Person ID")),
    responses(
        (status = 200, description = "Profile with visible posts", body = ProfileResponse),
        (status = 303, description = "Invalid or unknown id, see the people listing"),
        (status = 404, description = "Remote person requested anonymously"),
    ),
)]
#[tracing::instrument(skip(state, viewer))]
pub async fn show(
    State(state): State<AppState>,
    MaybeAuthPerson(viewer): MaybeAuthPerson,
    Path(id): Path<String>,
) -> Result<Response, PeopleError> {
    // Invalid ids bounce back to the listing, matching unknown ids below.
    let Ok(person_id) = id.parse::<Uuid>() else {
        return Ok(Redirect::to("/api/people").into_response());
    };

    let Some(person) = db::find_person_by_id(&state.db, person_id).await? else {
        return Ok(Redirect::to("/api/people").into_response());
    };

    // Remote profiles are only served to signed-in people; their canonical
    // page lives on their home pod.
    if !person.local && viewer.is_none() {
        return Err(PeopleError::NotFound);
    }

    let relation = resolve_relation(&state, &person, viewer.as_ref().map(|v| v.id)).await?;
    let posts = visible_posts(&state, &person, relation, viewer.as_ref().map(|v| v.id)).await?;

    Ok(Json(ProfileResponse {
        person,
        posts,
        commenting_disabled: relation.commenting_disabled(),
    })
    .into_response())
}

/// Work out how the viewer relates to the profile owner.
async fn resolve_relation(
    state: &AppState,
    person: &Person,
    viewer_id: Option<Uuid>,
) -> Result<ViewerRelation, PeopleError> {
    let Some(viewer_id) = viewer_id else {
        return Ok(ViewerRelation::Anonymous);
    };
    if viewer_id == person.id {
        return Ok(ViewerRelation::Owner);
    }
    if db::is_contact(&state.db, person.id, viewer_id).await? {
        return Ok(ViewerRelation::Contact);
    }
    Ok(ViewerRelation::NonContact)
}

/// Posts visible to the viewer, newest first.
async fn visible_posts(
    state: &AppState,
    person: &Person,
    relation: ViewerRelation,
    viewer_id: Option<Uuid>,
) -> Result<Vec<Post>, PeopleError> {
    let posts = match relation {
        ViewerRelation::Owner => db::all_posts_by_author(&state.db, person.id).await?,
        ViewerRelation::Contact => {
            // resolve_relation only returns Contact for an authenticated viewer
            let viewer_id = viewer_id.ok_or(PeopleError::NotFound)?;
            db::posts_visible_to_contact(&state.db, person.id, viewer_id).await?
        }
        ViewerRelation::NonContact | ViewerRelation::Anonymous => {
            db::public_posts_by_author(&state.db, person.id).await?
        }
    };
    Ok(posts)
}
