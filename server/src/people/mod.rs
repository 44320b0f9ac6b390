//! People Endpoints
//!
//! Directory search, tag lookup, profiles with relationship-scoped post
//! visibility, contacts of a contact, and remote handle discovery.

pub mod contacts;
pub mod profile;
pub mod remote;
pub mod search;
pub mod tags;
pub mod types;

use axum::{middleware::from_fn_with_state, routing::get, Router};

use crate::api::AppState;
use crate::auth::{optional_auth, require_auth};

/// Create the people router.
///
/// Everything requires authentication except the profile page, which also
/// serves anonymous viewers. Static segments (`remote`, `tags`) win over
/// the `{id}` capture.
pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", get(search::search))
        .route("/remote", get(remote::retrieve_remote))
        .route("/tags/{name}", get(tags::tag_index))
        .route("/{id}/contacts", get(contacts::contacts_of_contact))
        .layer(from_fn_with_state(state.clone(), require_auth));

    let public = Router::new()
        .route("/{id}", get(profile::show))
        .layer(from_fn_with_state(state, optional_auth));

    protected.merge(public)
}
