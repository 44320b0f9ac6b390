//! Authentication Middleware

use axum::{
    extract::{FromRequestParts, Request, State},
    http::header::AUTHORIZATION,
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::db::{find_person_by_id, Person};

use super::error::AuthError;
use super::jwt::validate_access_token;

/// Authenticated viewer injected into request extensions.
///
/// This is a minimal struct containing only safe-to-expose person data.
/// Use this in handlers to access the current viewer.
#[derive(Debug, Clone)]
pub struct AuthPerson {
    /// Person ID.
    pub id: Uuid,
    /// Handle.
    pub handle: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
}

impl From<Person> for AuthPerson {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            handle: person.handle,
            first_name: person.first_name,
            last_name: person.last_name,
        }
    }
}

/// Optional viewer for endpoints that serve anonymous requests.
///
/// `MaybeAuthPerson(None)` means the request carried no Authorization
/// header; an invalid token is still rejected by [`optional_auth`].
#[derive(Debug, Clone)]
pub struct MaybeAuthPerson(pub Option<AuthPerson>);

/// Validate a bearer token and load the person it names.
async fn resolve_bearer(state: &AppState, auth_header: &str) -> Result<AuthPerson, AuthError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    let claims = validate_access_token(token, &state.config.jwt_secret)?;

    let person_id: Uuid = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;

    let person = find_person_by_id(&state.db, person_id)
        .await?
        .ok_or(AuthError::PersonNotFound)?;

    Ok(AuthPerson::from(person))
}

/// Middleware to require authentication.
///
/// Extracts the Bearer token from the Authorization header, validates the
/// JWT, loads the person from the database, and injects [`AuthPerson`] into
/// request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?
        .to_owned();

    let viewer = resolve_bearer(&state, &auth_header).await?;
    request.extensions_mut().insert(viewer);

    Ok(next.run(request).await)
}

/// Middleware for endpoints that also serve anonymous viewers.
///
/// No Authorization header passes through as anonymous; a present but
/// invalid token is rejected rather than silently downgraded.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    let viewer = match auth_header {
        Some(header) => Some(resolve_bearer(&state, &header).await?),
        None => None,
    };
    request.extensions_mut().insert(MaybeAuthPerson(viewer));

    Ok(next.run(request).await)
}

/// Extractor for the authenticated viewer in protected handlers.
impl<S> FromRequestParts<S> for AuthPerson
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

/// Extractor for the optional viewer on [`optional_auth`] routes.
impl<S> FromRequestParts<S> for MaybeAuthPerson
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Self>()
            .cloned()
            .unwrap_or(Self(None)))
    }
}
