//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for sending requests through the full axum router via
//! `tower::ServiceExt::oneshot`, plus utilities for person creation and JWT
//! minting.
//!
//! `TestApp::without_db()` builds the router over a lazy pool that never
//! connects; use it for routes that must resolve before any query runs
//! (redirects, auth rejections). DB-backed flows use `TestApp::with_db()`
//! against the Docker test container described in `Config::default_for_test`.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use arbor_server::api::{create_router, AppState};
use arbor_server::auth::jwt;
use arbor_server::config::Config;
use arbor_server::db::{self, NewPerson, Person};
use arbor_server::jobs::{Dispatcher, Job};

/// A router instance wired to test state.
pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub config: Config,
    /// Receiver side of the job channel; inspect it to assert on enqueues.
    pub jobs_rx: mpsc::UnboundedReceiver<Job>,
}

impl TestApp {
    /// Build the app over a lazy pool that never connects.
    pub fn without_db() -> Self {
        let config = Config::default_for_test();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("Failed to build lazy pool");
        Self::from_parts(pool, config)
    }

    /// Build the app against the test database and run migrations.
    pub async fn with_db() -> Self {
        let config = Config::default_for_test();
        let pool = db::create_pool(&config.database_url)
            .await
            .expect("Failed to connect to test DB");
        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        Self::from_parts(pool, config)
    }

    fn from_parts(pool: PgPool, config: Config) -> Self {
        let (jobs, jobs_rx) = Dispatcher::new();
        let state = AppState::new(pool.clone(), config.clone(), jobs);
        Self {
            router: create_router(state),
            pool,
            config,
            jobs_rx,
        }
    }

    /// Send a GET request, optionally authenticated.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty()).expect("Failed to build request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed")
    }

    /// Mint an access token for a person.
    pub fn token_for(&self, person_id: Uuid) -> String {
        jwt::issue_access_token(person_id, &self.config.jwt_secret, self.config.jwt_access_expiry)
            .expect("Failed to issue token")
    }
}

/// Decode a response body as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body was not valid JSON")
}

/// Assert a redirect response and return its Location header.
pub fn assert_redirect(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .expect("Redirect without Location header")
        .to_str()
        .expect("Location was not valid UTF-8")
        .to_string()
}

/// Create a local person with a unique handle suffix.
pub async fn create_test_person(
    pool: &PgPool,
    first_name: &str,
    last_name: &str,
    searchable: bool,
) -> Person {
    let suffix = &Uuid::now_v7().to_string()[..8];
    let handle = format!("{}_{suffix}@example.org", first_name.to_lowercase());
    db::create_person(
        pool,
        &NewPerson {
            handle: &handle,
            first_name,
            last_name,
            searchable,
            local: true,
            tags: &[],
        },
    )
    .await
    .expect("Failed to create person")
}

/// Create a remote (non-local, unsearchable) person.
pub async fn create_remote_person(pool: &PgPool, handle: &str) -> Person {
    db::create_person(
        pool,
        &NewPerson {
            handle,
            first_name: "Remote",
            last_name: "Person",
            searchable: false,
            local: false,
            tags: &[],
        },
    )
    .await
    .expect("Failed to create remote person")
}

/// Delete a person (cascades aspects, contacts, posts).
pub async fn delete_person(pool: &PgPool, person_id: Uuid) {
    sqlx::query("DELETE FROM people WHERE id = $1")
        .bind(person_id)
        .execute(pool)
        .await
        .expect("Failed to delete person");
}
