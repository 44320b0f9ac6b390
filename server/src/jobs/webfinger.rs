//! Webfinger Resolution
//!
//! Fetches `/.well-known/webfinger` for a remote handle and stores the
//! discovered person as a remote, non-searchable record.

use std::sync::LazyLock;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::Deserialize;
use sqlx::PgPool;

use crate::db::{upsert_remote_person, Person};

/// Handle shape: `user@domain`, lowercase.
static HANDLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9._+-]*@[a-z0-9-]+(\.[a-z0-9-]+)*$").expect("valid handle regex")
});

/// Whether a (lowercased) string is a well-formed handle.
#[must_use]
pub fn is_valid_handle(handle: &str) -> bool {
    handle.len() <= 254 && HANDLE_RE.is_match(handle)
}

/// Webfinger discovery URL for a handle.
///
/// Returns `None` for malformed handles.
#[must_use]
pub fn discovery_url(handle: &str) -> Option<String> {
    if !is_valid_handle(handle) {
        return None;
    }
    let (_, domain) = handle.rsplit_once('@')?;
    Some(format!(
        "https://{domain}/.well-known/webfinger?resource=acct:{handle}"
    ))
}

/// Minimal webfinger document: we only need the subject to confirm the
/// account exists; profile fields arrive later over federation.
#[derive(Debug, Deserialize)]
struct WebfingerDocument {
    subject: String,
}

/// Resolve a handle against its home pod and upsert the person.
pub async fn resolve(
    client: &reqwest::Client,
    pool: &PgPool,
    local_domain: &str,
    handle: &str,
) -> Result<Person> {
    let handle = handle.to_lowercase();

    if handle
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.eq_ignore_ascii_case(local_domain))
    {
        return Err(anyhow!("refusing webfinger lookup for local handle {handle}"));
    }

    let url = discovery_url(&handle).ok_or_else(|| anyhow!("malformed handle {handle}"))?;

    let document: WebfingerDocument = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("webfinger request to {url} failed"))?
        .error_for_status()
        .context("webfinger endpoint returned an error status")?
        .json()
        .await
        .context("webfinger response was not valid JSON")?;

    let subject = document
        .subject
        .strip_prefix("acct:")
        .unwrap_or(&document.subject)
        .to_lowercase();
    if subject != handle {
        return Err(anyhow!(
            "webfinger subject {subject} does not match requested handle {handle}"
        ));
    }

    // Seed the display name from the local part until a profile arrives.
    let local_part = handle.split('@').next().unwrap_or(&handle);
    let person = upsert_remote_person(pool, &handle, local_part, "").await?;

    Ok(person)
}
