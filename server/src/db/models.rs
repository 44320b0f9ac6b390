//! Database Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Person model.
///
/// Local people are accounts on this pod; remote people are discovered via
/// webfinger and carry `local = false`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Person {
    pub id: Uuid,
    /// Unique address, e.g. `alice@example.org`. Always lowercase.
    pub handle: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the person appears in name searches.
    pub searchable: bool,
    /// Whether the person's account lives on this pod.
    pub local: bool,
    /// Profile tags, stored without the leading `#`.
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aspect model: a named grouping of contacts a post can be shared with.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Aspect {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Contact model: directed edge stating `person_id` is in one of
/// `owner_id`'s aspects.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub person_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Post model.
///
/// Scope is one of: public, all of the author's aspects (`all_aspects`), or
/// the specific aspects recorded in `aspect_visibilities`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub public: bool,
    pub all_aspects: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
