//! Database Queries
//!
//! Runtime queries (no compile-time `DATABASE_URL` required).
//!
//! All query functions include error context logging to aid debugging.

use sqlx::{FromRow, PgPool, Row};
use tracing::error;
use uuid::Uuid;

use super::models::{Aspect, Contact, Person, Post};

/// Log and return a database error with context.
///
/// This helper ensures all database errors are logged with relevant context
/// before being propagated, making production debugging easier.
macro_rules! db_error {
    ($query:expr, $($field:tt)*) => {
        |e| {
            error!(query = $query, $($field)*, error = %e, "Database query failed");
            e
        }
    };
}

/// Fields for inserting a new person.
#[derive(Debug, Clone)]
pub struct NewPerson<'a> {
    pub handle: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub searchable: bool,
    pub local: bool,
    pub tags: &'a [String],
}

/// Escape LIKE wildcards in user-supplied search input.
#[must_use]
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// ============================================================================
// Person Queries
// ============================================================================

/// Find person by ID.
pub async fn find_person_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Person>> {
    sqlx::query_as::<_, Person>("SELECT * FROM people WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_person_by_id", person_id = %id))
}

/// Find person by handle (handles are stored lowercase).
pub async fn find_person_by_handle(pool: &PgPool, handle: &str) -> sqlx::Result<Option<Person>> {
    sqlx::query_as::<_, Person>("SELECT * FROM people WHERE handle = $1")
        .bind(handle.to_lowercase())
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_person_by_handle", handle = %handle))
}

/// Insert a new person.
pub async fn create_person(pool: &PgPool, new: &NewPerson<'_>) -> sqlx::Result<Person> {
    sqlx::query_as::<_, Person>(
        r"INSERT INTO people (id, handle, first_name, last_name, searchable, local, tags)
           VALUES ($1, $2, $3, $4, $5, $6, $7)
           RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(new.handle.to_lowercase())
    .bind(new.first_name)
    .bind(new.last_name)
    .bind(new.searchable)
    .bind(new.local)
    .bind(new.tags)
    .fetch_one(pool)
    .await
    .map_err(db_error!("create_person", handle = %new.handle))
}

/// Insert or refresh a remote person discovered via webfinger.
///
/// Remote people are never name-searchable; they can still be found by
/// exact handle.
pub async fn upsert_remote_person(
    pool: &PgPool,
    handle: &str,
    first_name: &str,
    last_name: &str,
) -> sqlx::Result<Person> {
    sqlx::query_as::<_, Person>(
        r"INSERT INTO people (id, handle, first_name, last_name, searchable, local)
           VALUES ($1, $2, $3, $4, false, false)
           ON CONFLICT (handle) DO UPDATE
           SET first_name = EXCLUDED.first_name,
               last_name = EXCLUDED.last_name,
               updated_at = NOW()
           RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(handle.to_lowercase())
    .bind(first_name)
    .bind(last_name)
    .fetch_one(pool)
    .await
    .map_err(db_error!("upsert_remote_person", handle = %handle))
}

/// Search people by name prefix, plus exact handle match.
///
/// Name matching is restricted to `searchable` people; the exact-handle
/// clause deliberately ignores the searchable flag so that unsearchable
/// people can still be found by their full address.
///
/// Returns the page of matches and the total match count.
pub async fn search_people(
    pool: &PgPool,
    query: &str,
    limit: i64,
    offset: i64,
) -> sqlx::Result<(Vec<Person>, i64)> {
    let pattern = format!("{}%", escape_like(&query.to_lowercase()));
    let handle = query.to_lowercase();

    let rows = sqlx::query(
        r"SELECT p.*, COUNT(*) OVER() AS total
           FROM people p
           WHERE (p.searchable AND (lower(p.first_name) LIKE $1
                                    OR lower(p.last_name) LIKE $1
                                    OR lower(p.first_name || ' ' || p.last_name) LIKE $1))
              OR p.handle = $2
           ORDER BY p.last_name ASC, p.first_name ASC, p.handle ASC
           LIMIT $3 OFFSET $4",
    )
    .bind(&pattern)
    .bind(&handle)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(db_error!("search_people", query = %query))?;

    collect_people_page(rows)
}

/// List searchable people carrying the given profile tag.
pub async fn people_by_tag(
    pool: &PgPool,
    tag: &str,
    limit: i64,
    offset: i64,
) -> sqlx::Result<(Vec<Person>, i64)> {
    let rows = sqlx::query(
        r"SELECT p.*, COUNT(*) OVER() AS total
           FROM people p
           WHERE p.searchable AND $1 = ANY(p.tags)
           ORDER BY p.handle ASC
           LIMIT $2 OFFSET $3",
    )
    .bind(tag)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(db_error!("people_by_tag", tag = %tag))?;

    collect_people_page(rows)
}

/// List the people a person has placed in their aspects
/// ("contacts of contact").
pub async fn contacts_of_person(
    pool: &PgPool,
    person_id: Uuid,
    limit: i64,
    offset: i64,
) -> sqlx::Result<(Vec<Person>, i64)> {
    let rows = sqlx::query(
        r"SELECT p.*, COUNT(*) OVER() AS total
           FROM contacts c
           JOIN people p ON p.id = c.person_id
           WHERE c.owner_id = $1
           ORDER BY p.handle ASC
           LIMIT $2 OFFSET $3",
    )
    .bind(person_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(db_error!("contacts_of_person", person_id = %person_id))?;

    collect_people_page(rows)
}

/// Whether `owner` has placed `person` in one of their aspects.
pub async fn is_contact(pool: &PgPool, owner_id: Uuid, person_id: Uuid) -> sqlx::Result<bool> {
    let exists: Option<i32> = sqlx::query_scalar(
        "SELECT 1 FROM contacts WHERE owner_id = $1 AND person_id = $2",
    )
    .bind(owner_id)
    .bind(person_id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("is_contact", owner_id = %owner_id, person_id = %person_id))?;

    Ok(exists.is_some())
}

/// Decode a page of people rows carrying a `COUNT(*) OVER()` total.
fn collect_people_page(rows: Vec<sqlx::postgres::PgRow>) -> sqlx::Result<(Vec<Person>, i64)> {
    let total = rows.first().map_or(Ok(0), |r| r.try_get("total"))?;
    let people = rows
        .iter()
        .map(Person::from_row)
        .collect::<sqlx::Result<Vec<_>>>()?;
    Ok((people, total))
}

// ============================================================================
// Post Queries
// ============================================================================

/// All posts by an author, newest first. Owner's view of their own profile.
pub async fn all_posts_by_author(pool: &PgPool, author_id: Uuid) -> sqlx::Result<Vec<Post>> {
    sqlx::query_as::<_, Post>(
        "SELECT * FROM posts WHERE author_id = $1 ORDER BY created_at DESC",
    )
    .bind(author_id)
    .fetch_all(pool)
    .await
    .map_err(db_error!("all_posts_by_author", author_id = %author_id))
}

/// Public posts by an author, newest first. Anonymous/non-contact view.
pub async fn public_posts_by_author(pool: &PgPool, author_id: Uuid) -> sqlx::Result<Vec<Post>> {
    sqlx::query_as::<_, Post>(
        "SELECT * FROM posts WHERE author_id = $1 AND public ORDER BY created_at DESC",
    )
    .bind(author_id)
    .fetch_all(pool)
    .await
    .map_err(db_error!("public_posts_by_author", author_id = %author_id))
}

/// Posts by an author visible to one of their contacts, newest first.
///
/// A contact sees public posts, posts shared with all of the author's
/// aspects, and posts scoped to an aspect the contact belongs to.
pub async fn posts_visible_to_contact(
    pool: &PgPool,
    author_id: Uuid,
    viewer_id: Uuid,
) -> sqlx::Result<Vec<Post>> {
    sqlx::query_as::<_, Post>(
        r"SELECT * FROM posts p
           WHERE p.author_id = $1
             AND (p.public
                  OR p.all_aspects
                  OR EXISTS (
                      SELECT 1 FROM aspect_visibilities av
                      JOIN aspect_memberships am ON am.aspect_id = av.aspect_id
                      JOIN contacts c ON c.id = am.contact_id
                      WHERE av.post_id = p.id
                        AND c.owner_id = $1
                        AND c.person_id = $2))
           ORDER BY p.created_at DESC",
    )
    .bind(author_id)
    .bind(viewer_id)
    .fetch_all(pool)
    .await
    .map_err(db_error!(
        "posts_visible_to_contact",
        author_id = %author_id,
        viewer_id = %viewer_id
    ))
}

// ============================================================================
// Write Helpers (aspects, contacts, posts)
// ============================================================================

/// Create an aspect owned by a person.
pub async fn create_aspect(pool: &PgPool, owner_id: Uuid, name: &str) -> sqlx::Result<Aspect> {
    sqlx::query_as::<_, Aspect>(
        r"INSERT INTO aspects (id, owner_id, name)
           VALUES ($1, $2, $3)
           RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(owner_id)
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(db_error!("create_aspect", owner_id = %owner_id, name = %name))
}

/// Add `person_id` to one of `owner_id`'s aspects, creating the contact
/// edge if it does not exist yet.
pub async fn add_contact(
    pool: &PgPool,
    owner_id: Uuid,
    person_id: Uuid,
    aspect_id: Uuid,
) -> sqlx::Result<Contact> {
    let contact = sqlx::query_as::<_, Contact>(
        r"INSERT INTO contacts (id, owner_id, person_id)
           VALUES ($1, $2, $3)
           ON CONFLICT (owner_id, person_id) DO UPDATE SET owner_id = EXCLUDED.owner_id
           RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(owner_id)
    .bind(person_id)
    .fetch_one(pool)
    .await
    .map_err(db_error!("add_contact", owner_id = %owner_id, person_id = %person_id))?;

    sqlx::query(
        r"INSERT INTO aspect_memberships (aspect_id, contact_id)
           VALUES ($1, $2)
           ON CONFLICT DO NOTHING",
    )
    .bind(aspect_id)
    .bind(contact.id)
    .execute(pool)
    .await
    .map_err(db_error!("add_contact_membership", aspect_id = %aspect_id))?;

    Ok(contact)
}

/// Create a post, optionally scoped to specific aspects.
pub async fn create_post(
    pool: &PgPool,
    author_id: Uuid,
    body: &str,
    public: bool,
    all_aspects: bool,
    aspect_ids: &[Uuid],
) -> sqlx::Result<Post> {
    let mut tx = pool.begin().await?;

    let post = sqlx::query_as::<_, Post>(
        r"INSERT INTO posts (id, author_id, body, public, all_aspects)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(author_id)
    .bind(body)
    .bind(public)
    .bind(all_aspects)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_error!("create_post", author_id = %author_id))?;

    for aspect_id in aspect_ids {
        sqlx::query("INSERT INTO aspect_visibilities (post_id, aspect_id) VALUES ($1, $2)")
            .bind(post.id)
            .bind(aspect_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error!("create_post_visibility", post_id = %post.id))?;
    }

    tx.commit().await?;
    Ok(post)
}

#[cfg(test)]
mod unit_tests {
    use super::escape_like;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("eug"), "eug");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
