/*
 * Responsibility
 * - notes CRUD + scope (owner / published) 付きの検索・件数取得
 * - owner_id は accounts.id への FK (CASCADE) 前提
 * - 一覧は body を含まない射影 (NoteSummaryRow) を返す
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct NoteRow {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub body: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List projection: everything but the body.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct NoteSummaryRow {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&NoteRow> for NoteSummaryRow {
    fn from(row: &NoteRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title.clone(),
            published: row.published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub owner_id: i64,
    pub title: String,
    pub body: String,
    pub published: bool,
}

/// Row filter applied to lookups, listing and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteScope {
    Any,
    OwnedBy(i64),
    Published,
}

impl NoteScope {
    pub fn matches(&self, owner_id: i64, published: bool) -> bool {
        match self {
            NoteScope::Any => true,
            NoteScope::OwnedBy(user_id) => owner_id == *user_id,
            NoteScope::Published => published,
        }
    }

    // ($owner, $published_only) for the shared WHERE clause below
    fn sql_params(&self) -> (Option<i64>, bool) {
        match self {
            NoteScope::Any => (None, false),
            NoteScope::OwnedBy(user_id) => (Some(*user_id), false),
            NoteScope::Published => (None, true),
        }
    }
}

#[async_trait]
pub trait NoteRepo: Send + Sync {
    async fn insert(&self, note: NewNote) -> RepoResult<NoteRow>;

    async fn find(&self, id: i64, scope: NoteScope) -> RepoResult<Option<NoteRow>>;

    /// Persists title/body/published of `note` and bumps `updated_at`.
    /// Returns `None` when the row disappeared in the meantime.
    async fn update(&self, note: &NoteRow) -> RepoResult<Option<NoteRow>>;

    async fn delete(&self, id: i64, scope: NoteScope) -> RepoResult<bool>;

    /// Most recently updated first.
    async fn list(&self, scope: NoteScope, limit: i64, offset: i64)
    -> RepoResult<Vec<NoteSummaryRow>>;

    async fn count(&self, scope: NoteScope) -> RepoResult<i64>;
}

#[derive(Clone, Debug)]
pub struct PgNoteRepo {
    db: PgPool,
}

impl PgNoteRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NoteRepo for PgNoteRepo {
    async fn insert(&self, note: NewNote) -> RepoResult<NoteRow> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            INSERT INTO notes (owner_id, title, body, published)
            VALUES ($1, $2, $3, $4)
            RETURNING
                id, owner_id, title, body, published, created_at, updated_at
            "#,
        )
        .bind(note.owner_id)
        .bind(&note.title)
        .bind(&note.body)
        .bind(note.published)
        .fetch_one(&self.db)
        .await?;

        Ok(row)
    }

    async fn find(&self, id: i64, scope: NoteScope) -> RepoResult<Option<NoteRow>> {
        let (owner, published_only) = scope.sql_params();

        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT
                id, owner_id, title, body, published, created_at, updated_at
            FROM notes
            WHERE id = $1
              AND ($2::BIGINT IS NULL OR owner_id = $2)
              AND ($3 = false OR published)
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(published_only)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn update(&self, note: &NoteRow) -> RepoResult<Option<NoteRow>> {
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            UPDATE notes
            SET
                title = $3,
                body = $4,
                published = $5,
                updated_at = now()
            WHERE id = $1 AND owner_id = $2
            RETURNING
                id, owner_id, title, body, published, created_at, updated_at
            "#,
        )
        .bind(note.id)
        .bind(note.owner_id)
        .bind(&note.title)
        .bind(&note.body)
        .bind(note.published)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn delete(&self, id: i64, scope: NoteScope) -> RepoResult<bool> {
        let (owner, published_only) = scope.sql_params();

        let result = sqlx::query(
            r#"
            DELETE FROM notes
            WHERE id = $1
              AND ($2::BIGINT IS NULL OR owner_id = $2)
              AND ($3 = false OR published)
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(published_only)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(
        &self,
        scope: NoteScope,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<NoteSummaryRow>> {
        let (owner, published_only) = scope.sql_params();

        let rows = sqlx::query_as::<_, NoteSummaryRow>(
            r#"
            SELECT
                id, owner_id, title, published, created_at, updated_at
            FROM notes
            WHERE ($1::BIGINT IS NULL OR owner_id = $1)
              AND ($2 = false OR published)
            ORDER BY updated_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(owner)
        .bind(published_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn count(&self, scope: NoteScope) -> RepoResult<i64> {
        let (owner, published_only) = scope.sql_params();

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM notes
            WHERE ($1::BIGINT IS NULL OR owner_id = $1)
              AND ($2 = false OR published)
            "#,
        )
        .bind(owner)
        .bind(published_only)
        .fetch_one(&self.db)
        .await?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_matches_owner_and_published() {
        assert!(NoteScope::Any.matches(1, false));
        assert!(NoteScope::OwnedBy(7).matches(7, false));
        assert!(!NoteScope::OwnedBy(7).matches(8, true));
        assert!(NoteScope::Published.matches(8, true));
        assert!(!NoteScope::Published.matches(8, false));
    }
}
