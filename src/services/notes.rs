//! Note validation, scoped CRUD and partial updates.
//!
//! Every lookup goes through a `NoteScope`. A note owned by someone else and a
//! note that does not exist both come back as `NotFound`.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::AppError;
use crate::repos::{NewNote, NoteRepo, NoteRow, NoteScope, NoteSummaryRow};
use crate::services::pagination::{self, Page, PageRequest};

pub const TITLE_MIN: usize = 3;

/// Configured limits. Lengths are counted in characters (code points).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteSettings {
    pub title_max: usize,
    pub body_max: usize,
    pub per_page: i64,
}

impl Default for NoteSettings {
    fn default() -> Self {
        Self {
            title_max: 40,
            body_max: 1024,
            per_page: 10,
        }
    }
}

/// Partial update. `None` leaves the stored value alone; `Some("")` for the body
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub published: Option<bool>,
}

impl NotePatch {
    pub fn apply(self, note: &mut NoteRow) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(body) = self.body {
            note.body = body;
        }
        if let Some(published) = self.published {
            note.published = published;
        }
    }
}

#[derive(Clone)]
pub struct NoteService {
    repo: Arc<dyn NoteRepo>,
    settings: NoteSettings,
}

impl std::fmt::Debug for NoteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteService")
            .field("settings", &self.settings)
            .finish()
    }
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteRepo>, settings: NoteSettings) -> Self {
        Self { repo, settings }
    }

    pub fn settings(&self) -> NoteSettings {
        self.settings
    }

    pub fn validate(&self, owner_id: i64, title: &str, body: &str) -> Result<(), AppError> {
        let title_len = title.chars().count();
        if !(TITLE_MIN..=self.settings.title_max).contains(&title_len) {
            return Err(AppError::validation(format!(
                "title is required ({TITLE_MIN} <= length <= {})",
                self.settings.title_max
            )));
        }

        if body.chars().count() > self.settings.body_max {
            return Err(AppError::validation(format!(
                "body is too long (length <= {})",
                self.settings.body_max
            )));
        }

        if owner_id <= 0 {
            return Err(AppError::validation("owner id is invalid"));
        }

        Ok(())
    }

    pub async fn create(&self, note: NewNote) -> Result<NoteRow, AppError> {
        self.validate(note.owner_id, &note.title, &note.body)?;

        let row = self.repo.insert(note).await?;
        info!(note_id = row.id, owner_id = row.owner_id, "note created");
        Ok(row)
    }

    pub async fn get(&self, id: i64, scope: NoteScope) -> Result<NoteRow, AppError> {
        self.repo
            .find(id, scope)
            .await?
            .ok_or(AppError::not_found("note"))
    }

    /// Fetch (scoped), merge the patch, re-validate, then persist.
    /// A merged note that fails validation is never written.
    pub async fn update(
        &self,
        id: i64,
        scope: NoteScope,
        patch: NotePatch,
    ) -> Result<NoteRow, AppError> {
        let mut note = self.get(id, scope).await?;
        patch.apply(&mut note);

        self.validate(note.owner_id, &note.title, &note.body)?;

        let row = self
            .repo
            .update(&note)
            .await?
            .ok_or(AppError::not_found("note"))?;
        debug!(note_id = row.id, "note updated");
        Ok(row)
    }

    pub async fn remove(&self, id: i64, scope: NoteScope) -> Result<(), AppError> {
        let note = self.get(id, scope).await?;

        if !self.repo.delete(note.id, NoteScope::OwnedBy(note.owner_id)).await? {
            // Deleted concurrently between the lookup and the delete
            return Err(AppError::not_found("note"));
        }
        info!(note_id = note.id, "note removed");
        Ok(())
    }

    pub async fn list(
        &self,
        scope: NoteScope,
        raw_page: Option<&str>,
    ) -> Result<Page<NoteSummaryRow>, AppError> {
        let request = PageRequest::from_query(raw_page, self.settings.per_page);
        Ok(pagination::paginate(self.repo.as_ref(), scope, request).await?)
    }
}
