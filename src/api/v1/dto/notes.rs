/*
 * Responsibility
 * - Notes の request/response DTO
 * - 一覧は body を含まない (NoteSummaryResponse)
 * - 詳細は no_body=true のとき body を省略する
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::{NoteRow, NoteSummaryRow};
use crate::services::notes::NotePatch;
use crate::services::pagination::PageMeta;

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub published: bool,
}

// Missing and null both mean "leave unchanged".
#[derive(Debug, Default, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub published: Option<bool>,
}

impl From<UpdateNoteRequest> for NotePatch {
    fn from(req: UpdateNoteRequest) -> Self {
        Self {
            title: req.title,
            body: req.body,
            published: req.published,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    // kept as a string so that `?page=abc` falls back to page 1 instead of a 400
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    pub no_body: Option<String>,
}

impl DetailQuery {
    pub fn omit_body(&self) -> bool {
        matches!(
            self.no_body.as_deref().map(str::trim),
            Some("true" | "1" | "yes")
        )
    }
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NoteResponse {
    pub fn from_row(row: NoteRow, omit_body: bool) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            body: (!omit_body).then_some(row.body),
            published: row.published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteSummaryResponse {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NoteSummaryRow> for NoteSummaryResponse {
    fn from(row: NoteSummaryRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            published: row.published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteEnvelope {
    pub success: bool,
    pub note: NoteResponse,
}

#[derive(Debug, Serialize)]
pub struct NoteListResponse {
    pub success: bool,
    pub notes: Vec<NoteSummaryResponse>,
    pub pagination: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_missing_fields_leave_patch_empty() {
        let req: UpdateNoteRequest =
            serde_json::from_str(r#"{"title":null,"published":null}"#).unwrap();
        assert_eq!(NotePatch::from(req), NotePatch::default());
    }

    #[test]
    fn empty_body_is_kept_as_a_replacement() {
        let req: UpdateNoteRequest = serde_json::from_str(r#"{"body":""}"#).unwrap();
        assert_eq!(NotePatch::from(req).body, Some(String::new()));
    }

    #[test]
    fn create_request_defaults() {
        let req: CreateNoteRequest = serde_json::from_str(r#"{"title":"hello"}"#).unwrap();
        assert_eq!(req.body, "");
        assert!(!req.published);
    }

    #[test]
    fn no_body_flag_parsing() {
        let flag = |v: Option<&str>| DetailQuery {
            no_body: v.map(str::to_string),
        }
        .omit_body();

        assert!(flag(Some("true")));
        assert!(flag(Some("1")));
        assert!(!flag(Some("false")));
        assert!(!flag(None));
    }
}
