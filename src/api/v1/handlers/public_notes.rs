/*
 * Responsibility
 * - GET /notes, GET /notes/{id} (認証なし)
 * - published = true のノートだけを見せる。それ以外は 404
 */
use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    api::v1::dto::notes::{DetailQuery, ListQuery, NoteEnvelope, NoteListResponse, NoteResponse},
    error::AppError,
    repos::NoteScope,
    state::AppState,
};

pub async fn list_published_notes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<NoteListResponse>, AppError> {
    let page = state
        .notes
        .list(NoteScope::Published, query.page.as_deref())
        .await?;

    Ok(Json(NoteListResponse {
        success: true,
        notes: page.items.into_iter().map(Into::into).collect(),
        pagination: page.meta,
    }))
}

pub async fn get_published_note(
    State(state): State<AppState>,
    Path(note_id): Path<i64>,
    Query(query): Query<DetailQuery>,
) -> Result<Json<NoteEnvelope>, AppError> {
    let row = state.notes.get(note_id, NoteScope::Published).await?;

    Ok(Json(NoteEnvelope {
        success: true,
        note: NoteResponse::from_row(row, query.omit_body()),
    }))
}
