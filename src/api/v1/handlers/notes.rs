/*
 * Responsibility
 * - /me/notes 系 CRUD handler (auth gate の内側)
 * - 所有者は常に CurrentUser から取る (リクエストボディの owner は受け付けない)
 * - 他人のノートは存在しないものとして 404 を返す
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::notes::{
            CreateNoteRequest, DetailQuery, ListQuery, NoteEnvelope, NoteListResponse,
            NoteResponse, UpdateNoteRequest,
        },
        extractors::{CurrentUser, JsonBody},
    },
    error::AppError,
    repos::{NewNote, NoteScope},
    state::AppState,
};

pub async fn list_my_notes(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<NoteListResponse>, AppError> {
    let page = state
        .notes
        .list(NoteScope::OwnedBy(user.user_id()), query.page.as_deref())
        .await?;

    Ok(Json(NoteListResponse {
        success: true,
        notes: page.items.into_iter().map(Into::into).collect(),
        pagination: page.meta,
    }))
}

pub async fn create_note(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(req): JsonBody<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteEnvelope>), AppError> {
    // Tokens can outlive their account
    let owner = state.accounts.get(user.user_id()).await?;

    let row = state
        .notes
        .create(NewNote {
            owner_id: owner.id,
            title: req.title,
            body: req.body,
            published: req.published,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(NoteEnvelope {
            success: true,
            note: NoteResponse::from_row(row, false),
        }),
    ))
}

pub async fn get_my_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(note_id): Path<i64>,
    Query(query): Query<DetailQuery>,
) -> Result<Json<NoteEnvelope>, AppError> {
    let row = state
        .notes
        .get(note_id, NoteScope::OwnedBy(user.user_id()))
        .await?;

    Ok(Json(NoteEnvelope {
        success: true,
        note: NoteResponse::from_row(row, query.omit_body()),
    }))
}

pub async fn update_my_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(note_id): Path<i64>,
    JsonBody(req): JsonBody<UpdateNoteRequest>,
) -> Result<Json<NoteEnvelope>, AppError> {
    let row = state
        .notes
        .update(note_id, NoteScope::OwnedBy(user.user_id()), req.into())
        .await?;

    Ok(Json(NoteEnvelope {
        success: true,
        note: NoteResponse::from_row(row, false),
    }))
}

pub async fn delete_my_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(note_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state
        .notes
        .remove(note_id, NoteScope::OwnedBy(user.user_id()))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
