/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - public (health / users / login / published notes) と protected (/me 以下) を分けて merge
 * - Bearer が必要な範囲は route_layer (auth gate) でここで決める
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware;
use crate::state::AppState;

use crate::api::v1::handlers::{
    health::health,
    notes::{create_note, delete_my_note, get_my_note, list_my_notes, update_my_note},
    public_notes::{get_published_note, list_published_notes},
    users::{create_user, login, me},
};

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/users", post(create_user))
        .route("/me", post(login))
        .route("/notes", get(list_published_notes))
        .route("/notes/{note_id}", get(get_published_note));

    let protected = Router::new()
        .route("/me", get(me))
        .route("/me/notes", get(list_my_notes).post(create_note))
        .route(
            "/me/notes/{note_id}",
            get(get_my_note)
                .put(update_my_note)
                .patch(update_my_note)
                .delete(delete_my_note),
        );
    let protected = middleware::auth::access::apply(protected, state);

    // `/me` exists in both: POST (login) stays public, GET goes through the gate.
    public.merge(protected)
}
