/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - accounts / notes service と token codec
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - repo は外から注入する (テストでは in-memory を渡す)
 */
use std::sync::Arc;

use crate::repos::{NoteRepo, UserRepo};
use crate::services::{
    accounts::AccountService,
    auth::TokenCodec,
    notes::{NoteService, NoteSettings},
};

#[derive(Clone, Debug)]
pub struct AppState {
    pub accounts: AccountService,
    pub notes: NoteService,
    pub tokens: Arc<TokenCodec>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepo>,
        notes: Arc<dyn NoteRepo>,
        tokens: Arc<TokenCodec>,
        bcrypt_cost: u32,
        note_settings: NoteSettings,
    ) -> Self {
        Self {
            accounts: AccountService::new(users, tokens.clone(), bcrypt_cost),
            notes: NoteService::new(notes, note_settings),
            tokens,
        }
    }
}
