/*
 * Responsibility
 * - handler 引数として使う extractor の公開 (認証コンテキスト / JSON body)
 */
pub mod auth_ctx;
pub mod json;

pub use auth_ctx::{AuthCtx, CurrentUser};
pub use json::JsonBody;
