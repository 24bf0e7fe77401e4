use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

use super::AuthCtx;

/// Handler で AuthCtx を受け取るための extractor
/// middleware が AuthCtx を request.extensions() に insert 済みである前提
/// 見つからない場合は gate の付け忘れ (プログラミングエラー) なので 500 を返す
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub AuthCtx);

impl CurrentUser {
    pub fn user_id(&self) -> i64 {
        self.0.user_id
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .copied()
            .map(CurrentUser)
            .ok_or_else(|| {
                tracing::error!(
                    path = %parts.uri.path(),
                    "handler requires AuthCtx but the auth gate is not applied"
                );
                AppError::Internal
            })
    }
}
