//! access token（HS256 JWT）検証 → AuthCtx を extensions に入れる
//!
//! - `Authorization` ヘッダが無い            → 403 "missing token"
//! - `<scheme> <token>` の形になっていない   → 403 "malformed token"
//! - 署名不一致・decode 不可                 → 403 "malformed token"
//! - 署名は正しいが期限切れなど              → 422 "token is not valid"
//!
//! 成功時は `AuthCtx` を request extensions に格納する。型そのものがキーになるので
//! 他の middleware と文字列キーで衝突することはない。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderValue, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// 認証が必要な route 群に gate を掛ける。
///
/// 例：
/// ```ignore
/// let protected = Router::new().route("/me/notes", get(list_my_notes));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // route_layer: 存在しない path の 404 を 403 に変えてしまわないように
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers().get(header::AUTHORIZATION)).map_err(|err| {
        tracing::warn!(error = %err, "rejected request without usable credentials");
        err
    })?;

    let user_id = match state.tokens.verify(token) {
        Ok(user_id) => user_id,
        Err(err) => {
            tracing::warn!(error = %err, "access token verification failed");
            return Err(err.into());
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::new(user_id));

    Ok(next.run(req).await)
}

/// Split `Authorization` into scheme + token and return the token part.
pub(crate) fn bearer_token(value: Option<&HeaderValue>) -> Result<&str, AppError> {
    let value = match value {
        None => return Err(AppError::Forbidden("missing token")),
        Some(v) if v.is_empty() => return Err(AppError::Forbidden("missing token")),
        Some(v) => v.to_str().map_err(|_| AppError::Forbidden("malformed token"))?,
    };

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AppError::Forbidden("malformed token")),
    }
}
