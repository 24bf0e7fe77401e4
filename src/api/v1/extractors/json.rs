/*
 * Responsibility
 * - request body の JSON extractor
 * - axum 標準の rejection (400 + text/plain) を AppError の共通 envelope に揃える
 */
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// `Json<T>` と同じだが、失敗時は `AppError::Validation` を返す
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        Ok(JsonBody(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    tracing::debug!(reason = %rejection.body_text(), "rejected request body");

    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::validation("missing 'Content-Type: application/json' header")
        }
        JsonRejection::JsonDataError(_) => AppError::validation("invalid field in request body"),
        _ => AppError::validation("invalid request body"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{self, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        title: String,
    }

    fn json_request(raw: &'static str) -> Request {
        http::Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .unwrap()
    }

    fn validation_message(err: AppError) -> String {
        match err {
            AppError::Validation(message) => message,
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn accepts_well_formed_body() {
        let JsonBody(payload) =
            JsonBody::<Payload>::from_request(json_request(r#"{"title":"ok"}"#), &())
                .await
                .unwrap();
        assert_eq!(payload.title, "ok");
    }

    #[tokio::test]
    async fn syntax_error_becomes_validation_error() {
        let err = JsonBody::<Payload>::from_request(json_request("{not json"), &())
            .await
            .unwrap_err();
        assert_eq!(validation_message(err), "invalid request body");
    }

    #[tokio::test]
    async fn wrong_shape_becomes_validation_error() {
        let err = JsonBody::<Payload>::from_request(json_request(r#"{"title":5}"#), &())
            .await
            .unwrap_err();
        assert_eq!(validation_message(err), "invalid field in request body");
    }

    #[tokio::test]
    async fn missing_content_type_becomes_validation_error() {
        let req = http::Request::builder()
            .method("POST")
            .body(Body::from(r#"{"title":"ok"}"#))
            .unwrap();

        let err = JsonBody::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_eq!(
            validation_message(err),
            "missing 'Content-Type: application/json' header"
        );
    }
}
