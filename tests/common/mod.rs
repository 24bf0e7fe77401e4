#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use notes_api::app::api_router;
use notes_api::repos::{MemoryNoteRepo, MemoryUserRepo, NewNote, NoteRow};
use notes_api::services::accounts::Credentials;
use notes_api::services::auth::TokenCodec;
use notes_api::services::notes::NoteSettings;
use notes_api::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"test_secret_key_for_testing_purposes";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub fn setup_test_app() -> TestApp {
    let tokens = Arc::new(TokenCodec::new(TEST_SECRET, 3600, 0));
    let state = AppState::new(
        Arc::new(MemoryUserRepo::new()),
        Arc::new(MemoryNoteRepo::new()),
        tokens,
        4, // lowest bcrypt cost keeps the suite fast
        NoteSettings::default(),
    );

    TestApp {
        router: api_router(state.clone()),
        state,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, body)
    }

    /// Creates an account directly through the service and returns its id.
    pub async fn create_user(&self, username: &str, password: &str) -> i64 {
        self.state
            .accounts
            .create(Credentials {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await
            .unwrap()
            .id
    }

    pub fn token_for(&self, user_id: i64) -> String {
        self.state.tokens.issue(user_id).unwrap()
    }

    pub async fn create_note(
        &self,
        owner_id: i64,
        title: &str,
        body: &str,
        published: bool,
    ) -> NoteRow {
        self.state
            .notes
            .create(NewNote {
                owner_id,
                title: title.to_string(),
                body: body.to_string(),
                published,
            })
            .await
            .unwrap()
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
