/*
 * Responsibility
 * - tracing / panic hook 初期化
 * - Config読み込み → 依存生成 (repo / token codec) → Router 組み立て
 * - Middleware の適用 (HTTP 共通 / auth gate は routes 側)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, StorageBackend};
use crate::repos::{
    MemoryNoteRepo, MemoryUserRepo, NoteRepo, PgNoteRepo, PgUserRepo, UserRepo,
};
use crate::services::{auth::TokenCodec, notes::NoteSettings};
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,notes_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get lost
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(?config, "starting notes API on {}", config.addr);

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let (users, notes): (Arc<dyn UserRepo>, Arc<dyn NoteRepo>) = match &config.storage {
        StorageBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await
                .context("failed to connect to postgres")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("failed to apply migrations")?;

            (
                Arc::new(PgUserRepo::new(pool.clone())),
                Arc::new(PgNoteRepo::new(pool)),
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            (
                Arc::new(MemoryUserRepo::new()),
                Arc::new(MemoryNoteRepo::new()),
            )
        }
    };

    let tokens = Arc::new(TokenCodec::new(
        config.token_secret.as_bytes(),
        config.token_ttl_seconds,
        config.token_leeway_seconds,
    ));

    let note_settings = NoteSettings {
        title_max: config.note_title_max,
        body_max: config.note_body_max,
        per_page: config.notes_per_page,
    };

    Ok(AppState::new(
        users,
        notes,
        tokens,
        config.bcrypt_cost,
        note_settings,
    ))
}

/// API routes only, without the HTTP-level layers. Tests drive this directly.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state)
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    middleware::http::apply(api_router(state), config)
}
