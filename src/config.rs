/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, TOKEN_SECRET, ページサイズ、文字数制限など)
 * - 設定値のバリデーション (不足・範囲外なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::auth::token::MAX_TOKEN_WINDOW_SECONDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Which record store backs the repos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub storage: StorageBackend,
    pub cors_allowed_origins: Vec<String>,

    // HS256 signing secret, process-wide and read-only after startup
    pub token_secret: String,
    pub token_ttl_seconds: u64,
    pub token_leeway_seconds: u64,
    pub bcrypt_cost: u32,

    pub notes_per_page: i64,
    pub note_title_max: usize,
    pub note_body_max: usize,

    pub request_body_limit_bytes: usize,
    pub request_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the token secret or the database url (may contain credentials)
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field(
                "storage",
                &match self.storage {
                    StorageBackend::Postgres { .. } => "postgres",
                    StorageBackend::Memory => "memory",
                },
            )
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("notes_per_page", &self.notes_per_page)
            .field("note_title_max", &self.note_title_max)
            .field("note_body_max", &self.note_body_max)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let storage = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" | "pg" => {
                let database_url = std::env::var("DATABASE_URL")
                    .map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
                let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(5);
                StorageBackend::Postgres {
                    database_url,
                    max_connections,
                }
            }
            "memory" => StorageBackend::Memory,
            _ => return Err(ConfigError::Invalid("STORAGE_BACKEND")),
        };

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let token_secret =
            std::env::var("TOKEN_SECRET").map_err(|_| ConfigError::Missing("TOKEN_SECRET"))?;
        if token_secret.is_empty() {
            return Err(ConfigError::Invalid("TOKEN_SECRET"));
        }

        let token_ttl_seconds = std::env::var("TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(86_400); // 1 day

        let token_leeway_seconds = std::env::var("TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        check_token_window(token_ttl_seconds, token_leeway_seconds)?;

        let bcrypt_cost = std::env::var("BCRYPT_COST")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(bcrypt::DEFAULT_COST);
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid("BCRYPT_COST"));
        }

        let notes_per_page = std::env::var("NOTES_PER_PAGE")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(10);
        if notes_per_page < 1 {
            return Err(ConfigError::Invalid("NOTES_PER_PAGE"));
        }

        let note_title_max = std::env::var("NOTE_TITLE_MAX")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(40);
        if note_title_max < 3 {
            return Err(ConfigError::Invalid("NOTE_TITLE_MAX"));
        }

        let note_body_max = std::env::var("NOTE_BODY_MAX")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024);

        let request_body_limit_bytes = std::env::var("REQUEST_BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        let request_timeout = std::env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Ok(Self {
            addr,
            app_env,
            storage,
            cors_allowed_origins,
            token_secret,
            token_ttl_seconds,
            token_leeway_seconds,
            bcrypt_cost,
            notes_per_page,
            note_title_max,
            note_body_max,
            request_body_limit_bytes,
            request_timeout,
        })
    }
}

/// `exp = iat + ttl` has to stay representable, and a zero lifetime would
/// hand out tokens that are already expired.
fn check_token_window(ttl_seconds: u64, leeway_seconds: u64) -> Result<(), ConfigError> {
    if !(1..=MAX_TOKEN_WINDOW_SECONDS).contains(&ttl_seconds) {
        return Err(ConfigError::Invalid("TOKEN_TTL_SECONDS"));
    }
    if leeway_seconds > MAX_TOKEN_WINDOW_SECONDS {
        return Err(ConfigError::Invalid("TOKEN_LEEWAY_SECONDS"));
    }
    Ok(())
}
