/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 * - "見つからない" は Option で表現し、ここには含めない (ここに来るのは障害のみ)
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;
