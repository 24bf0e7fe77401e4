/*
 * Responsibility
 * - record store の抽象 (UserRepo / NoteRepo) と実装 (Postgres / in-memory) を束ねる
 * - service 層は trait object (Arc<dyn ...>) だけを見る
 */
pub mod error;
pub mod memory;
pub mod note_repo;
pub mod user_repo;

pub use error::{RepoError, RepoResult};
pub use memory::{MemoryNoteRepo, MemoryUserRepo};
pub use note_repo::{NewNote, NoteRepo, NoteRow, NoteScope, NoteSummaryRow, PgNoteRepo};
pub use user_repo::{PgUserRepo, UserRepo, UserRow};
