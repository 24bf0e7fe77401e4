//! Process-local record store.
//!
//! Backs the `memory` storage backend and the test suite. Same contract as the
//! Postgres repos: ids are assigned sequentially from 1, lists are ordered by
//! `updated_at DESC, id DESC`, and no username uniqueness is enforced here.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::repos::error::RepoResult;
use crate::repos::note_repo::{NewNote, NoteRepo, NoteRow, NoteScope, NoteSummaryRow};
use crate::repos::user_repo::{UserRepo, UserRow};

#[derive(Debug)]
struct Table<T> {
    last_id: i64,
    rows: BTreeMap<i64, T>,
}

// Written by hand: the derive would demand `T: Default` of the row types.
impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserRepo {
    table: RwLock<Table<UserRow>>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn insert(&self, username: &str, password_hash: &str) -> RepoResult<UserRow> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let row = UserRow {
            id: table.next_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<UserRow>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRow>> {
        // BTreeMap iterates in id order, so the oldest account wins like the SQL version
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|row| row.username == username)
            .cloned())
    }
}

#[derive(Debug, Default)]
pub struct MemoryNoteRepo {
    table: RwLock<Table<NoteRow>>,
}

impl MemoryNoteRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteRepo for MemoryNoteRepo {
    async fn insert(&self, note: NewNote) -> RepoResult<NoteRow> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let row = NoteRow {
            id: table.next_id(),
            owner_id: note.owner_id,
            title: note.title,
            body: note.body,
            published: note.published,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find(&self, id: i64, scope: NoteScope) -> RepoResult<Option<NoteRow>> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .get(&id)
            .filter(|row| scope.matches(row.owner_id, row.published))
            .cloned())
    }

    async fn update(&self, note: &NoteRow) -> RepoResult<Option<NoteRow>> {
        let mut table = self.table.write().await;
        let Some(stored) = table
            .rows
            .get_mut(&note.id)
            .filter(|row| row.owner_id == note.owner_id)
        else {
            return Ok(None);
        };

        stored.title = note.title.clone();
        stored.body = note.body.clone();
        stored.published = note.published;
        stored.updated_at = Utc::now();

        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: i64, scope: NoteScope) -> RepoResult<bool> {
        let mut table = self.table.write().await;
        let owned = table
            .rows
            .get(&id)
            .is_some_and(|row| scope.matches(row.owner_id, row.published));
        if !owned {
            return Ok(false);
        }
        Ok(table.rows.remove(&id).is_some())
    }

    async fn list(
        &self,
        scope: NoteScope,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<NoteSummaryRow>> {
        let table = self.table.read().await;
        let mut rows: Vec<&NoteRow> = table
            .rows
            .values()
            .filter(|row| scope.matches(row.owner_id, row.published))
            .collect();
        rows.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(NoteSummaryRow::from)
            .collect())
    }

    async fn count(&self, scope: NoteScope) -> RepoResult<i64> {
        let table = self.table.read().await;
        let total = table
            .rows
            .values()
            .filter(|row| scope.matches(row.owner_id, row.published))
            .count();
        Ok(total as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_note(owner_id: i64, title: &str, published: bool) -> NewNote {
        NewNote {
            owner_id,
            title: title.to_string(),
            body: String::new(),
            published,
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_per_table() {
        let users = MemoryUserRepo::new();
        let a = users.insert("alice", "hash").await.unwrap();
        let b = users.insert("bob", "hash").await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let notes = MemoryNoteRepo::new();
        let n = notes.insert(new_note(a.id, "first", false)).await.unwrap();
        assert_eq!(n.id, 1);
    }

    #[tokio::test]
    async fn duplicate_usernames_are_not_rejected_by_the_store() {
        let users = MemoryUserRepo::new();
        let first = users.insert("alice", "h1").await.unwrap();
        users.insert("alice", "h2").await.unwrap();

        let found = users.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn list_orders_newest_first_and_applies_offset() {
        let notes = MemoryNoteRepo::new();
        for i in 0..5 {
            notes
                .insert(new_note(1, &format!("note {i}"), false))
                .await
                .unwrap();
        }

        let page = notes.list(NoteScope::OwnedBy(1), 2, 1).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![4, 3]);
    }

    #[tokio::test]
    async fn delete_respects_scope() {
        let notes = MemoryNoteRepo::new();
        let row = notes.insert(new_note(1, "mine", false)).await.unwrap();

        assert!(!notes.delete(row.id, NoteScope::OwnedBy(2)).await.unwrap());
        assert!(notes.delete(row.id, NoteScope::OwnedBy(1)).await.unwrap());
        assert_eq!(notes.count(NoteScope::Any).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn default_repos_start_empty() {
        let users = MemoryUserRepo::default();
        assert!(users.find_by_id(1).await.unwrap().is_none());

        let notes = MemoryNoteRepo::default();
        assert_eq!(notes.count(NoteScope::Any).await.unwrap(), 0);
        let first = notes.insert(new_note(1, "first", false)).await.unwrap();
        assert_eq!(first.id, 1);
    }
}
