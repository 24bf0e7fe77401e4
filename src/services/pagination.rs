//! Page-number pagination over a scoped note query.
//!
//! `page` is 1-indexed. Anything that is not a positive integer falls back to
//! page 1. There is no upper bound: a page past `max_page` is simply empty.

use serde::Serialize;

use crate::repos::{NoteRepo, NoteScope, NoteSummaryRow, RepoResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    per_page: i64,
}

impl PageRequest {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Lenient parse of the `page` query parameter.
    pub fn from_query(raw_page: Option<&str>, per_page: i64) -> Self {
        let page = raw_page
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(1);
        Self::new(page, per_page)
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub current_page: i64,
    pub max_page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl PageMeta {
    pub fn new(request: &PageRequest, total: i64) -> Self {
        let per_page = request.limit();
        // ceil(total / per_page), never below 1
        let max_page = ((total + per_page - 1) / per_page).max(1);

        Self {
            current_page: request.page(),
            max_page,
            per_page,
            total,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// Fetch one page of `scope` plus the total count under the same filter.
pub async fn paginate(
    repo: &dyn NoteRepo,
    scope: NoteScope,
    request: PageRequest,
) -> RepoResult<Page<NoteSummaryRow>> {
    let items = repo.list(scope, request.limit(), request.offset()).await?;
    let total = repo.count(scope).await?;

    Ok(Page {
        items,
        meta: PageMeta::new(&request, total),
    })
}
