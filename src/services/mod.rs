/*
 * Responsibility
 * - ドメインロジック (アカウント、ノート、ページネーション、トークン)
 * - HTTP (axum) には依存しない。repo は trait object で受け取る
 */
pub mod accounts;
pub mod auth;
pub mod notes;
pub mod pagination;
