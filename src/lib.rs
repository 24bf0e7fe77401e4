/*
 * Responsibility
 * - crate のモジュール構成を公開する (binary と tests/ の両方から参照する)
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
