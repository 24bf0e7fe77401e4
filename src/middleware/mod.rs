/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: Bearer トークン検証 (auth gate)
 * - http: request-id / trace / body limit / timeout / CORS
 */
pub mod auth;
pub mod http;
