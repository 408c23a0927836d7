/*
 * Responsibility
 * - middleware の公開インターフェース
 * - 認可は middleware ではなく extractor (api::v1::extractors) で行う
 */
pub mod http;
