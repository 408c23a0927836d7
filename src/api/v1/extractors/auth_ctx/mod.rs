/*!
 * Authorization extractor
 *
 * Responsibility:
 * - 認可済みリクエストの claims を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、permission タグは types に分離する
 *
 * Public API:
 * - Authorized<P>
 * - Permission, AuthOnly, GetActors, PostMovies, ...
 */

mod core;
mod types;

pub use core::Authorized;
pub use types::*;
