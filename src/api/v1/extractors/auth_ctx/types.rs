/*
 * Responsibility
 * - エンドポイントごとの「要求 permission」をタグ型として宣言する
 * - handler は Authorized<Tag> を引数に取るだけで、必要な permission が型で決まる
 *
 * 置くもの
 *  - Permission trait
 *  - AuthOnly (認証のみ、permission 不要) などのタグ型
 *
 * 置かないもの
 *  - token 検証ロジック (services/auth 側の責務)
 *  - extractor 実装 (core.rs)
 */

/// A compile-time permission requirement, e.g. `"post:actors"`.
///
/// The empty string means any authenticated caller is accepted.
pub trait Permission: Send + Sync + 'static {
    const REQUIRED: &'static str;
}

// introspection / authenticated-only routes
pub enum AuthOnly {}

impl Permission for AuthOnly {
    const REQUIRED: &'static str = "";
}

// actors
pub enum GetActors {}
pub enum PostActors {}
pub enum PatchActors {}
pub enum DeleteActors {}

// movies
pub enum GetMovies {}
pub enum PostMovies {}
pub enum PatchMovies {}
pub enum DeleteMovies {}

macro_rules! permission {
    ($($tag:ty => $name:literal),* $(,)?) => {
        $(impl Permission for $tag {
            const REQUIRED: &'static str = $name;
        })*
    };
}

permission! {
    GetActors => "get:actors",
    PostActors => "post:actors",
    PatchActors => "patch:actors",
    DeleteActors => "delete:actors",
    GetMovies => "get:movies",
    PostMovies => "post:movies",
    PatchMovies => "patch:movies",
    DeleteMovies => "delete:movies",
}
