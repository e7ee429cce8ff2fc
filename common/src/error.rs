//! エラー型定義

use thiserror::Error;

/// ナレッジストア読み込みエラー
///
/// 診断処理はこのエラーを握りつぶさず、そのまま呼び出し元へ返す。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("knowledge store unavailable: {0}")]
    Unavailable(String),

    #[error("knowledge store returned invalid data: {0}")]
    InvalidData(String),
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
