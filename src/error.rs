use agri_ai_common::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgriAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ナレッジベースが設定されていません。`agri-ai config --set-knowledge PATH` か --knowledge で指定してください")]
    MissingKnowledgePath,

    #[error("ナレッジベースが見つかりません: {0}")]
    KnowledgeBaseNotFound(String),

    #[error("ナレッジストア読み込みエラー: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Common(#[from] agri_ai_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("診断履歴エラー: {0}")]
    History(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("入力が不正: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, AgriAiError>;
