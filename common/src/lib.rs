//! Agri AI Common Library
//!
//! CLIとライブラリ利用側で共有される型・症状マッチャー・ユーティリティ

pub mod types;
pub mod error;
pub mod similarity;
pub mod store;
pub mod matcher;
pub mod export;

pub use types::{CropType, DiagnosisQuery, DiagnosisResult, DiseaseRecord, Severity};
pub use error::{Error, FetchError, Result};
pub use similarity::{bigram_similarity, char_frequency_similarity, keyword_similarity, text_similarity};
pub use store::{KnowledgeBase, KnowledgeStore, RecordIssue};
pub use matcher::{derive_severity, diagnose, diagnose_records, score_record, select_best_match};
