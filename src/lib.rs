//! Agri AI CLI library
//!
//! 症状診断の周辺機能: 設定・ナレッジベース読み込み・診断履歴・一括/対話診断・エクスポート

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod interactive;
pub mod knowledge;
pub mod recorder;
pub mod report;
