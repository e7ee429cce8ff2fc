use crate::error::{AgriAiError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// ナレッジベースパスを上書きする環境変数
pub const KNOWLEDGE_ENV: &str = "AGRI_AI_KNOWLEDGE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub knowledge_path: Option<PathBuf>,
    pub history_path: Option<PathBuf>,
    pub user_id: Option<String>,
    pub record_history: bool,
    /// 一括診断の並列数（0 = rayonの既定値）
    pub batch_jobs: usize,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// 指定パスから読み込み（存在しなければ既定値）
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AgriAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("agri-ai").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            knowledge_path: None,
            history_path: None,
            user_id: None,
            record_history: true,
            batch_jobs: 0,
            log_filter: "info".into(),
        }
    }

    /// ナレッジベースのパスを解決
    ///
    /// 優先順位: CLI引数 > 環境変数 > 設定ファイル
    pub fn resolve_knowledge_path(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = cli_override {
            return Ok(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(KNOWLEDGE_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        self.knowledge_path
            .clone()
            .ok_or(AgriAiError::MissingKnowledgePath)
    }

    /// 診断履歴ファイルのパスを解決
    pub fn resolve_history_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.history_path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| AgriAiError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data_dir.join("agri-ai").join("history.json"))
    }

    pub fn set_knowledge_path(&mut self, path: PathBuf) -> Result<()> {
        self.knowledge_path = Some(path);
        self.save()
    }

    pub fn set_user_id(&mut self, user_id: String) -> Result<()> {
        self.user_id = Some(user_id);
        self.save()
    }
}
