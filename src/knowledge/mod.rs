//! ナレッジベース読み込みモジュール
//!
//! JSONファイル（病害レコードの配列）をナレッジストアとして扱う。

pub mod cache;

pub use cache::CachedStore;

use crate::error::{AgriAiError, Result};
use agri_ai_common::{CropType, DiseaseRecord, FetchError, KnowledgeBase, KnowledgeStore};
use std::path::{Path, PathBuf};
use tracing::debug;

/// JSONファイルを参照するナレッジストア
///
/// 取得のたびにファイルを読み直す。繰り返し参照する場合は `CachedStore` で包む。
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// ファイルの存在を確認して生成
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AgriAiError::KnowledgeBaseNotFound(path.display().to_string()));
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ナレッジベース全体を読み込み
    pub fn load(&self) -> std::result::Result<KnowledgeBase, FetchError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            FetchError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;

        KnowledgeBase::from_json(&content)
            .map_err(|e| FetchError::InvalidData(format!("{}: {}", self.path.display(), e)))
    }
}

impl KnowledgeStore for JsonFileStore {
    fn fetch_disease_records(
        &self,
        crop_type: CropType,
    ) -> std::result::Result<Vec<DiseaseRecord>, FetchError> {
        let base = self.load()?;
        let records: Vec<DiseaseRecord> = base.records_for(crop_type).cloned().collect();
        debug!(crop = %crop_type, count = records.len(), path = %self.path.display(), "fetched disease records");
        Ok(records)
    }
}
