//! 診断履歴ファイル
//!
//! 診断レコードをJSONファイルに追記保存する。
//! キャッシュと違い、破損・バージョン不一致のファイルは黙って作り直さずエラーにする。

use super::{DiagnosisRecord, DiagnosisRecorder};
use crate::error::{AgriAiError, Result};
use agri_ai_common::CropType;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 履歴ファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryData {
    /// バージョン（互換性チェック用）
    version: u32,
    /// 記録順のレコード
    entries: Vec<DiagnosisRecord>,
}

impl Default for HistoryData {
    fn default() -> Self {
        Self {
            version: HistoryFile::CURRENT_VERSION,
            entries: Vec::new(),
        }
    }
}

/// 診断履歴ファイル
#[derive(Debug, Clone)]
pub struct HistoryFile {
    path: PathBuf,
    data: HistoryData,
}

impl HistoryFile {
    const CURRENT_VERSION: u32 = 1;

    /// 履歴ファイルを読み込み（存在しなければ空）
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                path: path.to_path_buf(),
                data: HistoryData::default(),
            });
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let data: HistoryData = serde_json::from_reader(reader).map_err(|e| {
            AgriAiError::History(format!("{} を読み込めません: {}", path.display(), e))
        })?;

        // バージョンチェック
        if data.version != Self::CURRENT_VERSION {
            return Err(AgriAiError::History(format!(
                "未対応の履歴バージョン {} (対応: {})",
                data.version,
                Self::CURRENT_VERSION
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    /// 履歴ファイルを保存
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // 一時ファイルに書いてから置き換える
        let temp_path = self.path.with_extension("json.tmp");
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.data)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 記録順の全レコード
    pub fn entries(&self) -> &[DiagnosisRecord] {
        &self.data.entries
    }

    /// 作物区分で絞り込み（記録順）
    pub fn for_crop(&self, crop_type: CropType) -> Vec<&DiagnosisRecord> {
        self.data
            .entries
            .iter()
            .filter(|r| r.crop_type == crop_type)
            .collect()
    }

    /// 新しい順に最大n件
    pub fn latest(&self, n: usize) -> Vec<&DiagnosisRecord> {
        self.data.entries.iter().rev().take(n).collect()
    }

    /// レコード件数
    pub fn len(&self) -> usize {
        self.data.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }
}

impl DiagnosisRecorder for HistoryFile {
    fn record(&mut self, record: DiagnosisRecord) -> Result<()> {
        debug!(id = %record.id, crop = %record.crop_type, "recording diagnosis");
        self.data.entries.push(record);
        self.save()
    }

    fn record_all(&mut self, records: Vec<DiagnosisRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        debug!(count = records.len(), "recording diagnoses");
        self.data.entries.extend(records);
        self.save()
    }
}
