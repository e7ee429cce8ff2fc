//! ナレッジストアモジュール
//!
//! 病害レコードの読み取り口。マッチャーはこのトレイト経由でのみレコードを参照する。

use crate::error::{FetchError, Result};
use crate::types::{CropType, DiseaseRecord};
use serde::{Deserialize, Serialize};

/// 病害レコードの読み取り専用ストア
pub trait KnowledgeStore {
    /// 作物区分に対応する全レコードを取得
    ///
    /// レコードが存在しない場合はエラーではなく空のVecを返すこと。
    fn fetch_disease_records(
        &self,
        crop_type: CropType,
    ) -> std::result::Result<Vec<DiseaseRecord>, FetchError>;
}

impl<S: KnowledgeStore + ?Sized> KnowledgeStore for &S {
    fn fetch_disease_records(
        &self,
        crop_type: CropType,
    ) -> std::result::Result<Vec<DiseaseRecord>, FetchError> {
        (**self).fetch_disease_records(crop_type)
    }
}

/// メモリ上のナレッジベース
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeBase {
    records: Vec<DiseaseRecord>,
}

impl KnowledgeBase {
    pub fn new(records: Vec<DiseaseRecord>) -> Self {
        Self { records }
    }

    /// JSON文字列（レコード配列）から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<DiseaseRecord> = serde_json::from_str(json)?;
        Ok(Self { records })
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn records(&self) -> &[DiseaseRecord] {
        &self.records
    }

    /// 作物区分で絞り込み（格納順を維持）
    pub fn records_for(&self, crop_type: CropType) -> impl Iterator<Item = &DiseaseRecord> {
        self.records.iter().filter(move |r| r.crop_type == crop_type)
    }

    pub fn insert(&mut self, record: DiseaseRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 作物区分ごとの件数（CropType::ALL順、0件は除外）
    pub fn counts_by_crop(&self) -> Vec<(CropType, usize)> {
        CropType::ALL
            .iter()
            .map(|crop| (*crop, self.records_for(*crop).count()))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    /// レコードの不備を検出
    pub fn validate(&self) -> Vec<RecordIssue> {
        let mut issues = Vec::new();

        for (index, record) in self.records.iter().enumerate() {
            if record.symptoms.is_empty() {
                issues.push(RecordIssue::new(index, record, "has no symptom phrases"));
            } else if record.symptoms.iter().any(|s| s.trim().is_empty()) {
                issues.push(RecordIssue::new(index, record, "contains a blank symptom phrase"));
            }

            if let Some(threshold) = record.confidence_threshold {
                if !(0.0..=1.0).contains(&threshold) {
                    issues.push(RecordIssue::new(
                        index,
                        record,
                        &format!("confidence threshold {} is outside 0.0-1.0", threshold),
                    ));
                }
            }

            if record.treatment.trim().is_empty() {
                issues.push(RecordIssue::new(index, record, "has no treatment text"));
            }
        }

        issues
    }
}

impl KnowledgeStore for KnowledgeBase {
    fn fetch_disease_records(
        &self,
        crop_type: CropType,
    ) -> std::result::Result<Vec<DiseaseRecord>, FetchError> {
        Ok(self.records_for(crop_type).cloned().collect())
    }
}

/// 検証で見つかった不備
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIssue {
    /// レコードの位置（0始まり）
    pub index: usize,
    pub crop_type: CropType,
    pub disease_name: String,
    pub message: String,
}

impl RecordIssue {
    fn new(index: usize, record: &DiseaseRecord, message: &str) -> Self {
        Self {
            index,
            crop_type: record.crop_type,
            disease_name: record.disease_name.clone(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} ({}): {}",
            self.index, self.disease_name, self.crop_type, self.message
        )
    }
}
