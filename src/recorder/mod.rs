//! 診断履歴モジュール
//!
//! 診断結果を元の問い合わせと一緒に1件ずつ不変レコードとして保存する。

mod history;

pub use history::HistoryFile;

use crate::error::Result;
use agri_ai_common::export::excel_core::DiagnosisRow;
use agri_ai_common::{CropType, DiagnosisQuery, DiagnosisResult, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 保存される診断レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub crop_type: CropType,
    pub symptom_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub disease_name: Option<String>,
    pub diagnosis: String,
    pub confidence: f64,
    pub severity: Severity,
    pub treatment: String,
    pub prevention: String,
}

impl DiagnosisRecord {
    /// 問い合わせと診断結果からレコードを作成
    pub fn new(
        query: &DiagnosisQuery,
        result: &DiagnosisResult,
        image_ref: Option<&str>,
        user_id: Option<&str>,
    ) -> Self {
        Self::at(Utc::now(), query, result, image_ref, user_id)
    }

    /// 作成日時を指定してレコードを作成
    pub fn at(
        created_at: DateTime<Utc>,
        query: &DiagnosisQuery,
        result: &DiagnosisResult,
        image_ref: Option<&str>,
        user_id: Option<&str>,
    ) -> Self {
        Self {
            id: record_id(&created_at, query),
            created_at,
            user_id: user_id.map(str::to_string),
            crop_type: query.crop_type,
            symptom_text: query.symptom_text.clone(),
            image_ref: image_ref.map(str::to_string),
            disease_name: result.disease_name.clone(),
            diagnosis: result.diagnosis.clone(),
            confidence: result.confidence,
            severity: result.severity,
            treatment: result.treatment.clone(),
            prevention: result.prevention.clone(),
        }
    }
}

/// レコードID: 日時・作物区分・症状テキストのSHA-256先頭16桁
fn record_id(created_at: &DateTime<Utc>, query: &DiagnosisQuery) -> String {
    let mut hasher = Sha256::new();
    hasher.update(created_at.to_rfc3339().as_bytes());
    hasher.update(query.crop_type.as_str().as_bytes());
    hasher.update(query.symptom_text.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

impl DiagnosisRow for DiagnosisRecord {
    fn recorded_at(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M").to_string()
    }
    fn crop_type(&self) -> &str { self.crop_type.as_str() }
    fn symptom_text(&self) -> &str { &self.symptom_text }
    fn diagnosis(&self) -> &str { &self.diagnosis }
    fn confidence(&self) -> f64 { self.confidence }
    fn severity(&self) -> Severity { self.severity }
    fn treatment(&self) -> &str { &self.treatment }
    fn prevention(&self) -> &str { &self.prevention }
}

/// 診断結果の保存先
pub trait DiagnosisRecorder {
    fn record(&mut self, record: DiagnosisRecord) -> Result<()>;

    /// まとめて保存
    fn record_all(&mut self, records: Vec<DiagnosisRecord>) -> Result<()> {
        for record in records {
            self.record(record)?;
        }
        Ok(())
    }
}
