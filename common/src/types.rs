//! 診断データの型定義
//!
//! CLIとライブラリ利用側で共有される型:
//! - CropType: 作物区分
//! - DiseaseRecord: ナレッジストアの病害レコード（読み取り専用）
//! - DiagnosisQuery: 1回の診断リクエスト
//! - DiagnosisResult: 診断結果（生成後は不変）

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// 作物区分
///
/// 逆シリアライズは `parse_or_other` を通すため、未知の値は `Other` になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    Maize,
    Beans,
    Vegetables,
    Cassava,
    Rice,
    Tobacco,
    Groundnuts,
    Soybean,
    Cotton,
    #[default]
    Other,
}

impl CropType {
    /// 全区分（表示順）
    pub const ALL: [CropType; 10] = [
        CropType::Maize,
        CropType::Beans,
        CropType::Vegetables,
        CropType::Cassava,
        CropType::Rice,
        CropType::Tobacco,
        CropType::Groundnuts,
        CropType::Soybean,
        CropType::Cotton,
        CropType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CropType::Maize => "maize",
            CropType::Beans => "beans",
            CropType::Vegetables => "vegetables",
            CropType::Cassava => "cassava",
            CropType::Rice => "rice",
            CropType::Tobacco => "tobacco",
            CropType::Groundnuts => "groundnuts",
            CropType::Soybean => "soybean",
            CropType::Cotton => "cotton",
            CropType::Other => "other",
        }
    }

    /// 入力文字列を作物区分に変換（不明な値は `Other`）
    pub fn parse_or_other(value: &str) -> Self {
        value.parse().unwrap_or(CropType::Other)
    }
}

impl FromStr for CropType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        CropType::ALL
            .iter()
            .copied()
            .find(|crop| crop.as_str() == normalized)
            .ok_or_else(|| format!("Unknown crop type: {}", s))
    }
}

impl<'de> Deserialize<'de> for CropType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(CropType::parse_or_other(&value))
    }
}

impl fmt::Display for CropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 重症度
///
/// `Critical` は保存済みレコードとの互換用で、マッチャーは生成しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
            Severity::Critical => "critical",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mild" => Ok(Severity::Mild),
            "moderate" => Ok(Severity::Moderate),
            "severe" => Ok(Severity::Severe),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("Unknown severity: {}. Use mild, moderate, severe or critical", s)),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 病害レコード（ナレッジストアから読み込み）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseRecord {
    #[serde(alias = "crop_type")]
    pub crop_type: CropType,

    #[serde(alias = "disease_name")]
    pub disease_name: String,

    /// 典型的な症状フレーズ（空のレコードは照合対象外）
    #[serde(default)]
    pub symptoms: Vec<String>,

    pub treatment: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevention: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub causes: Option<String>,

    /// スキーマ互換用。スコア計算では参照しない
    #[serde(default, alias = "confidence_threshold", skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f64>,
}

impl DiseaseRecord {
    pub fn new(crop_type: CropType, disease_name: &str, symptoms: &[&str], treatment: &str) -> Self {
        Self {
            crop_type,
            disease_name: disease_name.to_string(),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            treatment: treatment.to_string(),
            prevention: None,
            causes: None,
            confidence_threshold: None,
        }
    }

    pub fn with_prevention(mut self, prevention: &str) -> Self {
        self.prevention = Some(prevention.to_string());
        self
    }

    /// 症状フレーズを1件以上持つか
    pub fn is_matchable(&self) -> bool {
        !self.symptoms.is_empty()
    }

    /// 症状フレーズを空白で連結した照合用テキスト
    pub fn symptom_text(&self) -> String {
        self.symptoms.join(" ")
    }
}

/// 診断リクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisQuery {
    pub crop_type: CropType,
    #[serde(default)]
    pub symptom_text: String,
}

impl DiagnosisQuery {
    /// 生の作物区分文字列から生成（不明な区分は `Other` に寄せる）
    pub fn new(crop_type: &str, symptom_text: &str) -> Self {
        Self {
            crop_type: CropType::parse_or_other(crop_type),
            symptom_text: symptom_text.to_string(),
        }
    }

    pub fn for_crop(crop_type: CropType, symptom_text: &str) -> Self {
        Self {
            crop_type,
            symptom_text: symptom_text.to_string(),
        }
    }
}

/// 診断結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    /// 一致した病害名（未特定なら None）
    #[serde(default)]
    pub disease_name: Option<String>,
    pub diagnosis: String,
    pub confidence: f64,
    pub severity: Severity,
    pub treatment: String,
    pub prevention: String,
}

impl DiagnosisResult {
    /// 病害レコードに一致したか
    pub fn is_identified(&self) -> bool {
        self.disease_name.is_some()
    }

    /// 表示用の病害名
    pub fn display_name(&self) -> &str {
        self.disease_name.as_deref().unwrap_or("unidentified")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_type_parse() {
        assert_eq!("maize".parse::<CropType>(), Ok(CropType::Maize));
        assert_eq!(" Groundnuts ".parse::<CropType>(), Ok(CropType::Groundnuts));
        assert!("wheat".parse::<CropType>().is_err());
    }

    #[test]
    fn test_crop_type_parse_or_other() {
        assert_eq!(CropType::parse_or_other("RICE"), CropType::Rice);
        assert_eq!(CropType::parse_or_other("unknown_value"), CropType::Other);
        assert_eq!(CropType::parse_or_other(""), CropType::Other);
    }

    #[test]
    fn test_crop_type_serde_lowercase() {
        let json = serde_json::to_string(&CropType::Soybean).unwrap();
        assert_eq!(json, "\"soybean\"");
        let crop: CropType = serde_json::from_str("\"cotton\"").unwrap();
        assert_eq!(crop, CropType::Cotton);
        let crop: CropType = serde_json::from_str("\" Maize \"").unwrap();
        assert_eq!(crop, CropType::Maize);
    }

    #[test]
    fn test_crop_type_deserialize_unknown_is_other() {
        let crop: CropType = serde_json::from_str("\"wheat\"").unwrap();
        assert_eq!(crop, CropType::Other);
        assert!(serde_json::from_str::<CropType>("42").is_err());
    }

    #[test]
    fn test_query_deserialize_unknown_crop() {
        let query: DiagnosisQuery =
            serde_json::from_str(r#"{"cropType": "unknown_value", "symptomText": "scorched leaf edges"}"#).unwrap();
        assert_eq!(query.crop_type, CropType::Other);
        assert_eq!(query.symptom_text, "scorched leaf edges");
    }

    #[test]
    fn test_severity_roundtrip_names() {
        for severity in [Severity::Mild, Severity::Moderate, Severity::Severe, Severity::Critical] {
            assert_eq!(severity.as_str().parse::<Severity>(), Ok(severity));
        }
        assert!("extreme".parse::<Severity>().is_err());
    }

    #[test]
    fn test_disease_record_snake_case_aliases() {
        let json = r#"{
            "crop_type": "maize",
            "disease_name": "Gray Leaf Spot",
            "symptoms": ["rectangular gray lesions"],
            "treatment": "Apply fungicide",
            "confidence_threshold": 0.7
        }"#;
        let record: DiseaseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.crop_type, CropType::Maize);
        assert_eq!(record.disease_name, "Gray Leaf Spot");
        assert_eq!(record.confidence_threshold, Some(0.7));
        assert!(record.prevention.is_none());
    }

    #[test]
    fn test_disease_record_symptom_text() {
        let record = DiseaseRecord::new(
            CropType::Beans,
            "Bean Rust",
            &["rusty pustules", "yellow halo"],
            "Spray fungicide",
        );
        assert!(record.is_matchable());
        assert_eq!(record.symptom_text(), "rusty pustules yellow halo");

        let empty = DiseaseRecord::new(CropType::Beans, "Empty", &[], "-");
        assert!(!empty.is_matchable());
    }

    #[test]
    fn test_diagnosis_query_maps_unknown_crop() {
        let query = DiagnosisQuery::new("unknown_value", "dry leaves");
        assert_eq!(query.crop_type, CropType::Other);
        assert_eq!(query.symptom_text, "dry leaves");
    }
}
