//! 症状マッチャー
//!
//! 作物区分と自由記述の症状テキストから、ナレッジストアの病害レコードを採点し、
//! 最もスコアの高いレコードで診断結果を組み立てる。
//!
//! ## 処理フロー
//! 1. 作物区分のレコードを取得（0件なら固定のフォールバック）
//! 2. レコードごとに類似度 + フレーズ一致ボーナス + 重篤語ボーナスで採点
//! 3. 最高スコアが採用下限を超えれば診断、超えなければ「未特定」

use crate::error::FetchError;
use crate::similarity::text_similarity;
use crate::store::KnowledgeStore;
use crate::types::{CropType, DiagnosisQuery, DiagnosisResult, DiseaseRecord, Severity};
use tracing::{debug, warn};

/// 採用下限（これを超えたスコアのみ診断として採用）
pub const ACCEPTANCE_FLOOR: f64 = 0.4;
/// フォールバック時の信頼度
pub const FALLBACK_CONFIDENCE: f64 = 0.3;
/// 症状フレーズ一致ボーナスの最大値
pub const PHRASE_BOOST_WEIGHT: f64 = 0.4;
/// 重篤語を含む場合の加算
pub const CRITICAL_TERM_BOOST: f64 = 0.1;

/// 重篤さを示す語
pub const CRITICAL_TERMS: &[&str] = &["dying", "dead", "severe", "widespread", "wilting badly"];

const SEVERE_TERMS: &[&str] = &["severe", "dying"];
const MODERATE_TERMS: &[&str] = &["spreading", "wilting"];
const SEVERE_SCORE: f64 = 0.8;
const MODERATE_SCORE: f64 = 0.6;

const DEFAULT_PREVENTION: &str = "Regular monitoring and good agricultural practices recommended.";

/// 1レコード分の採点結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordScore {
    /// 3指標の加重和（ボーナス前）
    pub similarity: f64,
    /// フレーズ一致ボーナス
    pub phrase_boost: f64,
    /// 重篤語ボーナス
    pub critical_boost: f64,
    /// ボーナス加算後、0.0〜1.0に丸めた値
    pub confidence: f64,
}

/// 最高スコアのレコード
#[derive(Debug, Clone, Copy)]
pub struct BestMatch<'a> {
    pub record: &'a DiseaseRecord,
    pub score: RecordScore,
}

/// 症状フレーズ一致ボーナス
///
/// テキストに部分一致したフレーズの割合 × 0.4。空白のみのフレーズは一致扱いしない。
pub fn phrase_boost(record: &DiseaseRecord, symptom_text: &str) -> f64 {
    if record.symptoms.is_empty() {
        return 0.0;
    }

    let text = symptom_text.to_lowercase();
    let matched = record
        .symptoms
        .iter()
        .filter(|phrase| {
            let phrase = phrase.trim().to_lowercase();
            !phrase.is_empty() && text.contains(&phrase)
        })
        .count();

    matched as f64 / record.symptoms.len() as f64 * PHRASE_BOOST_WEIGHT
}

/// 重篤語を含むか
pub fn has_critical_terms(symptom_text: &str) -> bool {
    contains_any(&symptom_text.to_lowercase(), CRITICAL_TERMS)
}

fn contains_any(text_lower: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| text_lower.contains(term))
}

/// 1レコードを採点（症状フレーズが無いレコードは None）
pub fn score_record(record: &DiseaseRecord, symptom_text: &str) -> Option<RecordScore> {
    if !record.is_matchable() {
        return None;
    }

    let similarity = text_similarity(&symptom_text.to_lowercase(), &record.symptom_text().to_lowercase());
    let phrase_boost = phrase_boost(record, symptom_text);
    let critical_boost = if has_critical_terms(symptom_text) {
        CRITICAL_TERM_BOOST
    } else {
        0.0
    };
    let confidence = (similarity + phrase_boost + critical_boost).clamp(0.0, 1.0);

    Some(RecordScore {
        similarity,
        phrase_boost,
        critical_boost,
        confidence,
    })
}

/// 最高スコアのレコードを選ぶ
///
/// 厳密に大きい場合のみ更新するため、同点は先に現れたレコードが残る。
/// スコア0のレコードは選ばれない。
pub fn select_best_match<'a>(records: &'a [DiseaseRecord], symptom_text: &str) -> Option<BestMatch<'a>> {
    let mut best: Option<BestMatch<'a>> = None;

    for record in records {
        let Some(score) = score_record(record, symptom_text) else {
            warn!(disease = %record.disease_name, "skipping record without symptom phrases");
            continue;
        };

        debug!(
            disease = %record.disease_name,
            similarity = score.similarity,
            confidence = score.confidence,
            "scored record"
        );

        let current = best.map(|b| b.score.confidence).unwrap_or(0.0);
        if score.confidence > current {
            best = Some(BestMatch { record, score });
        }
    }

    best
}

/// 重症度を判定
///
/// `graded_score` は選ばれたレコードのボーナス前類似度（未選択なら0.0）。
/// テキスト中の語による判定はスコアより優先度が高い方から評価する。
pub fn derive_severity(symptom_text: &str, graded_score: f64) -> Severity {
    let text = symptom_text.to_lowercase();

    if graded_score > SEVERE_SCORE || contains_any(&text, SEVERE_TERMS) {
        Severity::Severe
    } else if graded_score > MODERATE_SCORE || contains_any(&text, MODERATE_TERMS) {
        Severity::Moderate
    } else {
        Severity::Mild
    }
}

/// ナレッジストアを参照して診断する
///
/// ストアの読み込み失敗のみエラーとして返す。空テキスト・0件・下限未満は
/// すべてフォールバック結果になる。
pub fn diagnose<S: KnowledgeStore + ?Sized>(
    store: &S,
    query: &DiagnosisQuery,
) -> Result<DiagnosisResult, FetchError> {
    let records = store.fetch_disease_records(query.crop_type)?;
    Ok(diagnose_records(query, &records))
}

/// 取得済みレコードに対して診断する（I/Oなし）
pub fn diagnose_records(query: &DiagnosisQuery, records: &[DiseaseRecord]) -> DiagnosisResult {
    if records.is_empty() {
        debug!(crop = %query.crop_type, "no knowledge records for crop");
        return no_knowledge_result(query.crop_type);
    }

    let best = select_best_match(records, &query.symptom_text);

    match best {
        Some(best) if best.score.confidence > ACCEPTANCE_FLOOR => {
            let severity = derive_severity(&query.symptom_text, best.score.similarity);
            identified_result(best, severity)
        }
        _ => {
            let best_confidence = best.map(|b| b.score.confidence).unwrap_or(0.0);
            let graded = best.map(|b| b.score.similarity).unwrap_or(0.0);
            let severity = derive_severity(&query.symptom_text, graded);
            unidentified_result(query.crop_type, best_confidence.max(FALLBACK_CONFIDENCE), severity)
        }
    }
}

fn identified_result(best: BestMatch<'_>, severity: Severity) -> DiagnosisResult {
    let record = best.record;
    let percent = (best.score.similarity * 100.0).round() as i64;

    DiagnosisResult {
        disease_name: Some(record.disease_name.clone()),
        diagnosis: format!(
            "{} - Symptom pattern analysis suggests this condition (similarity: {}%).",
            record.disease_name, percent
        ),
        confidence: best.score.confidence,
        severity,
        treatment: record.treatment.clone(),
        prevention: record
            .prevention
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PREVENTION.to_string()),
    }
}

fn unidentified_result(crop_type: CropType, confidence: f64, severity: Severity) -> DiagnosisResult {
    DiagnosisResult {
        disease_name: None,
        diagnosis: format!(
            "Unidentified condition requiring expert consultation. Analysis detected some patterns but needs more specific symptom information for {}.",
            crop_type
        ),
        confidence,
        severity,
        treatment: "Recommend consulting with a local agricultural extension officer. Monitor plant closely and document symptom progression.".to_string(),
        prevention: "Implement integrated pest management, ensure proper nutrition, and maintain good field hygiene.".to_string(),
    }
}

fn no_knowledge_result(crop_type: CropType) -> DiagnosisResult {
    DiagnosisResult {
        disease_name: None,
        diagnosis: format!(
            "No specific knowledge available for {}. Please consult with a local agricultural expert.",
            crop_type
        ),
        confidence: FALLBACK_CONFIDENCE,
        severity: Severity::Moderate,
        treatment: "Monitor the crop closely and document symptom progression.".to_string(),
        prevention: "Implement good agricultural practices and regular monitoring.".to_string(),
    }
}
