//! 一括診断モジュール
//!
//! JSON配列の問い合わせを並列に診断する。結果は入力順で返す。

use crate::error::{AgriAiError, Result};
use agri_ai_common::{diagnose, DiagnosisQuery, DiagnosisResult, KnowledgeStore};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// 一括診断の入力1件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    /// 作物区分（不明な値は other として扱う）
    #[serde(alias = "crop")]
    pub crop_type: String,

    #[serde(default, alias = "symptomText")]
    pub symptoms: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl BatchItem {
    pub fn query(&self) -> DiagnosisQuery {
        DiagnosisQuery::new(&self.crop_type, &self.symptoms)
    }
}

/// 一括診断の出力1件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub query: DiagnosisQuery,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,

    pub result: DiagnosisResult,
}

/// 入力JSONファイルを読み込み
pub fn load_batch(path: &Path) -> Result<Vec<BatchItem>> {
    if !path.exists() {
        return Err(AgriAiError::InvalidInput(format!(
            "入力ファイルが見つかりません: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let items: Vec<BatchItem> = serde_json::from_str(&content)?;
    Ok(items)
}

/// 並列に診断する
///
/// # Arguments
/// * `store` - ナレッジストア（複数スレッドから参照される）
/// * `items` - 入力
/// * `jobs` - 並列数（0 = rayonの既定値）
/// * `show_progress` - 進捗バーを表示
pub fn run_batch<S>(
    store: &S,
    items: &[BatchItem],
    jobs: usize,
    show_progress: bool,
) -> Result<Vec<BatchOutcome>>
where
    S: KnowledgeStore + Sync,
{
    let progress = if show_progress {
        let bar = ProgressBar::new(items.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let run = || {
        items
            .par_iter()
            .map(|item| -> Result<BatchOutcome> {
                let query = item.query();
                let result = diagnose(store, &query)?;
                progress.inc(1);
                Ok(BatchOutcome {
                    query,
                    image_ref: item.image_ref.clone(),
                    result,
                })
            })
            .collect::<Result<Vec<BatchOutcome>>>()
    };

    let outcomes = if jobs > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| AgriAiError::Config(format!("スレッドプール作成エラー: {}", e)))?;
        pool.install(run)
    } else {
        run()
    };

    progress.finish_and_clear();

    let outcomes = outcomes?;
    let identified = outcomes.iter().filter(|o| o.result.is_identified()).count();
    info!(total = outcomes.len(), identified, "batch diagnosis finished");

    Ok(outcomes)
}

/// 結果をJSONで保存
pub fn save_outcomes(outcomes: &[BatchOutcome], output: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(outcomes)?;
    std::fs::write(output, json)?;
    Ok(())
}
