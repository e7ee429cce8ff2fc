pub mod excel;

use crate::error::{AgriAiError, Result};
use crate::recorder::DiagnosisRecord;
use std::path::{Path, PathBuf};

/// 出力形式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Excel,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "xlsx",
            ExportFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("Unknown format: {}. Use excel or json", s)),
        }
    }
}

/// 出力先パス（ディレクトリ指定ならファイル名を補う）
pub fn output_path_for_format(output: &Path, title: &str, format: ExportFormat) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, format.extension()))
    } else {
        output.to_path_buf()
    }
}

/// 診断履歴をエクスポート
pub fn export_history(
    records: &[DiagnosisRecord],
    format: ExportFormat,
    output: &Path,
    title: &str,
) -> Result<PathBuf> {
    if records.is_empty() {
        return Err(AgriAiError::History("エクスポートする診断履歴がありません".into()));
    }

    let output_path = output_path_for_format(output, title, format);
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    match format {
        ExportFormat::Excel => excel::generate_excel(records, &output_path, title)?,
        ExportFormat::Json => {
            let json = serde_json::to_string_pretty(records)?;
            std::fs::write(&output_path, json)?;
        }
    }

    Ok(output_path)
}
