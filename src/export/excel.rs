//! Excel生成（CLI版）
//!
//! 共通ライブラリのワークブック生成をファイルに書き出す

use crate::error::{AgriAiError, Result};
use crate::recorder::DiagnosisRecord;
use agri_ai_common::export::excel_core::generate_history_buffer;
use std::path::Path;

pub fn generate_excel(records: &[DiagnosisRecord], output_path: &Path, title: &str) -> Result<()> {
    let buffer = generate_history_buffer(records, title).map_err(AgriAiError::ExcelGeneration)?;
    std::fs::write(output_path, buffer)?;
    Ok(())
}
