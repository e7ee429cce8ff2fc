//! 診断結果の表示

use crate::recorder::DiagnosisRecord;
use agri_ai_common::{DiagnosisQuery, DiagnosisResult, Severity};

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Mild => "🟢",
        Severity::Moderate => "🟡",
        Severity::Severe => "🟠",
        Severity::Critical => "🔴",
    }
}

/// 診断結果を表示
pub fn print_result(query: &DiagnosisQuery, result: &DiagnosisResult) {
    let marker = if result.is_identified() { "✔" } else { "⚠" };
    println!("{} {}", marker, result.diagnosis);
    println!("  作物: {}", query.crop_type);
    println!("  信頼度: {:.0}%", result.confidence * 100.0);
    println!("  重症度: {} {}", severity_icon(result.severity), result.severity);
    println!("  対処: {}", result.treatment);
    println!("  予防: {}", result.prevention);
}

/// 履歴1件を1行で表示
pub fn print_record_line(record: &DiagnosisRecord) {
    println!(
        "{}  {}  {:<10} {:<28} {:>4.0}%  {}",
        record.id,
        record.created_at.format("%Y-%m-%d %H:%M"),
        record.crop_type.as_str(),
        record.disease_name.as_deref().unwrap_or("unidentified"),
        record.confidence * 100.0,
        record.severity,
    );
}
