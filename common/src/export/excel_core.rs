//! Excel生成（共通ライブラリ）
//!
//! 診断履歴を1シートの表形式で出力する

use crate::types::Severity;
use rust_xlsxwriter::*;

/// 列定義（見出し, 列幅）
const COLUMNS: &[(&str, f64)] = &[
    ("Date", 20.0),
    ("Crop", 12.0),
    ("Symptoms", 40.0),
    ("Diagnosis", 45.0),
    ("Confidence", 12.0),
    ("Severity", 11.0),
    ("Treatment", 45.0),
    ("Prevention", 45.0),
];

const SHEET_NAME: &str = "Diagnoses";

/// 診断履歴1行分のデータ（異なる履歴レコード型に対応）
pub trait DiagnosisRow {
    fn recorded_at(&self) -> String;
    fn crop_type(&self) -> &str;
    fn symptom_text(&self) -> &str;
    fn diagnosis(&self) -> &str;
    fn confidence(&self) -> f64;
    fn severity(&self) -> Severity;
    fn treatment(&self) -> &str;
    fn prevention(&self) -> &str;
}

/// 重症度ごとの背景色
fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Mild => Color::RGB(0xE2F0D9),
        Severity::Moderate => Color::RGB(0xFFF2CC),
        Severity::Severe => Color::RGB(0xF8CBAD),
        Severity::Critical => Color::RGB(0xFF9999),
    }
}

fn text_value(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

/// Excelをバッファに生成
///
/// # Arguments
/// * `rows` - 診断履歴（DiagnosisRowトレイトを実装した型）
/// * `title` - ワークブックのタイトル（ドキュメントプロパティ）
pub fn generate_history_buffer<T>(rows: &[T], title: &str) -> Result<Vec<u8>, String>
where
    T: DiagnosisRow,
{
    let mut workbook = Workbook::new();
    let properties = DocProperties::new().set_title(title);
    workbook.set_properties(&properties);

    // フォーマット定義
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x3A7D44))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);

    let text_format = Format::new()
        .set_align(FormatAlign::Top)
        .set_text_wrap()
        .set_border(FormatBorder::Hair);

    let percent_format = Format::new()
        .set_num_format("0%")
        .set_align(FormatAlign::Top)
        .set_border(FormatBorder::Hair);

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    // 見出し行
    for (col, (label, width)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet
            .set_column_width(col, *width)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
        worksheet
            .write_string_with_format(0, col, *label, &header_format)
            .map_err(|e| format!("見出し書き込みエラー: {}", e))?;
    }

    for (index, row) in rows.iter().enumerate() {
        let r = index as u32 + 1;
        let severity_format = text_format
            .clone()
            .set_background_color(severity_color(row.severity()));

        let text_cells = [
            (0u16, row.recorded_at()),
            (1, row.crop_type().to_string()),
            (2, text_value(row.symptom_text()).to_string()),
            (3, row.diagnosis().to_string()),
            (6, row.treatment().to_string()),
            (7, row.prevention().to_string()),
        ];
        for (col, value) in text_cells.iter() {
            worksheet
                .write_string_with_format(r, *col, value.as_str(), &text_format)
                .map_err(|e| format!("値書き込みエラー: {}", e))?;
        }

        worksheet
            .write_number_with_format(r, 4, row.confidence(), &percent_format)
            .map_err(|e| format!("信頼度書き込みエラー: {}", e))?;
        worksheet
            .write_string_with_format(r, 5, row.severity().as_str(), &severity_format)
            .map_err(|e| format!("重症度書き込みエラー: {}", e))?;
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;

    if !rows.is_empty() {
        worksheet
            .autofilter(0, 0, rows.len() as u32, (COLUMNS.len() - 1) as u16)
            .map_err(|e| format!("フィルタ設定エラー: {}", e))?;
    }

    // バッファに書き出し
    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        severity: Severity,
    }

    impl DiagnosisRow for Row {
        fn recorded_at(&self) -> String { "2026-10-19 08:00".to_string() }
        fn crop_type(&self) -> &str { "maize" }
        fn symptom_text(&self) -> &str { "" }
        fn diagnosis(&self) -> &str { "Northern Leaf Blight" }
        fn confidence(&self) -> f64 { 0.82 }
        fn severity(&self) -> Severity { self.severity }
        fn treatment(&self) -> &str { "Fungicide" }
        fn prevention(&self) -> &str { "Rotation" }
    }

    #[test]
    fn test_generate_history_buffer_is_xlsx() {
        let rows = vec![
            Row { severity: Severity::Mild },
            Row { severity: Severity::Severe },
        ];
        let buffer = generate_history_buffer(&rows, "Diagnosis history").unwrap();
        // xlsxはZIP形式
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn test_generate_history_buffer_empty() {
        let rows: Vec<Row> = Vec::new();
        let buffer = generate_history_buffer(&rows, "Empty").unwrap();
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_text_value_placeholder() {
        assert_eq!(text_value(""), "-");
        assert_eq!(text_value("wilting"), "wilting");
    }
}
