//! Preview Module
//!
//! テーブルの固定サイズプレビュー（ヘッダ行 + 先頭データ2行）を生成する
//! モジュール。決定的で副作用はありません。

use crate::types::CellValue;

/// プレビューに含めるデータ行数
const PREVIEW_ROWS: usize = 2;

/// プレビューのセルごとの最大文字数
const PREVIEW_CELL_CHARS: usize = 50;

/// テーブルのプレビュー文字列を生成
///
/// 1行目は`"HEADERS: "`に続く`" | "`区切りのヘッダ、以降は最大2行の
/// `"Row N: "`形式のデータ行。各セルは50文字に切り詰められます
/// （文字単位。コードポイントの途中で切断されることはありません）。
pub(crate) fn render_preview(headers: &[String], rows: &[Vec<CellValue>]) -> String {
    let mut lines = Vec::with_capacity(1 + PREVIEW_ROWS);
    lines.push(format!("HEADERS: {}", headers.join(" | ")));

    for (idx, row) in rows.iter().take(PREVIEW_ROWS).enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(|value| truncate_cell(&value.to_text()))
            .collect();
        lines.push(format!("Row {}: {}", idx + 1, cells.join(" | ")));
    }

    lines.join("\n")
}

/// セル文字列を最大文字数に切り詰める
fn truncate_cell(text: &str) -> String {
    text.chars().take(PREVIEW_CELL_CHARS).collect()
}
