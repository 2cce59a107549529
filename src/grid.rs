//! Grid Module
//!
//! シートを稠密な2次元グリッドとして表現するモジュール。
//! すべての行は同じ列数を持ちます（不揃いな行は空セルでパディング）。

use crate::types::CellValue;

/// シート1枚分の稠密グリッド
#[derive(Debug, Clone)]
pub(crate) struct SheetGrid {
    /// グリッドデータ（行 × 列）
    cells: Vec<Vec<CellValue>>,

    /// 列数
    cols: usize,
}

impl SheetGrid {
    /// 行データからグリッドを構築
    ///
    /// 行ごとの列数が不揃いな場合、最大列数に合わせて`CellValue::Empty`で
    /// パディングします。
    pub fn new(mut rows: Vec<Vec<CellValue>>) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(cols, CellValue::Empty);
        }
        Self { cells: rows, cols }
    }

    /// 行数を取得
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    /// 列数を取得
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// 指定された行を取得
    pub fn row(&self, row_idx: usize) -> &[CellValue] {
        &self.cells[row_idx]
    }

    /// 指定されたセルを取得
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        &self.cells[row][col]
    }

    /// 行全体がブランクかどうかを判定（各セルが欠損または空文字列）
    pub fn is_blank_row(&self, row_idx: usize) -> bool {
        self.cells[row_idx].iter().all(CellValue::is_blank)
    }
}
