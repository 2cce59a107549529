//! Extract Module
//!
//! 受理されたテーブル領域を不変のテーブルレコードへ実体化するモジュール。

use crate::detect::TrimmedRegion;
use crate::types::{CellCoord, CellRange, CellValue};

/// 検出された1つのテーブル
///
/// 抽出後は不変です。エクスポート先のパスはテーブル自身には保持せず、
/// 集約時に`ExportRecord`として結合されます。
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Table {
    /// テーブル識別子（シート内で1始まりの連番、`table_N`形式）
    pub table_id: String,

    /// シート名
    pub sheet_name: String,

    /// バウンディングボックス（A1形式、例: "B2:D9"）
    pub location: String,

    /// ヘッダ行（文字列へ強制変換済み。重複するヘッダ名もそのまま保持）
    pub headers: Vec<String>,

    /// データ行（ヘッダ行を除く）
    pub rows: Vec<Vec<CellValue>>,

    /// データ行数
    pub row_count: usize,

    /// 列数
    pub column_count: usize,
}

/// トリム済み領域からテーブルレコードを構築
///
/// # 引数
///
/// * `sheet_name` - シート名
/// * `index` - シート内のテーブル連番（1始まり、受理されたテーブルのみ加算）
/// * `trimmed` - 受理されたトリム済み領域
///
/// # 備考
///
/// バウンディングボックスはトリム前の生領域から描画されます。
/// ヘッダと行数はトリム後のサブグリッドに基づきます。
pub(crate) fn extract_table(sheet_name: &str, index: usize, trimmed: &TrimmedRegion) -> Table {
    let region = trimmed.region;

    let location = CellRange::new(
        CellCoord::new(region.header_row, region.col_start),
        CellCoord::new(region.data_end - 1, region.col_end),
    )
    .to_a1_range();

    let headers: Vec<String> = trimmed.cells[0].iter().map(CellValue::to_text).collect();
    let rows: Vec<Vec<CellValue>> = trimmed.cells[1..].to_vec();
    let row_count = rows.len();
    let column_count = headers.len();

    Table {
        table_id: format!("table_{}", index),
        sheet_name: sheet_name.to_string(),
        location,
        headers,
        rows,
        row_count,
        column_count,
    }
}
