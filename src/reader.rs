//! Reader Module
//!
//! calamineを使用したワークブック読み込みの境界層。
//! シート選択と、calamineのセル型から閉じたセルモデルへの変換を提供します。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::io::{Read, Seek};

use crate::error::TableScanError;
use crate::grid::SheetGrid;
use crate::types::CellValue;

/// シート選択方式
///
/// 解析対象のシートを選択する方法を指定します。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SheetSelector {
    /// すべてのシートを解析（デフォルト）
    All,

    /// インデックス指定（0始まり）
    Index(usize),

    /// シート名指定
    Name(String),

    /// 複数のインデックス指定
    Indices(Vec<usize>),

    /// 複数のシート名指定
    Names(Vec<String>),
}

/// ワークブックリーダー
///
/// calamineのラッパーとして、シート名の列挙・選択と
/// シート1枚分の稠密グリッド生成を提供します。
pub(crate) struct WorkbookReader<RS: Read + Seek> {
    workbook: Sheets<RS>,
}

// Cloneはcalamineの形式自動判別（open_workbook_auto_from_rs）が要求する
impl<RS: Read + Seek + Clone> WorkbookReader<RS> {
    /// ワークブックを開く
    ///
    /// # 引数
    ///
    /// * `reader` - ワークブックを読み込むためのリーダー（Read + Seekトレイトを実装）
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookReader)` - 読み込みに成功した場合
    /// * `Err(TableScanError::Parse)` - ワークブックとして解析できなかった場合
    pub fn open(reader: RS) -> Result<Self, TableScanError> {
        let workbook = open_workbook_auto_from_rs(reader).map_err(TableScanError::Parse)?;
        Ok(Self { workbook })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// シート選択方式に基づいてシートを選択
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<String>)` - 選択されたシート名のリスト（ワークブック内の順序）
    /// * `Err(TableScanError::Config)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheets(&self, selector: &SheetSelector) -> Result<Vec<String>, TableScanError> {
        let all_sheet_names = self.sheet_names();

        match selector {
            SheetSelector::All => Ok(all_sheet_names),

            SheetSelector::Index(index) => {
                if *index >= all_sheet_names.len() {
                    return Err(TableScanError::Config(format!(
                        "Sheet index {} is out of range (total: {})",
                        index,
                        all_sheet_names.len()
                    )));
                }
                Ok(vec![all_sheet_names[*index].clone()])
            }

            SheetSelector::Name(name) => {
                if !all_sheet_names.contains(name) {
                    return Err(TableScanError::Config(format!("Sheet '{}' not found", name)));
                }
                Ok(vec![name.clone()])
            }

            SheetSelector::Indices(indices) => {
                let mut result = Vec::new();
                for &index in indices {
                    if index >= all_sheet_names.len() {
                        return Err(TableScanError::Config(format!(
                            "Sheet index {} is out of range (total: {})",
                            index,
                            all_sheet_names.len()
                        )));
                    }
                    result.push(all_sheet_names[index].clone());
                }
                Ok(result)
            }

            SheetSelector::Names(names) => {
                for name in names {
                    if !all_sheet_names.contains(name) {
                        return Err(TableScanError::Config(format!(
                            "Sheet '{}' not found",
                            name
                        )));
                    }
                }
                Ok(names.clone())
            }
        }
    }

    /// シートを稠密グリッドとして読み込む
    ///
    /// ヘッダ行を仮定しない生のセルグリッドを返します。
    pub fn read_grid(&mut self, sheet_name: &str) -> Result<SheetGrid, TableScanError> {
        let range = self
            .workbook
            .worksheet_range(sheet_name)
            .map_err(TableScanError::Parse)?;
        Ok(grid_from_range(&range))
    }
}

/// calamineのRangeから稠密グリッドを構築
///
/// calamineのバウンディングボックスは最初の非空セルを起点とするため、
/// A1を原点とする座標系に合わせて先頭の空行・空列を補います。
/// これによりグリッドの行・列インデックスがシート上の実座標と一致します。
fn grid_from_range(range: &Range<Data>) -> SheetGrid {
    let Some((start_row, start_col)) = range.start() else {
        return SheetGrid::new(Vec::new());
    };
    let (row_offset, col_offset) = (start_row as usize, start_col as usize);

    let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(row_offset + range.height());
    for _ in 0..row_offset {
        rows.push(Vec::new());
    }
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; col_offset];
        cells.extend(row.iter().map(cell_value_from_data));
        rows.push(cells);
    }
    SheetGrid::new(rows)
}

/// calamineのセル型を閉じたセルモデルへ変換
///
/// 変換規則:
/// - 整数・浮動小数 → `Number`
/// - 文字列 → `Text`
/// - 論理値 → `Text("true" / "false")`
/// - 日付 → `Text`（ISO 8601形式）
/// - エラーセル（#DIV/0!など） → `Empty`（解析可能な値を持たないため）
fn cell_value_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::Text(naive.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => CellValue::Empty,
        },
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}
