//! Detection Module
//!
//! テーブル境界検出の中核モジュール。
//! ヘッダ行候補の検出と、候補ごとの縦・横の範囲確定、エッジトリムを行います。
//! スキーマを前提としないヒューリスティックであり、形式文法によるパーサーでは
//! ありません。

use crate::grid::SheetGrid;
use crate::types::CellValue;

/// ヘッダ候補と判定するテキスト密度のしきい値（この値を超えた場合のみ候補）
const HEADER_TEXT_RATIO: f64 = 0.5;

/// テーブル終端とみなす連続ブランク行数
///
/// ブランク行1行は表内の区切り（小計行など）として許容し、
/// 2行連続した時点でテーブル終端と判定します。
const BLANK_RUN_LIMIT: usize = 2;

/// ヘッダ行候補
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct HeaderCandidate {
    /// 行インデックス（0始まり）
    pub row: usize,

    /// テキスト密度スコア（非欠損セルに占める非空テキストセルの割合）
    pub score: f64,
}

/// トリム前の生テーブル領域
///
/// 行は `[header_row, data_end)`（終端排他）、列は `[col_start, col_end]`
/// （両端包含）。バウンディングボックス表記はこの生領域から描画されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TableRegion {
    /// ヘッダ行インデックス（領域の先頭行、包含）
    pub header_row: usize,

    /// データ終端行インデックス（排他）
    pub data_end: usize,

    /// 非空列の最小インデックス（包含）
    pub col_start: usize,

    /// 非空列の最大インデックス（包含）
    pub col_end: usize,
}

/// 受理されたテーブル領域（トリム済みサブグリッド付き）
#[derive(Debug, Clone)]
pub(crate) struct TrimmedRegion {
    /// 生領域（バウンディングボックス表記用）
    pub region: TableRegion,

    /// トリム済みサブグリッド（先頭行がヘッダ行）
    pub cells: Vec<Vec<CellValue>>,
}

/// グリッドからヘッダ行候補を検出
///
/// 各行について、`text_count` = 非欠損かつテキストかつトリム後非空のセル数、
/// `non_null` = 非欠損セル数を算出し、`non_null > 0` かつ
/// `text_count / non_null > 0.5`（厳密な大なり）の行を候補とします。
/// 全欠損行は候補になりません（ゼロ除算の回避）。
///
/// # 戻り値
///
/// 行インデックス昇順の候補リスト。副作用なし。
pub(crate) fn detect_header_candidates(grid: &SheetGrid) -> Vec<HeaderCandidate> {
    let mut candidates = Vec::new();

    for row_idx in 0..grid.rows() {
        let mut text_count = 0usize;
        let mut non_null = 0usize;

        for cell in grid.row(row_idx) {
            if cell.is_missing() {
                continue;
            }
            non_null += 1;
            if let CellValue::Text(s) = cell {
                if !s.trim().is_empty() {
                    text_count += 1;
                }
            }
        }

        if non_null == 0 {
            continue;
        }

        let score = text_count as f64 / non_null as f64;
        if score > HEADER_TEXT_RATIO {
            candidates.push(HeaderCandidate { row: row_idx, score });
        }
    }

    candidates
}

/// ヘッダ候補ごとにテーブル領域を確定し、受理された領域を検出順に返す
///
/// 候補は互いに独立に処理されます。前のテーブルの範囲内にある候補も
/// 自身の領域を生成します（重複領域は意図された動作）。
///
/// # 処理手順
///
/// 1. 縦範囲: `header_row + 1` から前方走査し、連続ブランク行カウンタが
///    2に達した行で `data_end = 行インデックス - ブランク行数`。
///    非ブランク行でカウンタをリセット。ブランク連続が発生しなければ
///    `data_end` はグリッド行数。
/// 2. 横範囲: `[header_row, data_end)` 内に非欠損セルを1つでも持つ列の
///    最小・最大インデックス。該当列がない、または `data_end` がデータ開始
///    以前なら候補を破棄。
/// 3. トリム: 境界確定済みサブグリッドから、全欠損の先頭・末尾行および
///    先頭・末尾列を除去。2行未満（ヘッダ + データ1行に満たない）または
///    0列になった候補は破棄。
pub(crate) fn scan_table_regions(
    grid: &SheetGrid,
    candidates: &[HeaderCandidate],
) -> Vec<TrimmedRegion> {
    let mut accepted = Vec::new();

    for candidate in candidates {
        let header_row = candidate.row;
        let data_start = header_row + 1;

        // 1. 縦範囲の確定（ブランク連続によるデータ終端検出）
        let mut data_end = grid.rows();
        let mut blank_run = 0usize;
        for row_idx in data_start..grid.rows() {
            if grid.is_blank_row(row_idx) {
                blank_run += 1;
                if blank_run >= BLANK_RUN_LIMIT {
                    data_end = row_idx - blank_run;
                    break;
                }
            } else {
                blank_run = 0;
            }
        }

        if data_end <= data_start {
            continue;
        }

        // 2. 横範囲の確定（行範囲内に非欠損セルを持つ列の最小〜最大）
        let mut col_start = None;
        let mut col_end = 0usize;
        for col in 0..grid.cols() {
            let non_empty = (header_row..data_end).any(|row| !grid.cell(row, col).is_missing());
            if non_empty {
                if col_start.is_none() {
                    col_start = Some(col);
                }
                col_end = col;
            }
        }
        let Some(col_start) = col_start else {
            continue;
        };

        // 3. サブグリッドの切り出しとエッジトリム
        let sub_grid: Vec<Vec<CellValue>> = (header_row..data_end)
            .map(|row| grid.row(row)[col_start..=col_end].to_vec())
            .collect();
        let Some(cells) = trim_edges(sub_grid) else {
            continue;
        };

        // ヘッダ行 + データ1行以上が残らなければ破棄
        if cells.len() < 2 {
            continue;
        }

        accepted.push(TrimmedRegion {
            region: TableRegion {
                header_row,
                data_end,
                col_start,
                col_end,
            },
            cells,
        });
    }

    accepted
}

/// サブグリッドの先頭・末尾から全欠損の行と列を除去
///
/// 内部のブランク行・列は保持されます。全セルが除去された場合は`None`。
fn trim_edges(mut cells: Vec<Vec<CellValue>>) -> Option<Vec<Vec<CellValue>>> {
    let row_is_empty = |row: &[CellValue]| row.iter().all(CellValue::is_missing);

    while cells.first().is_some_and(|row| row_is_empty(row)) {
        cells.remove(0);
    }
    while cells.last().is_some_and(|row| row_is_empty(row)) {
        cells.pop();
    }
    if cells.is_empty() {
        return None;
    }

    let cols = cells[0].len();
    let col_is_empty = |col: usize| cells.iter().all(|row| row[col].is_missing());

    let mut start = 0usize;
    let mut end = cols;
    while start < end && col_is_empty(start) {
        start += 1;
    }
    while end > start && col_is_empty(end - 1) {
        end -= 1;
    }
    if start == end {
        return None;
    }

    if start > 0 || end < cols {
        for row in &mut cells {
            *row = row[start..end].to_vec();
        }
    }

    Some(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SheetGrid;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    fn empty_row(width: usize) -> Vec<CellValue> {
        vec![CellValue::Empty; width]
    }

    // ヘッダ検出のテスト

    #[test]
    fn test_header_candidate_all_text_row() {
        let grid = SheetGrid::new(vec![
            vec![text("Name"), text("Age"), text("City")],
            vec![text("Alice"), num(30.0), text("Paris")],
        ]);

        let candidates = detect_header_candidates(&grid);
        let rows: Vec<usize> = candidates.iter().map(|c| c.row).collect();
        // 1行目は2/3がテキストなので候補、0行目は3/3
        assert_eq!(rows, vec![0, 1]);
        assert_eq!(candidates[0].score, 1.0);
    }

    #[test]
    fn test_header_ratio_boundary_is_strict() {
        // 2/4 = ちょうど50%は候補ではない
        let grid = SheetGrid::new(vec![vec![
            text("a"),
            text("b"),
            num(1.0),
            num(2.0),
        ]]);
        assert!(detect_header_candidates(&grid).is_empty());

        // 3/4 = 75%は候補
        let grid = SheetGrid::new(vec![vec![text("a"), text("b"), text("c"), num(1.0)]]);
        assert_eq!(detect_header_candidates(&grid).len(), 1);
    }

    #[test]
    fn test_header_all_missing_row_never_qualifies() {
        let grid = SheetGrid::new(vec![empty_row(3)]);
        assert!(detect_header_candidates(&grid).is_empty());
    }

    #[test]
    fn test_header_whitespace_text_not_counted() {
        // 空白のみのテキストはtext_countに含まれない（1/2 = 50%で不合格）
        let grid = SheetGrid::new(vec![vec![text("  "), text("Name"), CellValue::Empty]]);
        assert!(detect_header_candidates(&grid).is_empty());
    }

    #[test]
    fn test_header_ignores_missing_cells_in_ratio() {
        // 非欠損2セル中2セルがテキスト → 100%
        let grid = SheetGrid::new(vec![vec![
            CellValue::Empty,
            text("Name"),
            text("City"),
            CellValue::Empty,
        ]]);
        let candidates = detect_header_candidates(&grid);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].score, 1.0);
    }

    // 境界スキャンのテスト

    fn simple_table_grid() -> SheetGrid {
        SheetGrid::new(vec![
            vec![text("Name"), text("Score")],
            vec![text("Alice"), num(10.0)],
            vec![text("Bob"), num(20.0)],
        ])
    }

    #[test]
    fn test_scan_table_to_grid_end() {
        let grid = simple_table_grid();
        let candidates = detect_header_candidates(&grid);
        let regions = scan_table_regions(&grid, &candidates);

        assert!(!regions.is_empty());
        let first = &regions[0];
        assert_eq!(first.region.header_row, 0);
        assert_eq!(first.region.data_end, 3);
        assert_eq!(first.region.col_start, 0);
        assert_eq!(first.region.col_end, 1);
        assert_eq!(first.cells.len(), 3);
    }

    #[test]
    fn test_single_blank_row_is_tolerated() {
        // 1行のブランクはテーブル内の区切りとして許容される
        let grid = SheetGrid::new(vec![
            vec![text("Name"), text("Score")],
            vec![text("Alice"), num(10.0)],
            empty_row(2),
            vec![text("Bob"), num(20.0)],
        ]);

        let candidates = detect_header_candidates(&grid);
        let regions = scan_table_regions(&grid, &candidates);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].region.data_end, 4);
        // サブグリッド内の内部ブランク行は保持される
        assert_eq!(regions[0].cells.len(), 4);
    }

    #[test]
    fn test_double_blank_run_terminates_table() {
        // ブランク2行連続で終端。data_end = 到達行(4) - ブランク数(2) = 2
        let grid = SheetGrid::new(vec![
            vec![text("Name"), text("Score")],
            vec![text("Alice"), num(10.0)],
            vec![text("Bob"), num(20.0)],
            empty_row(2),
            empty_row(2),
            vec![num(1.0), num(2.0)],
        ]);

        let candidates = detect_header_candidates(&grid);
        let regions = scan_table_regions(&grid, &candidates);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].region.data_end, 2);
        assert_eq!(regions[0].cells.len(), 2);
    }

    #[test]
    fn test_empty_string_rows_count_as_blank() {
        let grid = SheetGrid::new(vec![
            vec![text("Name"), text("Score")],
            vec![text("Alice"), num(10.0)],
            vec![text("Bob"), num(20.0)],
            vec![text(""), CellValue::Empty],
            vec![CellValue::Empty, text("")],
            vec![num(1.0), num(2.0)],
        ]);

        let regions = scan_table_regions(&grid, &detect_header_candidates(&grid));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].region.data_end, 2);
    }

    #[test]
    fn test_header_only_region_is_discarded() {
        // ヘッダ行の直後にブランク2行 → データなし、破棄
        let grid = SheetGrid::new(vec![
            vec![text("Name"), text("Score")],
            empty_row(2),
            empty_row(2),
        ]);

        let regions = scan_table_regions(&grid, &detect_header_candidates(&grid));
        assert!(regions.is_empty());
    }

    #[test]
    fn test_minimum_viable_table_is_accepted() {
        // ヘッダ + データ1行は受理される
        let grid = SheetGrid::new(vec![
            vec![text("Name"), text("Score")],
            vec![text("Alice"), num(10.0)],
        ]);

        let regions = scan_table_regions(&grid, &detect_header_candidates(&grid));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].cells.len(), 2);
    }

    #[test]
    fn test_horizontal_extent_skips_empty_margins() {
        // 左右の全欠損列は列範囲に含まれない
        let grid = SheetGrid::new(vec![
            vec![CellValue::Empty, text("Name"), text("Score"), CellValue::Empty],
            vec![CellValue::Empty, text("Alice"), num(10.0), CellValue::Empty],
        ]);

        let regions = scan_table_regions(&grid, &detect_header_candidates(&grid));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].region.col_start, 1);
        assert_eq!(regions[0].region.col_end, 2);
        assert_eq!(regions[0].cells[0].len(), 2);
    }

    #[test]
    fn test_two_stacked_tables() {
        // ブランク2行で区切られた2つのテーブル（データは数値でヘッダ候補を避ける）
        let grid = SheetGrid::new(vec![
            vec![text("A"), text("B")],
            vec![num(1.0), num(2.0)],
            vec![num(3.0), num(4.0)],
            empty_row(2),
            empty_row(2),
            empty_row(2),
            vec![text("X"), text("Y")],
            vec![num(5.0), num(6.0)],
        ]);

        let regions = scan_table_regions(&grid, &detect_header_candidates(&grid));
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].region.header_row, 0);
        assert_eq!(regions[1].region.header_row, 6);
        assert_eq!(regions[1].region.data_end, 8);
    }

    #[test]
    fn test_detection_is_idempotent() {
        let grid = SheetGrid::new(vec![
            vec![text("Name"), text("Score")],
            vec![text("Alice"), num(10.0)],
            vec![text("Bob"), num(20.0)],
        ]);

        let first = scan_table_regions(&grid, &detect_header_candidates(&grid));
        let second = scan_table_regions(&grid, &detect_header_candidates(&grid));

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.region, b.region);
            assert_eq!(a.cells, b.cells);
        }
    }

    // トリムのテスト

    #[test]
    fn test_trim_edges_removes_empty_rows_and_cols() {
        let cells = vec![
            empty_row(3),
            vec![CellValue::Empty, text("a"), text("b")],
            vec![CellValue::Empty, num(1.0), num(2.0)],
            empty_row(3),
        ];

        let trimmed = trim_edges(cells).unwrap();
        assert_eq!(trimmed.len(), 2);
        assert_eq!(trimmed[0], vec![text("a"), text("b")]);
    }

    #[test]
    fn test_trim_edges_keeps_interior_gaps() {
        let cells = vec![
            vec![text("a"), CellValue::Empty, text("b")],
            empty_row(3),
            vec![num(1.0), CellValue::Empty, num(2.0)],
        ];

        let trimmed = trim_edges(cells).unwrap();
        assert_eq!(trimmed.len(), 3);
        assert_eq!(trimmed[0].len(), 3);
    }

    #[test]
    fn test_trim_edges_all_empty_returns_none() {
        assert!(trim_edges(vec![empty_row(2), empty_row(2)]).is_none());
        assert!(trim_edges(vec![]).is_none());
    }
}
