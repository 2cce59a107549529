//! Analyzer Module
//!
//! ワークブック全体の解析を編成するモジュール。
//! Fluent Builder APIで`Analyzer`を構築し、シートごとの検出・抽出・
//! 品質分析（rayonで並列化）と、テーブルごとのCSVエクスポート（逐次）を
//! 実行して`AnalysisResult`へ集約します。

use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::detect::{detect_header_candidates, scan_table_regions};
use crate::error::TableScanError;
use crate::export::{CsvExporter, ExportRecord};
use crate::extract::{extract_table, Table};
use crate::grid::SheetGrid;
use crate::preview::render_preview;
use crate::quality::{analyze_column, ColumnQualityReport};
use crate::reader::{SheetSelector, WorkbookReader};
use crate::types::CellValue;

/// 解析処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct AnalysisConfig {
    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 出力先ディレクトリ（Noneの場合はワークブックと同じディレクトリ）
    pub output_dir: Option<PathBuf>,

    /// CSVエクスポートを実行するか
    pub export_csv: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sheet_selector: SheetSelector::All,
            output_dir: None,
            export_csv: true,
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Analyzer`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみを
/// オーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use tablescan::{AnalyzerBuilder, SheetSelector};
///
/// # fn main() -> Result<(), tablescan::TableScanError> {
/// let analyzer = AnalyzerBuilder::new()
///     .with_sheet_selector(SheetSelector::Index(0))
///     .export_csv(false)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct AnalyzerBuilder {
    config: AnalysisConfig,
}

impl AnalyzerBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: すべてのシート
    /// - 出力先: ワークブックと同じディレクトリ
    /// - CSVエクスポート: 有効
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }

    /// 解析対象のシートを選択する
    ///
    /// # 引数
    ///
    /// * `selector: SheetSelector`: シート選択方式
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// CSVの出力先ディレクトリを指定する
    ///
    /// 未指定の場合、ワークブックと同じディレクトリへ書き出します。
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    /// CSVエクスポートの有効・無効を指定する
    ///
    /// `false`の場合、検出と品質分析のみを行い、ファイルは書き出しません。
    pub fn export_csv(mut self, export: bool) -> Self {
        self.config.export_csv = export;
        self
    }

    /// 設定を検証し、`Analyzer`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Analyzer)` - 設定が有効な場合
    /// * `Err(TableScanError::Config)` - 出力先に既存の通常ファイルが指定された場合
    pub fn build(self) -> Result<Analyzer, TableScanError> {
        if let Some(dir) = &self.config.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(TableScanError::Config(format!(
                    "Output directory '{}' is not a directory",
                    dir.display()
                )));
            }
        }

        Ok(Analyzer {
            config: self.config,
        })
    }
}

/// 解析処理のファサード
///
/// ワークブックを読み込み、シートごとにテーブル境界検出・抽出・列品質分析を
/// 行い、検出テーブルをCSVへ書き出して結果を集約するエントリーポイントです。
#[derive(Debug)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    /// ワークブックファイルを解析する
    ///
    /// # 引数
    ///
    /// * `path` - ワークブックファイルのパス
    ///
    /// # 戻り値
    ///
    /// * `Ok(AnalysisResult)` - 解析結果（エクスポート失敗は結果内に記録）
    /// * `Err(TableScanError)` - ワークブックが読み込めない、または解析できない場合
    pub fn analyze_file(&self, path: impl AsRef<Path>) -> Result<AnalysisResult, TableScanError> {
        let path = path.as_ref();
        let buffer = fs::read(path)?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("workbook")
            .to_string();
        let output_dir = match &self.config.output_dir {
            Some(dir) => dir.clone(),
            None => path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        self.run(&buffer, &path.display().to_string(), &stem, &output_dir)
    }

    /// メモリ上のワークブックを解析する
    ///
    /// テストや組み込み用途向けの下位エントリーポイントです。
    ///
    /// # 引数
    ///
    /// * `reader` - ワークブックを読み込むためのリーダー（Read + Seekトレイトを実装）
    /// * `workbook_stem` - エクスポートファイル名に使用するワークブック名（拡張子なし）
    /// * `output_dir` - CSVの出力先ディレクトリ
    pub fn analyze_reader<RS: Read + Seek>(
        &self,
        mut reader: RS,
        workbook_stem: &str,
        output_dir: impl AsRef<Path>,
    ) -> Result<AnalysisResult, TableScanError> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        self.run(&buffer, workbook_stem, workbook_stem, output_dir.as_ref())
    }

    /// 解析の実体（内部メソッド）
    ///
    /// # 処理フロー
    ///
    /// 1. ワークブックを開き、シートを選択
    /// 2. 各シートを並列に処理（検出 → 抽出 → 品質分析 + プレビュー）
    /// 3. 検出テーブルを逐次エクスポート（失敗はテーブル単位で記録）
    /// 4. 結果を集約（総テーブル数は全シート処理後に確定）
    fn run(
        &self,
        buffer: &[u8],
        source_label: &str,
        stem: &str,
        output_dir: &Path,
    ) -> Result<AnalysisResult, TableScanError> {
        // 1. シート選択
        let reader = WorkbookReader::open(Cursor::new(buffer.to_vec()))?;
        let sheet_count = reader.sheet_names().len();
        let sheet_names = reader.select_sheets(&self.config.sheet_selector)?;
        drop(reader);

        // 2. シートごとの解析を並列化
        // calamineのリーダーは&mutを要求するため、シートごとにメモリ上の
        // バッファから再オープンする
        let sheet_results: Result<Vec<(usize, SheetOutput)>, TableScanError> = sheet_names
            .par_iter()
            .enumerate()
            .map(|(sheet_idx, sheet_name)| {
                let mut reader = WorkbookReader::open(Cursor::new(buffer.to_vec()))?;
                let grid = reader.read_grid(sheet_name)?;
                let output = analyze_sheet(sheet_name, &grid);
                debug!(
                    sheet = %sheet_name,
                    tables = output.tables.len(),
                    "sheet analyzed"
                );
                Ok((sheet_idx, output))
            })
            .collect();

        let mut outputs = sheet_results?;
        outputs.sort_by_key(|(idx, _)| *idx);
        let outputs: Vec<SheetOutput> = outputs.into_iter().map(|(_, out)| out).collect();

        // 3. 全シートの検出テーブルを逐次エクスポート
        let mut csv_files_created = Vec::new();
        let mut export_errors = Vec::new();
        let mut export_index: BTreeMap<(String, String), String> = BTreeMap::new();

        if self.config.export_csv {
            // 出力先が未作成でもエクスポートできるようにする。失敗しても
            // テーブル単位のエクスポートエラーとして表面化する
            if let Err(err) = fs::create_dir_all(output_dir) {
                warn!(dir = %output_dir.display(), error = %err, "could not create output directory");
            }
            let exporter = CsvExporter::new(stem, output_dir);
            for output in &outputs {
                for analyzed in &output.tables {
                    match exporter.export(&analyzed.table) {
                        Ok(ExportRecord {
                            sheet_name,
                            table_id,
                            file_name,
                            path,
                        }) => {
                            csv_files_created.push(path.display().to_string());
                            export_index.insert((sheet_name, table_id), file_name);
                        }
                        Err(err) => {
                            // エクスポート失敗はそのテーブルのみ。解析結果は維持する
                            warn!(error = %err, "table export failed");
                            export_errors.push(err.to_string());
                        }
                    }
                }
            }
        }

        // 4. 結果の集約
        let mut table_structure: BTreeMap<String, BTreeMap<String, TableSummary>> = BTreeMap::new();
        let mut data_quality_per_table: BTreeMap<String, BTreeMap<String, ColumnQualityReport>> =
            BTreeMap::new();
        let mut total_tables = 0usize;

        for output in outputs {
            if output.tables.is_empty() {
                // テーブルが検出されなかったシートはエントリを持たない
                continue;
            }

            for analyzed in output.tables {
                let AnalyzedTable {
                    table,
                    preview,
                    quality,
                } = analyzed;
                total_tables += 1;

                let csv_file = export_index
                    .get(&(table.sheet_name.clone(), table.table_id.clone()))
                    .cloned();

                let quality_key = format!("{}_{}", table.sheet_name, table.table_id);
                data_quality_per_table.insert(quality_key, quality);

                table_structure
                    .entry(table.sheet_name)
                    .or_default()
                    .insert(
                        table.table_id,
                        TableSummary {
                            location: table.location,
                            headers: table.headers,
                            rows: table.row_count,
                            columns: table.column_count,
                            preview,
                            csv_file,
                        },
                    );
            }
        }

        Ok(AnalysisResult {
            file_info: FileInfo {
                excel_file: source_label.to_string(),
                sheets: sheet_count,
                total_tables_detected: total_tables,
            },
            table_structure,
            data_quality_per_table,
            csv_files_created,
            export_errors,
        })
    }
}

/// 解析済みテーブル（シート処理の中間結果）
struct AnalyzedTable {
    table: Table,
    preview: String,
    quality: BTreeMap<String, ColumnQualityReport>,
}

/// シート1枚分の処理結果
struct SheetOutput {
    tables: Vec<AnalyzedTable>,
}

/// シート1枚を解析（検出 → 抽出 → 品質分析 + プレビュー）
///
/// テーブル識別子は受理されたテーブルに対してのみ1始まりで採番されます。
fn analyze_sheet(sheet_name: &str, grid: &SheetGrid) -> SheetOutput {
    let candidates = detect_header_candidates(grid);
    let regions = scan_table_regions(grid, &candidates);

    let mut tables = Vec::with_capacity(regions.len());
    for (idx, trimmed) in regions.iter().enumerate() {
        let table = extract_table(sheet_name, idx + 1, trimmed);
        let preview = render_preview(&table.headers, &table.rows);

        // 列ごとの品質分析。重複するヘッダ名は後勝ちで1エントリに集約される
        let mut quality = BTreeMap::new();
        for (col_idx, header) in table.headers.iter().enumerate() {
            let values: Vec<CellValue> = table
                .rows
                .iter()
                .map(|row| row.get(col_idx).cloned().unwrap_or(CellValue::Empty))
                .collect();
            quality.insert(header.clone(), analyze_column(&values, header));
        }

        tables.push(AnalyzedTable {
            table,
            preview,
            quality,
        });
    }

    SheetOutput { tables }
}

/// 解析対象ファイルの情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    /// ワークブックのパス（またはメモリ解析時のラベル）
    pub excel_file: String,

    /// ワークブック内のシート総数
    pub sheets: usize,

    /// 検出されたテーブル総数（全シート処理後に確定）
    pub total_tables_detected: usize,
}

/// 検出された1テーブルのサマリ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    /// バウンディングボックス（A1形式）
    pub location: String,

    /// ヘッダ行
    pub headers: Vec<String>,

    /// データ行数
    pub rows: usize,

    /// 列数
    pub columns: usize,

    /// プレビュー文字列（ヘッダ + 先頭データ2行）
    pub preview: String,

    /// 書き出したCSVファイル名（エクスポート成功時のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_file: Option<String>,
}

/// ワークブック1冊分の解析結果
///
/// `serde_json`でそのままシリアライズ可能な集約結果です。
/// マップはすべて`BTreeMap`のため、JSON出力は決定的です。
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// ファイル情報
    pub file_info: FileInfo,

    /// シート名 → テーブル識別子 → サマリ
    ///
    /// テーブルが検出されなかったシートはエントリを持ちません。
    pub table_structure: BTreeMap<String, BTreeMap<String, TableSummary>>,

    /// `<シート名>_<テーブル識別子>` → 列名 → 品質レポート
    pub data_quality_per_table: BTreeMap<String, BTreeMap<String, ColumnQualityReport>>,

    /// 書き出したCSVファイルのパス一覧
    pub csv_files_created: Vec<String>,

    /// テーブル単位のエクスポート失敗メッセージ（通常は空）
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub export_errors: Vec<String>,
}

impl AnalysisResult {
    /// 結果をJSON文字列へシリアライズ
    pub fn to_json_pretty(&self) -> Result<String, TableScanError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TableScanError::Config(format!("JSON serialization error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    #[test]
    fn test_builder_defaults() {
        let analyzer = AnalyzerBuilder::new().build().unwrap();
        assert_eq!(analyzer.config.sheet_selector, SheetSelector::All);
        assert!(analyzer.config.export_csv);
        assert!(analyzer.config.output_dir.is_none());
    }

    #[test]
    fn test_builder_rejects_file_as_output_dir() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = AnalyzerBuilder::new()
            .with_output_dir(file.path())
            .build();

        match result {
            Err(TableScanError::Config(msg)) => assert!(msg.contains("not a directory")),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_analyze_sheet_single_table() {
        let grid = SheetGrid::new(vec![
            vec![text("Name"), text("Score")],
            vec![text("Alice"), num(10.0)],
            vec![text("Bob"), num(20.0)],
        ]);

        let output = analyze_sheet("Sheet1", &grid);
        assert_eq!(output.tables.len(), 1);

        let analyzed = &output.tables[0];
        assert_eq!(analyzed.table.table_id, "table_1");
        assert_eq!(analyzed.table.location, "A1:B3");
        assert!(analyzed.preview.starts_with("HEADERS: Name | Score"));
        assert_eq!(analyzed.quality.len(), 2);
        assert_eq!(
            analyzed.quality.get("Score").unwrap().missing_values.count,
            0
        );
    }

    #[test]
    fn test_analyze_sheet_empty_grid_yields_no_tables() {
        let grid = SheetGrid::new(vec![]);
        let output = analyze_sheet("Sheet1", &grid);
        assert!(output.tables.is_empty());
    }

    #[test]
    fn test_analyze_sheet_quality_sees_missing_cells() {
        let grid = SheetGrid::new(vec![
            vec![text("Name"), text("City")],
            vec![text("Alice"), text("Paris")],
            vec![text("Bob"), CellValue::Empty],
            vec![text("Carol"), text("Lyon")],
            vec![text("Dave"), text("Nice")],
        ]);

        let output = analyze_sheet("Sheet1", &grid);
        let quality = &output.tables[0].quality;
        let city = quality.get("City").unwrap();
        assert_eq!(city.missing_values.count, 1);
        assert_eq!(city.missing_values.percentage, "25.0%");
    }

    #[test]
    fn test_table_ids_are_sequential_for_accepted_tables() {
        // 数値データでヘッダ候補の重複を避けた2テーブル構成
        let grid = SheetGrid::new(vec![
            vec![text("A"), text("B")],
            vec![num(1.0), num(2.0)],
            vec![num(3.0), num(4.0)],
            vec![CellValue::Empty; 2],
            vec![CellValue::Empty; 2],
            vec![CellValue::Empty; 2],
            vec![text("X"), text("Y")],
            vec![num(5.0), num(6.0)],
        ]);

        let output = analyze_sheet("Sheet1", &grid);
        assert_eq!(output.tables.len(), 2);
        assert_eq!(output.tables[0].table.table_id, "table_1");
        assert_eq!(output.tables[1].table.table_id, "table_2");
    }

    // ワークブック全体の解析は統合テスト（tests/）で実装します。
}
