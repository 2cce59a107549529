//! Export Module
//!
//! 検出されたテーブルを1テーブル1ファイルのCSVとして書き出すモジュール。
//! ファイル名は`<ワークブック名>_<シート名>_<table_N>.csv`形式で決定的に
//! 導出されます。既存ファイルは警告なしに上書きされます。

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::TableScanError;
use crate::extract::Table;
use crate::types::CellValue;

/// エクスポート結果のレコード
///
/// テーブル自体は抽出後不変のため、書き出したパスは集約時に
/// このレコード経由で結果へ結合されます。
#[derive(Debug, Clone)]
pub(crate) struct ExportRecord {
    /// 対象シート名
    pub sheet_name: String,

    /// 対象テーブル識別子
    pub table_id: String,

    /// 書き出したファイル名（ディレクトリを含まない）
    pub file_name: String,

    /// 書き出した完全パス
    pub path: PathBuf,
}

/// CSVエクスポーター
pub(crate) struct CsvExporter {
    /// 出力先ディレクトリ
    output_dir: PathBuf,

    /// ワークブックのファイル名（拡張子なし）
    stem: String,
}

impl CsvExporter {
    /// 新しいエクスポーターを生成
    pub fn new(stem: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            stem: stem.into(),
        }
    }

    /// テーブルのエクスポートファイル名を導出
    ///
    /// シート名に含まれるスペースはアンダースコアに置換されます。
    pub fn file_name(&self, table: &Table) -> String {
        format!(
            "{}_{}_{}.csv",
            self.stem,
            table.sheet_name.replace(' ', "_"),
            table.table_id
        )
    }

    /// テーブルを1つのCSVファイルとして書き出す
    ///
    /// ヘッダを先頭レコードとして、続けてデータ行をUTF-8で書き込みます。
    /// 既存ファイルは上書きされます。
    ///
    /// # 戻り値
    ///
    /// * `Ok(ExportRecord)` - 書き出しに成功した場合
    /// * `Err(TableScanError::ExportFailed)` - 出力先が書き込み不能な場合。
    ///   呼び出し側はこのエラーを記録して処理を継続します。
    pub fn export(&self, table: &Table) -> Result<ExportRecord, TableScanError> {
        let file_name = self.file_name(table);
        let path = self.output_dir.join(&file_name);

        write_table(table, &path).map_err(|source| TableScanError::ExportFailed {
            file: path.display().to_string(),
            source,
        })?;

        Ok(ExportRecord {
            sheet_name: table.sheet_name.clone(),
            table_id: table.table_id.clone(),
            file_name,
            path,
        })
    }
}

/// テーブルをCSV形式でファイルへ書き込む（内部ヘルパー）
fn write_table(table: &Table, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    write_record(&mut writer, table.headers.iter().map(String::as_str))?;
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(CellValue::to_text).collect();
        write_record(&mut writer, cells.iter().map(String::as_str))?;
    }

    writer.flush()
}

/// 1レコードをカンマ区切りで書き込む（内部ヘルパー）
fn write_record<'a, W: Write>(
    writer: &mut W,
    fields: impl Iterator<Item = &'a str>,
) -> io::Result<()> {
    let mut first = true;
    for field in fields {
        if !first {
            write!(writer, ",")?;
        }
        first = false;
        write!(writer, "{}", escape_csv(field))?;
    }
    writeln!(writer)
}

/// CSVフィールドをエスケープ
///
/// カンマ、ダブルクォート、改行を含む場合はダブルクォートで囲み、
/// 内部のダブルクォートは2つにエスケープします。
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
