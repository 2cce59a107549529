//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// tablescanクレート全体で使用するエラー型
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー（ワークブック読み込み失敗など）。致命的。
/// - `Parse`: Excelファイルの解析中に発生したエラー（calamine由来）。致命的。
/// - `Config`: 設定の検証に失敗したエラー（無効なシート指定など）。
/// - `ExportFailed`: 単一テーブルのCSV書き出し失敗。解析全体は中断せず、
///   結果の`export_errors`に記録されます。
///
/// ヘッダ候補のないシートや、トリム後に縮退したテーブル領域はエラーでは
/// ありません。単にテーブルが検出されなかったものとして扱われます。
#[derive(Error, Debug)]
pub enum TableScanError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー
    ///
    /// calamineクレートがワークブックを解析する際に発生したエラーです。
    /// ファイル形式が不正、破損したファイルなどが原因となります。
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `AnalyzerBuilder::build()`時の検証、または存在しないシートの指定などで
    /// 発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// テーブルのCSV書き出しに失敗したエラー
    ///
    /// 出力先が書き込み不能な場合などに発生します。該当テーブルの
    /// エクスポートのみが失敗し、他のテーブルの処理は継続されます。
    #[error("Failed to export table to '{file}': {source}")]
    ExportFailed {
        /// 書き出しに失敗したファイル
        file: String,
        /// 元となったI/Oエラー
        source: std::io::Error,
    },
}
