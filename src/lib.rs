//! tablescan - Multi-table boundary detection and data-quality analysis for Excel workbooks
//!
//! This crate scans Excel workbook sheets for embedded tables (a single sheet may
//! contain several tables separated by blank rows), extracts each table with its
//! headers, analyzes every column for data-quality issues (missing values, accented
//! characters, special characters, case inconsistency, whitespace problems), and
//! optionally exports each detected table as an individual CSV file.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tablescan::AnalyzerBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create an analyzer with default settings
//!     let analyzer = AnalyzerBuilder::new().build()?;
//!
//!     // Analyze a workbook; detected tables are exported as CSV files
//!     // next to the workbook
//!     let result = analyzer.analyze_file("report.xlsx")?;
//!
//!     println!("{}", result.to_json_pretty()?);
//!     Ok(())
//! }
//! ```
//!
//! For in-memory analysis, use `Cursor`:
//!
//! ```rust,no_run
//! use std::io::Cursor;
//! use tablescan::AnalyzerBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let analyzer = AnalyzerBuilder::new().build()?;
//! let excel_data: Vec<u8> = vec![]; // Your Excel file bytes
//! let result = analyzer.analyze_reader(Cursor::new(excel_data), "report", "/tmp")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use tablescan::{AnalyzerBuilder, SheetSelector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Analyze the first sheet only, without exporting CSV files
//!     let analyzer = AnalyzerBuilder::new()
//!         .with_sheet_selector(SheetSelector::Index(0))
//!         .export_csv(false)
//!         .build()?;
//!
//!     let result = analyzer.analyze_file("report.xlsx")?;
//!     for (sheet, tables) in &result.table_structure {
//!         println!("{}: {} table(s)", sheet, tables.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

mod analyzer;
mod detect;
mod error;
mod export;
mod extract;
mod grid;
mod preview;
mod quality;
mod reader;
mod types;

// 公開API
pub use analyzer::{AnalysisResult, Analyzer, AnalyzerBuilder, FileInfo, TableSummary};
pub use error::TableScanError;
pub use quality::{ColumnQualityReport, MissingValues, TextIssues};
pub use reader::SheetSelector;
