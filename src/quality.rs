//! Quality Module
//!
//! 自由テキスト列のデータ品質ヒューリスティックを提供するモジュール。
//! 欠損率、ダイアクリティカルマーク、想定外の特殊文字、大文字小文字の
//! 不整合、空白の乱れを検査します。入力列の純粋関数であり、副作用は
//! ありません。

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::types::CellValue;

/// 特殊文字判定から除外する句読点
const ALLOWED_PUNCTUATION: &str = ".,!?";

/// 先頭・末尾の空白を検出した際のタグ
const TAG_LEADING_TRAILING: &str = "leading_trailing_spaces";

/// 連続スペースを検出した際のタグ
const TAG_MULTIPLE_SPACES: &str = "multiple_spaces";

/// 欠損値の統計
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingValues {
    /// 欠損セル数
    pub count: usize,

    /// 欠損率（小数1桁のパーセント文字列、例: "25.0%"）
    pub percentage: String,
}

/// テキスト品質の問題点（検出されたカテゴリのみシリアライズされる）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextIssues {
    /// 検出されたアクセント付き文字の集合
    ///
    /// 非ASCIIの文字（Unicodeカテゴリが文字のもの）はスクリプトを問わず
    /// すべて検出対象となります。既知のヒューリスティック上の制限です。
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub accents_found: BTreeSet<char>,

    /// 検出された特殊文字の集合（英数字・空白・`. , ! ?`以外）
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub special_chars: BTreeSet<char>,

    /// 大文字小文字の不整合グループ
    ///
    /// 小文字化・トリム後のキー → 元の表記のリスト。
    /// 相異なる表記が2つ以上あるキーのみ記録されます。
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub case_inconsistency: BTreeMap<String, Vec<String>>,

    /// 空白の問題タグの集合
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub whitespace_issues: BTreeSet<String>,
}

impl TextIssues {
    /// 問題が1つも検出されなかったかどうか
    pub fn is_empty(&self) -> bool {
        self.accents_found.is_empty()
            && self.special_chars.is_empty()
            && self.case_inconsistency.is_empty()
            && self.whitespace_issues.is_empty()
    }
}

/// 1列分のデータ品質レポート
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnQualityReport {
    /// 列名
    pub column: String,

    /// 欠損値の統計
    pub missing_values: MissingValues,

    /// テキスト品質の問題点
    pub text_issues: TextIssues,
}

/// 1列分の値を検査し、品質レポートを生成
///
/// # 引数
///
/// * `values` - 列の値（データ行1行につき1セル、欠損を含む）
/// * `column_name` - 列名
///
/// # 備考
///
/// 空の列（全行欠損、または行なし）でもパニックしません。その場合は
/// 欠損統計のみを持つレポートを返します。
pub fn analyze_column(values: &[CellValue], column_name: &str) -> ColumnQualityReport {
    // 1. 欠損値の統計（分母は欠損を含む全行数）
    let total_rows = values.len();
    let missing_count = values.iter().filter(|v| v.is_missing()).count();
    let percentage = if total_rows == 0 {
        0.0
    } else {
        missing_count as f64 / total_rows as f64 * 100.0
    };

    let mut report = ColumnQualityReport {
        column: column_name.to_string(),
        missing_values: MissingValues {
            count: missing_count,
            percentage: format!("{:.1}%", percentage),
        },
        text_issues: TextIssues::default(),
    };

    // 2. 非欠損値を文字列化
    let texts: Vec<String> = values
        .iter()
        .filter(|v| !v.is_missing())
        .map(CellValue::to_text)
        .collect();

    if texts.is_empty() {
        return report;
    }

    // 3. アクセント付き文字と特殊文字の検出
    for text in &texts {
        for ch in text.chars() {
            if ch.is_alphabetic() && ascii_fold(ch) != ch.to_string() {
                report.text_issues.accents_found.insert(ch);
            } else if !ch.is_alphanumeric()
                && !ch.is_whitespace()
                && !ALLOWED_PUNCTUATION.contains(ch)
            {
                report.text_issues.special_chars.insert(ch);
            }
        }
    }

    // 4. 大文字小文字の不整合検出
    let mut groups: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for text in &texts {
        let normalized = text.to_lowercase().trim().to_string();
        groups.entry(normalized).or_default().insert(text.as_str());
    }
    for (normalized, variants) in groups {
        if variants.len() >= 2 {
            report
                .text_issues
                .case_inconsistency
                .insert(normalized, variants.into_iter().map(String::from).collect());
        }
    }

    // 5. 空白の問題検出
    for text in &texts {
        if text != text.trim() {
            report
                .text_issues
                .whitespace_issues
                .insert(TAG_LEADING_TRAILING.to_string());
        }
        if text.contains("  ") {
            report
                .text_issues
                .whitespace_issues
                .insert(TAG_MULTIPLE_SPACES.to_string());
        }
    }

    report
}

/// 文字をNFD分解し、ASCII成分のみを残した文字列を返す
///
/// 例: 'é' → "e"、'e' → "e"、'Я' → ""（ASCII成分なし）。
/// 元の文字と一致しなければ、その文字はアクセント付きとみなされます。
/// 分解できない文字はそのまま比較されるため、この関数は失敗しません。
fn ascii_fold(ch: char) -> String {
    ch.to_string().nfd().filter(|c| c.is_ascii()).collect()
}
