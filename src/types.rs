//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

/// セルの値を表す閉じた列挙型
///
/// グリッドモデルは「欠損 / テキスト / 数値」の3値のみを扱います。
/// calamine由来の他の型（論理値、日付など）はリーダ境界でこの3値に変換されます。
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellValue {
    /// 空セル（欠損値）
    Empty,

    /// 文字列
    Text(String),

    /// 数値（f64）
    Number(f64),
}

impl CellValue {
    /// 欠損値かどうかを判定
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// ブランクかどうかを判定（欠損または空文字列）
    ///
    /// テーブル終端検出のブランク行判定で使用します。
    /// 空白のみの文字列はブランクとはみなしません。
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// 値を文字列へ変換（欠損 → 空文字列）
    ///
    /// 数値はf64のDisplay形式で固定的に文字列化します（例: 42.0 → "42"、
    /// 42.5 → "42.5"）。プレビューとCSV出力を決定的にするための正準形式です。
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
        }
    }
}

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    pub fn to_a1_notation(self) -> String {
        format!("{}{}", col_index_to_letter(self.col), self.row + 1)
    }
}

/// 列インデックスを列名文字列に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
pub(crate) fn col_index_to_letter(mut col: usize) -> String {
    let mut result = String::new();
    loop {
        let remainder = col % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}

/// セル範囲（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CellRange {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl CellRange {
    /// 新しい範囲を生成
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        Self { start, end }
    }

    /// A1形式の範囲文字列に変換（例: "B2:D9"）
    ///
    /// テーブルのバウンディングボックス表記として使用します。
    pub fn to_a1_range(self) -> String {
        format!(
            "{}:{}",
            self.start.to_a1_notation(),
            self.end.to_a1_notation()
        )
    }
}
