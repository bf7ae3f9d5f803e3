//! In-memory tables for spreadsheet uploads.
//!
//! A [`Sheet`] is a rectangular grid with inferred column headers taken from
//! the first row. A column is *numeric* when the sheet has data rows and every
//! non-missing cell in it is a number; an all-missing column still counts as
//! numeric but has no statistics. [`TableCollection`] keeps sheets in workbook
//! order.
//!
//! The per-sheet text block produced by [`Sheet::summary_block`] is the
//! spreadsheet half of the normalized document text:
//!
//! ```text
//!
//! === Sheet: Income ===
//! Shape: 3 rows, 2 columns
//! Columns: Item, Amount
//!
//! Numeric Data Summary:
//! Amount: Min=100.00, Max=300.00, Mean=200.00
//!
//! Sample Data:
//! 	Item	Amount
//! 0	Revenue	300
//! ...
//! ```

use serde::Serialize;
use std::collections::HashMap;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Bool(bool),
    Empty,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Text used in rendered samples; missing cells show as `NaN`.
    pub fn display(&self) -> String {
        match self {
            Cell::Number(v) => format_number(*v),
            Cell::Text(s) => s.replace(['\t', '\n', '\r'], " "),
            Cell::Bool(true) => "True".to_string(),
            Cell::Bool(false) => "False".to_string(),
            Cell::Empty => "NaN".to_string(),
        }
    }
}

/// Integral values print without a fractional part (`1200`, not `1200.0`).
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        format!("{}", v)
    }
}

/// Min / max / mean over the non-missing values of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Describe-style summary of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Build a sheet from a raw grid whose first row holds the headers.
    ///
    /// Data rows are padded with [`Cell::Empty`] (or truncated) to the header
    /// width. Empty header cells become `Unnamed: {idx}` and repeated names get
    /// `.1`, `.2`, ... suffixes.
    pub fn from_grid(name: impl Into<String>, grid: Vec<Vec<Cell>>) -> Self {
        let mut grid = grid.into_iter();
        let header = grid.next().unwrap_or_default();
        let columns = infer_headers(&header);
        let width = columns.len();

        let rows = grid
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();

        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |row| row.get(idx))
    }

    pub fn is_numeric_column(&self, idx: usize) -> bool {
        if idx >= self.column_count() || self.rows.is_empty() {
            return false;
        }
        self.column(idx)
            .all(|cell| cell.is_missing() || cell.as_number().is_some())
    }

    /// Indices of numeric columns, in column order.
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.column_count())
            .filter(|&idx| self.is_numeric_column(idx))
            .collect()
    }

    fn numeric_values(&self, idx: usize) -> Vec<f64> {
        self.column(idx)
            .filter_map(Cell::as_number)
            .filter(|v| !v.is_nan())
            .collect()
    }

    /// `None` for non-numeric columns and numeric columns with no values.
    pub fn column_stats(&self, idx: usize) -> Option<ColumnStats> {
        if !self.is_numeric_column(idx) {
            return None;
        }
        let values = self.numeric_values(idx);
        if values.is_empty() {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Some(ColumnStats {
            count: values.len(),
            min,
            max,
            mean,
        })
    }

    pub fn describe(&self, idx: usize) -> Option<Describe> {
        let stats = self.column_stats(idx)?;
        let mut sorted = self.numeric_values(idx);
        sorted.sort_by(|a, b| a.total_cmp(b));

        let std = if sorted.len() > 1 {
            let var = sorted
                .iter()
                .map(|v| (v - stats.mean).powi(2))
                .sum::<f64>()
                / (sorted.len() - 1) as f64;
            Some(var.sqrt())
        } else {
            None
        };

        Some(Describe {
            count: stats.count,
            mean: stats.mean,
            std,
            min: stats.min,
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.50),
            q75: quantile(&sorted, 0.75),
            max: stats.max,
        })
    }

    /// First `n` rows as tab-separated text, headed by the column names and
    /// prefixed by the row index.
    pub fn render_sample(&self, n: usize) -> String {
        if self.rows.is_empty() {
            return format!(
                "Empty DataFrame\nColumns: [{}]\nIndex: []",
                self.columns.join(", ")
            );
        }

        let mut out = String::new();
        out.push('\t');
        out.push_str(&self.columns.join("\t"));
        for (i, row) in self.rows.iter().take(n).enumerate() {
            out.push('\n');
            out.push_str(&i.to_string());
            for cell in row {
                out.push('\t');
                out.push_str(&cell.display());
            }
        }
        out
    }

    /// The normalized-text block for this sheet.
    pub fn summary_block(&self, sample_rows: usize) -> String {
        let mut text = String::new();
        text.push_str(&format!("\n=== Sheet: {} ===\n", self.name));
        text.push_str(&format!(
            "Shape: {} rows, {} columns\n",
            self.row_count(),
            self.column_count()
        ));
        text.push_str(&format!("Columns: {}\n", self.columns.join(", ")));

        let numeric = self.numeric_columns();
        if !numeric.is_empty() {
            text.push_str("\nNumeric Data Summary:\n");
            for idx in numeric {
                if let Some(stats) = self.column_stats(idx) {
                    text.push_str(&format!(
                        "{}: Min={:.2}, Max={:.2}, Mean={:.2}\n",
                        self.columns[idx], stats.min, stats.max, stats.mean
                    ));
                }
            }
        }

        text.push_str("\nSample Data:\n");
        text.push_str(&self.render_sample(sample_rows));
        text.push('\n');
        text
    }
}

/// Linear-interpolated quantile over sorted, non-empty values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn infer_headers(header: &[Cell]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let base = match cell {
                Cell::Empty => format!("Unnamed: {}", idx),
                other => other.display(),
            };
            let n = seen.entry(base.clone()).or_insert(0);
            let name = if *n == 0 {
                base
            } else {
                format!("{}.{}", base, n)
            };
            *n += 1;
            name
        })
        .collect()
}

/// Ordered sheet name → table mapping, in workbook order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableCollection {
    sheets: Vec<Sheet>,
}

impl TableCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn get(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sheet> {
        self.sheets.iter()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl<'a> IntoIterator for &'a TableCollection {
    type Item = &'a Sheet;
    type IntoIter = std::slice::Iter<'a, Sheet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sheets.iter()
    }
}
