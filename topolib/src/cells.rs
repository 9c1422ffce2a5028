//! Host cell values, cell blocks and function outputs.
//!
//! Every operation receives raw, untyped cells the way a spreadsheet host
//! delivers them and answers with a [`CellOutput`]. Missing arguments and
//! blank cells are both treated as absent, whatever sentinel the host uses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CrsError, CrsResult};

/// Returned for string properties that are null or blank.
pub const NOT_FOUND: &str = "<NotFound>";

/// Returned by indexed accessors when the index is outside the collection.
pub const INDEX_OUT_OF_RANGE: &str = "<index out of range>";

/// Returned by numeric properties with no natural zero when the value is absent.
pub const NOT_FOUND_NUMBER: f64 = -1.0;

/// Host error values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellError {
    /// Generic value error (`#VALUE!`)
    Value,
    /// Not applicable (`#N/A`)
    NotApplicable,
    /// Reference error (`#REF!`)
    Ref,
    /// Numeric error (`#NUM!`)
    Num,
}

impl CellError {
    pub fn as_str(self) -> &'static str {
        match self {
            CellError::Value => "#VALUE!",
            CellError::NotApplicable => "#N/A",
            CellError::Ref => "#REF!",
            CellError::Num => "#NUM!",
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single raw cell value as delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// All host numbers are doubles.
    Number(f64),
    Text(String),
    Bool(bool),
    /// A blank cell.
    Empty,
    /// An omitted argument.
    Missing,
    Error(CellError),
}

impl CellValue {
    /// Blank cells and omitted arguments.
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Empty | CellValue::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Number(v as f64)
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

/// A rectangular block of cells, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CellBlock {
    rows: usize,
    cols: usize,
    cells: Vec<CellValue>,
}

impl CellBlock {
    /// A 1x1 block.
    pub fn scalar(value: impl Into<CellValue>) -> Self {
        Self {
            rows: 1,
            cols: 1,
            cells: vec![value.into()],
        }
    }

    /// A single row.
    pub fn row<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let cells: Vec<CellValue> = values.into_iter().map(Into::into).collect();
        Self {
            rows: if cells.is_empty() { 0 } else { 1 },
            cols: cells.len(),
            cells,
        }
    }

    /// A block from nested rows. Ragged input is rejected.
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> CrsResult<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|r| r.len() != cols) {
            return Err(CrsError::InvalidArgument(
                "cell block rows have different lengths".to_string(),
            ));
        }
        let row_count = if cols == 0 { 0 } else { rows.len() };
        Ok(Self {
            rows: row_count,
            cols,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// An omitted argument.
    pub fn missing() -> Self {
        Self::scalar(CellValue::Missing)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Cells of the first row (empty for a 0x0 block).
    pub fn first_row(&self) -> &[CellValue] {
        &self.cells[..self.cols.min(self.cells.len())]
    }

    /// True for an empty block or a single blank/missing cell.
    pub fn is_absent(&self) -> bool {
        self.cells.is_empty() || (self.cells.len() == 1 && self.cells[0].is_absent())
    }
}

impl From<CellValue> for CellBlock {
    fn from(value: CellValue) -> Self {
        CellBlock::scalar(value)
    }
}

/// Read an optional numeric argument; absent means `default`.
pub fn optional_number(arg: &CellBlock, default: f64) -> CrsResult<f64> {
    if arg.is_absent() {
        return Ok(default);
    }
    match arg.get(0, 0) {
        Some(CellValue::Number(n)) => Ok(*n),
        Some(CellValue::Text(s)) => s.trim().parse::<f64>().map_err(|_| {
            CrsError::InvalidArgument(format!("'{}' is not a number", s))
        }),
        other => Err(CrsError::InvalidArgument(format!(
            "expected a number, got {:?}",
            other
        ))),
    }
}

/// Read an optional zero-based index; absent means 0. Numbers are truncated.
pub fn optional_index(arg: &CellBlock) -> CrsResult<i64> {
    optional_number(arg, 0.0).map(|n| n.trunc() as i64)
}

/// The value an operation hands back to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellOutput {
    Text(String),
    Number(f64),
    Bool(bool),
    Array(Vec<Vec<CellOutput>>),
    #[serde(serialize_with = "serialize_error")]
    Error(CellError),
}

fn serialize_error<S: serde::Serializer>(err: &CellError, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(err.as_str())
}

impl CellOutput {
    /// A number, with NaN mapped to `#N/A`.
    pub fn number(value: f64) -> Self {
        if value.is_nan() {
            CellOutput::Error(CellError::NotApplicable)
        } else {
            CellOutput::Number(value)
        }
    }

    /// A string property: null or blank becomes [`NOT_FOUND`].
    pub fn text_or_not_found(value: Option<String>) -> Self {
        match value {
            Some(s) if !s.trim().is_empty() => CellOutput::Text(s),
            _ => CellOutput::Text(NOT_FOUND.to_string()),
        }
    }

    pub fn not_found() -> Self {
        CellOutput::Text(NOT_FOUND.to_string())
    }

    pub fn index_out_of_range() -> Self {
        CellOutput::Text(INDEX_OUT_OF_RANGE.to_string())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellOutput::Error(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellOutput::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellOutput::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellOutput::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<String> for CellOutput {
    fn from(v: String) -> Self {
        CellOutput::Text(v)
    }
}

impl From<&str> for CellOutput {
    fn from(v: &str) -> Self {
        CellOutput::Text(v.to_string())
    }
}

impl From<bool> for CellOutput {
    fn from(v: bool) -> Self {
        CellOutput::Bool(v)
    }
}

impl From<f64> for CellOutput {
    fn from(v: f64) -> Self {
        CellOutput::number(v)
    }
}

impl From<usize> for CellOutput {
    fn from(v: usize) -> Self {
        CellOutput::Number(v as f64)
    }
}

impl From<CellError> for CellOutput {
    fn from(e: CellError) -> Self {
        CellOutput::Error(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_shape() {
        let block = CellBlock::row(["EPSG", "4326"]);
        assert_eq!(block.rows(), 1);
        assert_eq!(block.cols(), 2);
        assert_eq!(block.get(0, 1), Some(&CellValue::Text("4326".into())));
        assert_eq!(block.get(1, 0), None);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let rows = vec![
            vec![CellValue::Number(1.0), CellValue::Number(2.0)],
            vec![CellValue::Number(3.0)],
        ];
        assert!(CellBlock::from_rows(rows).is_err());
    }

    #[test]
    fn test_from_rows_empty() {
        let block = CellBlock::from_rows(vec![]).unwrap();
        assert_eq!((block.rows(), block.cols()), (0, 0));
        assert!(block.is_absent());
    }

    #[test]
    fn test_optional_index() {
        assert_eq!(optional_index(&CellBlock::missing()).unwrap(), 0);
        assert_eq!(optional_index(&CellBlock::scalar(CellValue::Empty)).unwrap(), 0);
        assert_eq!(optional_index(&CellBlock::scalar(2.9)).unwrap(), 2);
        assert_eq!(optional_index(&CellBlock::scalar(-1.0)).unwrap(), -1);
        assert_eq!(optional_index(&CellBlock::scalar(" 3 ")).unwrap(), 3);
        assert!(optional_index(&CellBlock::scalar("abc")).is_err());
        assert!(optional_index(&CellBlock::scalar(true)).is_err());
    }

    #[test]
    fn test_text_or_not_found() {
        assert_eq!(
            CellOutput::text_or_not_found(Some("  ".into())),
            CellOutput::Text(NOT_FOUND.into())
        );
        assert_eq!(
            CellOutput::text_or_not_found(None),
            CellOutput::Text(NOT_FOUND.into())
        );
        assert_eq!(
            CellOutput::text_or_not_found(Some("WGS 84".into())),
            CellOutput::Text("WGS 84".into())
        );
    }

    #[test]
    fn test_nan_is_not_applicable() {
        assert_eq!(
            CellOutput::number(f64::NAN),
            CellOutput::Error(CellError::NotApplicable)
        );
        assert_eq!(CellOutput::number(1.5), CellOutput::Number(1.5));
    }

    #[test]
    fn test_output_serializes_errors_as_host_codes() {
        let json = serde_json::to_string(&CellOutput::Error(CellError::Value)).unwrap();
        assert_eq!(json, "\"#VALUE!\"");
        let json = serde_json::to_string(&CellOutput::Array(vec![vec![
            CellOutput::Number(1.0),
            CellOutput::Bool(true),
        ]]))
        .unwrap();
        assert_eq!(json, "[[1.0,true]]");
    }
}
