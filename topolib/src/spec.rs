//! Classification of raw cell input into a CRS construction request.
//!
//! A CRS is specified by a 1x1 or 1x2 block of cells. The block is
//! classified exactly once, here, into a [`CrsSpecKind`]; everything
//! downstream matches on that closed set instead of inspecting cells again.
//!
//! Classification order:
//!
//! 1. Two cells: authority name + code ([`CrsSpecKind::AuthorityCode`]).
//! 2. One numeric cell: EPSG code, truncated ([`CrsSpecKind::NumericEpsg`]).
//! 3. One string cell that parses as an integer ([`CrsSpecKind::TextualEpsg`]).
//! 4. One string cell containing a WKT marker ([`CrsSpecKind::WellKnownText`]).
//! 5. Any other string ([`CrsSpecKind::GenericText`]).
//!
//! Everything else is [`CrsError::MalformedSpec`].

use std::fmt;

use crate::cells::{CellBlock, CellValue};
use crate::error::{CrsError, CrsResult};

/// Substrings that mark a string as WKT (case-sensitive).
pub const WKT_MARKERS: [&str; 3] = ["PROJCS", "GEOGCS", "SPHEROID"];

/// The five accepted CRS input shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrsSpecKind {
    /// A numeric cell holding an EPSG code
    NumericEpsg(i32),
    /// A string cell holding an EPSG code
    TextualEpsg(i32),
    /// A WKT definition
    WellKnownText(String),
    /// PROJ string, PROJJSON, `AUTH:CODE`, URN or CRS name
    GenericText(String),
    /// Authority name and code from two adjacent cells
    AuthorityCode { authority: String, code: i32 },
}

impl CrsSpecKind {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            CrsSpecKind::NumericEpsg(_) => "numeric-epsg",
            CrsSpecKind::TextualEpsg(_) => "textual-epsg",
            CrsSpecKind::WellKnownText(_) => "wkt",
            CrsSpecKind::GenericText(_) => "text",
            CrsSpecKind::AuthorityCode { .. } => "authority-code",
        }
    }
}

impl fmt::Display for CrsSpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsSpecKind::NumericEpsg(code) | CrsSpecKind::TextualEpsg(code) => {
                write!(f, "EPSG:{}", code)
            }
            CrsSpecKind::WellKnownText(text) | CrsSpecKind::GenericText(text) => {
                // WKT can be long; keep log lines readable
                let head: String = text.chars().take(48).collect();
                if head.len() < text.len() {
                    write!(f, "{}...", head)
                } else {
                    f.write_str(&head)
                }
            }
            CrsSpecKind::AuthorityCode { authority, code } => write!(f, "{}:{}", authority, code),
        }
    }
}

/// A shape-checked view over the cells of a CRS argument.
#[derive(Debug, Clone, Copy)]
pub struct CrsSpec<'a> {
    cells: &'a [CellValue],
}

impl<'a> CrsSpec<'a> {
    /// Accept a block of exactly one row and one or two columns.
    pub fn from_block(block: &'a CellBlock) -> CrsResult<Self> {
        if block.rows() != 1 || !(1..=2).contains(&block.cols()) {
            return Err(CrsError::malformed(format!(
                "expected 1 row of 1 or 2 cells, got {}x{}",
                block.rows(),
                block.cols()
            )));
        }
        Ok(Self {
            cells: block.first_row(),
        })
    }

    /// Classify the cells.
    pub fn classify(&self) -> CrsResult<CrsSpecKind> {
        match self.cells {
            [single] => classify_single(single),
            [authority, code] => classify_pair(authority, code),
            _ => Err(CrsError::malformed("unsupported number of cells")),
        }
    }
}

/// Classify a raw block in one step.
pub fn classify(block: &CellBlock) -> CrsResult<CrsSpecKind> {
    CrsSpec::from_block(block)?.classify()
}

fn classify_single(cell: &CellValue) -> CrsResult<CrsSpecKind> {
    match cell {
        CellValue::Number(n) => Ok(CrsSpecKind::NumericEpsg(truncate(*n))),
        CellValue::Text(text) => {
            if let Some(code) = parse_integer(text) {
                Ok(CrsSpecKind::TextualEpsg(code))
            } else if is_wkt(text) {
                Ok(CrsSpecKind::WellKnownText(text.clone()))
            } else {
                Ok(CrsSpecKind::GenericText(text.clone()))
            }
        }
        other => Err(CrsError::malformed(format!(
            "a single CRS cell must be a number or text, got {}",
            describe(other)
        ))),
    }
}

fn classify_pair(authority: &CellValue, code: &CellValue) -> CrsResult<CrsSpecKind> {
    let authority = match authority {
        CellValue::Text(text) => text.clone(),
        other => {
            return Err(CrsError::malformed(format!(
                "authority must be text, got {}",
                describe(other)
            )))
        }
    };
    let code = match code {
        CellValue::Number(n) => truncate(*n),
        CellValue::Text(text) => parse_integer(text).ok_or_else(|| {
            CrsError::malformed(format!("code '{}' is not an integer", text))
        })?,
        other => {
            return Err(CrsError::malformed(format!(
                "code must be a number, got {}",
                describe(other)
            )))
        }
    };
    Ok(CrsSpecKind::AuthorityCode { authority, code })
}

/// Host numbers are doubles; codes are their truncation toward zero.
fn truncate(value: f64) -> i32 {
    value.trunc() as i32
}

fn parse_integer(text: &str) -> Option<i32> {
    text.trim().parse::<i32>().ok()
}

fn is_wkt(text: &str) -> bool {
    WKT_MARKERS.iter().any(|marker| text.contains(marker))
}

fn describe(cell: &CellValue) -> &'static str {
    match cell {
        CellValue::Number(_) => "a number",
        CellValue::Text(_) => "text",
        CellValue::Bool(_) => "a boolean",
        CellValue::Empty => "a blank cell",
        CellValue::Missing => "a missing argument",
        CellValue::Error(_) => "an error value",
    }
}
