//! Data Transfer Objects for the HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cells::{CellBlock, CellOutput, CellValue};

/// Body of `POST /v1/functions/{name}`.
///
/// Each argument is a JSON scalar (1x1 block), an array of scalars (one
/// row) or an array of arrays (rows). A top-level `null` is an omitted
/// argument; `null` inside an array is a blank cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallRequest {
    #[serde(default)]
    pub args: Vec<Value>,
}

impl CallRequest {
    pub fn to_blocks(&self) -> Result<Vec<CellBlock>, String> {
        self.args
            .iter()
            .enumerate()
            .map(|(i, arg)| block_from_json(arg).map_err(|e| format!("argument {}: {}", i + 1, e)))
            .collect()
    }
}

/// Result of one function call.
#[derive(Debug, Clone, Serialize)]
pub struct CallResponse {
    pub function: String,
    pub value: CellOutput,
}

/// Registered function names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionListResponse {
    pub functions: Vec<String>,
    pub total: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub engine: String,
}

/// Convert one JSON argument into a cell block.
pub fn block_from_json(value: &Value) -> Result<CellBlock, String> {
    match value {
        Value::Null => Ok(CellBlock::missing()),
        Value::Array(items) if items.iter().any(Value::is_array) => {
            let rows = items
                .iter()
                .map(|row| match row {
                    Value::Array(cells) => cells.iter().map(cell_from_json).collect::<Result<Vec<_>, _>>(),
                    _ => Err("cannot mix rows and scalars".to_string()),
                })
                .collect::<Result<Vec<Vec<CellValue>>, String>>()?;
            CellBlock::from_rows(rows).map_err(|e| e.to_string())
        }
        Value::Array(items) => {
            let cells = items
                .iter()
                .map(cell_from_json)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CellBlock::row(cells))
        }
        scalar => Ok(CellBlock::scalar(cell_from_json(scalar)?)),
    }
}

fn cell_from_json(value: &Value) -> Result<CellValue, String> {
    match value {
        Value::Null => Ok(CellValue::Empty),
        Value::Bool(b) => Ok(CellValue::Bool(*b)),
        Value::Number(n) => n
            .as_f64()
            .map(CellValue::Number)
            .ok_or_else(|| format!("number {} out of range", n)),
        Value::String(s) => Ok(CellValue::Text(s.clone())),
        Value::Array(_) => Err("arrays nest at most two levels".to_string()),
        Value::Object(_) => Err("objects are not cell values".to_string()),
    }
}
