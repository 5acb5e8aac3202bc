//! Serialized node records.
//!
//! A [`NodeRecord`] is the structured form of one graph node as it appears in
//! a serialized graph: every field beyond the identity triple is optional.
//! Bincode is the compact wire encoding; JSON is kept for debugging and
//! fixtures, mirroring the dual encoding used elsewhere in the workspace.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ops::OpCategory;
use crate::tensor::{DType, Tensor};

/// Decoded form of one serialized graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: i32,
    pub op_type: OpCategory,
    pub op_num: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scope_id: i32,
    #[serde(default)]
    pub scope_name: Option<String>,
    #[serde(default)]
    pub scalar: Option<Tensor>,
    /// Flat input node ids; output slot 0 is implied.
    #[serde(default)]
    pub input: Vec<i32>,
    /// Paired `(node, slot)` input references. Takes precedence over `input`.
    #[serde(default)]
    pub input_paired: Vec<(i32, i32)>,
    /// Present in the wire format but ignored by node construction: output
    /// wiring is re-derived by the graph assembler.
    #[serde(default)]
    pub output: Vec<i32>,
    #[serde(default)]
    pub dimensions: Vec<i64>,
    #[serde(default)]
    pub extra_params: Vec<f32>,
    /// Extra integer arguments. For Logic/Enter nodes the first value is the
    /// loop frame id.
    #[serde(default)]
    pub extra_integer: Vec<i64>,
    #[serde(default)]
    pub extra_bools: Vec<bool>,
    #[serde(default)]
    pub extra_types: Vec<DType>,
}

impl NodeRecord {
    /// Record with the identity triple set and every optional field empty.
    pub fn new(id: i32, op_type: OpCategory, op_num: i64) -> Self {
        Self {
            id,
            op_type,
            op_num,
            name: None,
            scope_id: 0,
            scope_name: None,
            scalar: None,
            input: Vec::new(),
            input_paired: Vec::new(),
            output: Vec::new(),
            dimensions: Vec::new(),
            extra_params: Vec::new(),
            extra_integer: Vec::new(),
            extra_bools: Vec::new(),
            extra_types: Vec::new(),
        }
    }

    pub fn to_json_string(&self) -> Result<String, RecordSerdeError> {
        serde_json::to_string_pretty(self).map_err(RecordSerdeError::from)
    }

    pub fn from_json_str(src: &str) -> Result<Self, RecordSerdeError> {
        serde_json::from_str(src).map_err(RecordSerdeError::from)
    }

    pub fn to_bincode_bytes(&self) -> Result<Vec<u8>, RecordSerdeError> {
        bincode::serialize(self).map_err(RecordSerdeError::from)
    }

    pub fn from_bincode_slice(bytes: &[u8]) -> Result<Self, RecordSerdeError> {
        bincode::deserialize(bytes).map_err(RecordSerdeError::from)
    }
}

/// Codec failures while reading or writing node records.
#[derive(Debug, Error)]
pub enum RecordSerdeError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}
