//! Error taxonomy for graph construction and the variable space.

use thiserror::Error;

use crate::ops::OpCategory;
use crate::tensor::DType;

/// Errors raised while constructing graph nodes or manipulating variable spaces.
///
/// Construction-time configuration errors are fatal for the node being built;
/// the enclosing graph builder decides whether to retry with corrected input.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Node declared Custom without an operator instance to bind.
    #[error("node {node} is declared Custom but no operator instance was supplied")]
    MissingCustomOp { node: i32 },

    /// Custom node referenced an opcode the registry has never seen.
    #[error("no operation registered under key {opcode}")]
    OperationNotRegistered { opcode: i64 },

    /// Loop-entry node decoded without a frame id.
    #[error("node {node} is an Enter node but carries no frame id")]
    MissingFrameId { node: i32 },

    /// Category has no legacy operator constructor (Custom/Logic are built
    /// through their own paths).
    #[error("category {category:?} has no legacy operator constructor")]
    BadCategory { category: OpCategory },

    /// A node's argument block is finalized exactly once; a second seal is a
    /// programming error.
    #[error("argument block for node {node} is already sealed")]
    BlockAlreadySealed { node: i32 },

    /// Duplicate registration of an occupied variable key.
    #[error("variable already registered under {key}")]
    VariableAlreadyExists { key: String },

    #[error("no variable registered under {key}")]
    VariableNotFound { key: String },

    /// Typed tensor access on an unsupported dtype.
    #[error("typed access on dtype {dtype:?} is not supported here")]
    ScalarDType { dtype: DType },

    /// Buffer length disagrees with the size the tensor spec implies.
    #[error("element/byte count mismatch: expected {expected}, got {actual}")]
    ElementCountMismatch { expected: usize, actual: usize },
}
