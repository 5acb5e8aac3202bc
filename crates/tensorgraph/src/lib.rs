//! Computation-graph node model: operator identity and dispatch, typed
//! argument blocks, serialized node records, and keyed variable storage.
//!
//! The crate covers the structural layer of a graph executor. [`GraphNode`]
//! carries wiring, operator binding, and control-flow markers; [`ArgBlock`]
//! holds the typed arguments an operator sees at execution time;
//! [`VariableSpace`] stores the tensors flowing between nodes. Nodes are built
//! programmatically or decoded from [`NodeRecord`]s, resolving custom
//! operators through an [`ops::registry::OpRegistry`] passed in by the caller.

pub mod error;
pub mod graph;
pub mod ops;
pub mod tensor;

pub use error::GraphError;
pub use graph::{ArgBlock, GraphNode, NodeRecord, Variable, VariableSpace};
pub use ops::registry::OpRegistry;
pub use ops::{CustomOp, LegacyOp, OpBinding, OpCategory, OpDescriptor};
pub use tensor::{DType, Tensor, TensorSpec};
