//! Graph node construction, argument blocks, serialized records, and the
//! variable space.

mod argblock;
mod node;
mod record;
mod varspace;

pub use argblock::ArgBlock;
pub use node::GraphNode;
pub use record::{NodeRecord, RecordSerdeError};
pub use varspace::{Variable, VariableSpace};
