//! Operator identity, descriptors, and ownership.
//!
//! Every graph node names its operator as a category tag plus a numeric opcode
//! within that category. The legacy elementwise/reduction categories resolve to
//! an owned [`LegacyOp`] through a category-keyed dispatch; Custom nodes borrow
//! a shared [`CustomOp`] from the [`registry::OpRegistry`]. The two ownership
//! modes are explicit in [`OpBinding`] so teardown never depends on caller
//! discipline.

pub mod registry;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::ArgBlock;
use crate::tensor::Tensor;

/// Well-known opcodes inside the Logic category.
pub mod opcode {
    /// Loop-frame entry. Enter nodes must carry a frame id.
    pub const LOGIC_ENTER: i64 = 100;
    /// Switch. Divergence point: selects among existing tensors, never
    /// allocates.
    pub const LOGIC_SWITCH: i64 = 30;
}

/// Operator category tag. Immutable for the lifetime of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpCategory {
    Pairwise,
    PairwiseBool,
    TransformStrict,
    TransformSame,
    TransformFloat,
    TransformBool,
    Scalar,
    ScalarBool,
    Reduce3,
    ReduceSame,
    ReduceFloat,
    ReduceLong,
    ReduceBool,
    IndexReduce,
    SummaryStats,
    Random,
    Broadcast,
    BroadcastBool,
    Custom,
    Logic,
}

impl OpCategory {
    /// Returns `true` for the elementwise/reduction family whose operators the
    /// node instantiates (and therefore owns) itself.
    pub fn is_legacy(self) -> bool {
        !matches!(self, OpCategory::Custom | OpCategory::Logic)
    }

    fn token(self) -> &'static str {
        match self {
            OpCategory::Pairwise => "pairwise",
            OpCategory::PairwiseBool => "pairwise_bool",
            OpCategory::TransformStrict => "transform_strict",
            OpCategory::TransformSame => "transform_same",
            OpCategory::TransformFloat => "transform_float",
            OpCategory::TransformBool => "transform_bool",
            OpCategory::Scalar => "scalar",
            OpCategory::ScalarBool => "scalar_bool",
            OpCategory::Reduce3 => "reduce3",
            OpCategory::ReduceSame => "reduce_same",
            OpCategory::ReduceFloat => "reduce_float",
            OpCategory::ReduceLong => "reduce_long",
            OpCategory::ReduceBool => "reduce_bool",
            OpCategory::IndexReduce => "index_reduce",
            OpCategory::SummaryStats => "summary_stats",
            OpCategory::Random => "random",
            OpCategory::Broadcast => "broadcast",
            OpCategory::BroadcastBool => "broadcast_bool",
            OpCategory::Custom => "custom",
            OpCategory::Logic => "logic",
        }
    }
}

/// Declared shape of an operator: name, arity bounds, in-place eligibility,
/// and whether the operator is a divergence (branch) point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpDescriptor {
    name: String,
    inputs: usize,
    outputs: usize,
    allows_inplace: bool,
    divergent: bool,
}

impl OpDescriptor {
    pub fn new(name: impl Into<String>, inputs: usize, outputs: usize) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            allows_inplace: false,
            divergent: false,
        }
    }

    pub fn allow_inplace(mut self, allowed: bool) -> Self {
        self.allows_inplace = allowed;
        self
    }

    pub fn divergent(mut self, divergent: bool) -> Self {
        self.divergent = divergent;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn allows_inplace(&self) -> bool {
        self.allows_inplace
    }

    pub fn is_divergent(&self) -> bool {
        self.divergent
    }
}

/// Concrete operator instance for the legacy elementwise/reduction family.
///
/// Carries only identity and declared shape; the numeric kernel is resolved by
/// the execution engine from `(category, opcode)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyOp {
    category: OpCategory,
    opcode: i64,
    descriptor: OpDescriptor,
    scalar: Option<Tensor>,
}

impl LegacyOp {
    /// Category-keyed constructor dispatch.
    ///
    /// `num_inputs` is only consulted for variadic categories (Random). The
    /// scalar payload is retained for the scalar categories, which fold it
    /// into kernel invocation.
    pub fn build(
        category: OpCategory,
        opcode: i64,
        num_inputs: usize,
        scalar: Option<&Tensor>,
    ) -> Result<Self, GraphError> {
        let (inputs, allows_inplace) = match category {
            OpCategory::Pairwise
            | OpCategory::PairwiseBool
            | OpCategory::Broadcast
            | OpCategory::BroadcastBool => (2, true),
            OpCategory::TransformStrict
            | OpCategory::TransformSame
            | OpCategory::TransformFloat
            | OpCategory::TransformBool
            | OpCategory::Scalar
            | OpCategory::ScalarBool => (1, true),
            OpCategory::Reduce3 => (2, false),
            OpCategory::ReduceSame
            | OpCategory::ReduceFloat
            | OpCategory::ReduceLong
            | OpCategory::ReduceBool
            | OpCategory::IndexReduce
            | OpCategory::SummaryStats => (1, false),
            OpCategory::Random => (num_inputs.max(1), false),
            OpCategory::Custom | OpCategory::Logic => {
                return Err(GraphError::BadCategory { category })
            }
        };
        let descriptor = OpDescriptor::new(format!("{}_{}", category.token(), opcode), inputs, 1)
            .allow_inplace(allows_inplace);
        let scalar = match category {
            OpCategory::Scalar | OpCategory::ScalarBool => scalar.cloned(),
            _ => None,
        };
        Ok(Self {
            category,
            opcode,
            descriptor,
            scalar,
        })
    }

    pub fn category(&self) -> OpCategory {
        self.category
    }

    pub fn opcode(&self) -> i64 {
        self.opcode
    }

    pub fn descriptor(&self) -> &OpDescriptor {
        &self.descriptor
    }

    pub fn scalar(&self) -> Option<&Tensor> {
        self.scalar.as_ref()
    }
}

/// Contract for custom operators registered outside the legacy family.
///
/// The execution engine resolves a node's inputs from the variable space and
/// invokes `execute` with the node's argument block; the operator returns its
/// output tensors in slot order.
pub trait CustomOp: Send + Sync {
    fn descriptor(&self) -> &OpDescriptor;

    fn execute(&self, block: &ArgBlock, inputs: &[&Tensor]) -> Result<Vec<Tensor>, GraphError>;
}

/// Operator reference held by a graph node.
///
/// `Owned` operators were instantiated by the node ("deductable") and are
/// dropped with it; `Borrowed` operators live in the registry and are shared.
#[derive(Clone)]
pub enum OpBinding {
    Owned(LegacyOp),
    Borrowed(Arc<dyn CustomOp>),
}

impl OpBinding {
    pub fn descriptor(&self) -> &OpDescriptor {
        match self {
            OpBinding::Owned(op) => op.descriptor(),
            OpBinding::Borrowed(op) => op.descriptor(),
        }
    }

    /// Returns `true` when the node owns (and will drop) the instance.
    pub fn is_owned(&self) -> bool {
        matches!(self, OpBinding::Owned(_))
    }
}

impl fmt::Debug for OpBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpBinding::Owned(op) => f.debug_tuple("Owned").field(&op.descriptor().name()).finish(),
            OpBinding::Borrowed(op) => f
                .debug_tuple("Borrowed")
                .field(&op.descriptor().name())
                .finish(),
        }
    }
}
