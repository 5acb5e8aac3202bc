//! Typed operator argument blocks.

use smallvec::SmallVec;

use crate::ops::OpDescriptor;
use crate::tensor::DType;

/// Ordered container of typed operator arguments.
///
/// Each block is owned by exactly one [`GraphNode`](super::GraphNode) and
/// mutated only while that node is under construction. The node seals the
/// block exactly once at the end of construction; if the block declares no
/// input references of its own by then, it snapshots the node's wiring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgBlock {
    iargs: Vec<i64>,
    targs: Vec<f64>,
    bargs: Vec<bool>,
    dargs: Vec<DType>,
    axis: SmallVec<[i64; 4]>,
    inputs: Vec<(i32, i32)>,
    descriptor: Option<OpDescriptor>,
    inplace: bool,
}

impl ArgBlock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn iargs(&self) -> &[i64] {
        &self.iargs
    }

    pub fn targs(&self) -> &[f64] {
        &self.targs
    }

    pub fn bargs(&self) -> &[bool] {
        &self.bargs
    }

    pub fn dargs(&self) -> &[DType] {
        &self.dargs
    }

    pub fn axis(&self) -> &[i64] {
        &self.axis
    }

    /// Resolved `(node, slot)` input references.
    pub fn inputs(&self) -> &[(i32, i32)] {
        &self.inputs
    }

    pub fn descriptor(&self) -> Option<&OpDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn is_inplace(&self) -> bool {
        self.inplace
    }

    pub(crate) fn extend_iargs(&mut self, values: impl IntoIterator<Item = i64>) {
        self.iargs.extend(values);
    }

    pub(crate) fn extend_targs(&mut self, values: impl IntoIterator<Item = f64>) {
        self.targs.extend(values);
    }

    pub(crate) fn extend_bargs(&mut self, values: impl IntoIterator<Item = bool>) {
        self.bargs.extend(values);
    }

    pub(crate) fn extend_dargs(&mut self, values: impl IntoIterator<Item = DType>) {
        self.dargs.extend(values);
    }

    pub(crate) fn extend_axis(&mut self, values: impl IntoIterator<Item = i64>) {
        self.axis.extend(values);
    }

    pub(crate) fn push_input(&mut self, reference: (i32, i32)) {
        self.inputs.push(reference);
    }

    pub(crate) fn set_descriptor(&mut self, descriptor: OpDescriptor) {
        self.descriptor = Some(descriptor);
    }

    pub(crate) fn set_inplace(&mut self, inplace: bool) {
        self.inplace = inplace;
    }
}
