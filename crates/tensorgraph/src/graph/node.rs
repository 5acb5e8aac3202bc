//! Graph node representation.
//!
//! A [`GraphNode`] identifies one vertex of the computation graph: operator
//! identity, input/output wiring, the sealed argument block, in-place and
//! ownership semantics, and the control-flow markers loop constructs need.
//! Nodes are built either programmatically or from a decoded [`NodeRecord`];
//! both paths establish the same invariants. Once construction finishes a node
//! is read-only except for the active flag and scope/frame assignment.

use smallvec::SmallVec;

use crate::error::GraphError;
use crate::ops::registry::OpRegistry;
use crate::ops::{opcode, CustomOp, LegacyOp, OpBinding, OpCategory};
use crate::tensor::Tensor;

use super::argblock::ArgBlock;
use super::record::NodeRecord;

use std::sync::Arc;

/// One vertex of the computation graph.
#[derive(Debug, Clone)]
pub struct GraphNode {
    id: i32,
    name: Option<String>,
    category: OpCategory,
    opcode: i64,
    inputs: Vec<(i32, i32)>,
    outputs: Vec<(i32, i32)>,
    dimensions: SmallVec<[i64; 4]>,
    scalar: Tensor,
    op: Option<OpBinding>,
    block: Option<ArgBlock>,
    has_external_inputs: bool,
    has_internal_inputs: bool,
    has_external_outputs: bool,
    has_internal_outputs: bool,
    inplace: bool,
    active: bool,
    scope_id: i32,
    scope_name: Option<String>,
    frame_id: Option<i64>,
    rewind_node: i32,
    rewind_layer: (i32, i32),
    referenced_by: Vec<i32>,
}

impl GraphNode {
    fn base(category: OpCategory, op_num: i64, id: i32, scalar: f32) -> Self {
        Self {
            id,
            name: None,
            category,
            opcode: op_num,
            inputs: Vec::new(),
            outputs: Vec::new(),
            dimensions: SmallVec::new(),
            scalar: Tensor::scalar_f32(scalar),
            op: None,
            block: None,
            has_external_inputs: false,
            has_internal_inputs: false,
            has_external_outputs: false,
            has_internal_outputs: false,
            inplace: false,
            active: true,
            scope_id: 0,
            scope_name: None,
            frame_id: None,
            rewind_node: -1,
            rewind_layer: (-1, -1),
            referenced_by: Vec::new(),
        }
    }

    /// Builds a node programmatically from explicit operator identity, wiring,
    /// and argument lists.
    ///
    /// Legacy categories instantiate (and own) their operator here; the
    /// Custom category requires an explicit instance and must go through
    /// [`GraphNode::with_custom_op`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        category: OpCategory,
        op_num: i64,
        id: i32,
        inputs: &[i32],
        outputs: &[i32],
        dimensions: &[i64],
        scalar: f32,
        targs: &[f64],
        iargs: &[i64],
    ) -> Result<Self, GraphError> {
        let mut node = Self::base(category, op_num, id, scalar);
        for input in inputs {
            node.pick_input(*input);
        }
        for output in outputs {
            node.pick_output(*output);
        }
        node.dimensions.extend_from_slice(dimensions);

        if category.is_legacy() {
            let mut block = ArgBlock::new();
            block.extend_axis(dimensions.iter().copied());
            block.extend_iargs(iargs.iter().copied());
            block.extend_targs(targs.iter().copied());

            let op = LegacyOp::build(category, op_num, inputs.len(), Some(&node.scalar))?;
            block.set_descriptor(op.descriptor().clone());
            node.op = Some(OpBinding::Owned(op));

            // Single-output legacy ops may compute into their input buffer.
            if node.outputs.len() <= 1 {
                node.inplace = true;
            }
            node.apply_divergence_rule();
            node.seal_block(block)?;
        } else if category == OpCategory::Custom {
            return Err(GraphError::MissingCustomOp { node: id });
        } else {
            node.apply_divergence_rule();
            node.seal_block(ArgBlock::new())?;
        }

        Ok(node)
    }

    /// Builds a Custom node around an externally-owned operator instance.
    ///
    /// The node borrows the operator; dropping the node never drops the
    /// instance.
    #[allow(clippy::too_many_arguments)]
    pub fn with_custom_op(
        op: Arc<dyn CustomOp>,
        id: i32,
        inputs: &[i32],
        outputs: &[i32],
        dimensions: &[i64],
        scalar: f32,
        targs: &[f64],
        iargs: &[i64],
    ) -> Result<Self, GraphError> {
        let op_num = OpRegistry::hash_name(op.descriptor().name());
        let mut node = Self::base(OpCategory::Custom, op_num, id, scalar);
        for input in inputs {
            node.pick_input(*input);
        }
        for output in outputs {
            node.pick_output(*output);
        }
        node.dimensions.extend_from_slice(dimensions);

        let mut block = ArgBlock::new();
        block.extend_axis(dimensions.iter().copied());
        block.extend_iargs(iargs.iter().copied());
        block.extend_targs(targs.iter().copied());
        block.set_descriptor(op.descriptor().clone());

        node.op = Some(OpBinding::Borrowed(op));
        node.apply_divergence_rule();
        node.seal_block(block)?;
        Ok(node)
    }

    /// Reconstructs a node from a decoded serialized record.
    ///
    /// Custom operators are resolved through `registry` and borrowed, never
    /// owned. The record's `output` field is deliberately ignored; output
    /// wiring is re-derived by the graph assembler.
    pub fn from_record(record: &NodeRecord, registry: &OpRegistry) -> Result<Self, GraphError> {
        let mut node = Self::base(record.op_type, record.op_num, record.id, 0.0);
        node.name = record.name.clone();
        if record.scope_id != 0 {
            node.scope_id = record.scope_id;
        }
        node.scope_name = record.scope_name.clone();
        if let Some(scalar) = &record.scalar {
            node.scalar = scalar.clone();
        }

        if !record.input_paired.is_empty() {
            for pair in &record.input_paired {
                node.pick_input_pair(pair.0, pair.1);
            }
        } else if !record.input.is_empty() {
            for input in &record.input {
                node.pick_input(*input);
            }
        } else if record.op_type != OpCategory::Logic {
            tracing::debug!(
                node = record.id,
                name = record.name.as_deref().unwrap_or("<noname>"),
                "node has no inputs defined"
            );
        }

        node.dimensions.extend_from_slice(&record.dimensions);

        if record.op_type == OpCategory::Logic && record.op_num == opcode::LOGIC_ENTER {
            match record.extra_integer.first() {
                Some(frame) => node.frame_id = Some(*frame),
                None => return Err(GraphError::MissingFrameId { node: record.id }),
            }
        }

        if record.op_type.is_legacy() {
            if node.outputs.len() <= 1 {
                node.inplace = true;
            }
            // Without declared inputs there is nothing to size the operator
            // against; the node stays unbound, matching the decoded form.
            let declared_inputs = if !record.input_paired.is_empty() {
                record.input_paired.len()
            } else {
                record.input.len()
            };
            if declared_inputs > 0 {
                let mut block = ArgBlock::new();
                block.extend_axis(record.dimensions.iter().copied());
                block.extend_targs(record.extra_params.iter().map(|v| f64::from(*v)));
                block.extend_bargs(record.extra_bools.iter().copied());
                block.extend_iargs(record.extra_integer.iter().copied());
                block.extend_dargs(record.extra_types.iter().copied());

                let op = LegacyOp::build(
                    record.op_type,
                    record.op_num,
                    declared_inputs,
                    Some(&node.scalar),
                )?;
                block.set_descriptor(op.descriptor().clone());
                node.op = Some(OpBinding::Owned(op));
                node.apply_divergence_rule();
                node.seal_block(block)?;
            } else {
                node.apply_divergence_rule();
                node.seal_block(ArgBlock::new())?;
            }
        } else if record.op_type == OpCategory::Custom {
            let op = registry
                .lookup(record.op_num)
                .ok_or(GraphError::OperationNotRegistered {
                    opcode: record.op_num,
                })?;

            let mut block = ArgBlock::new();
            block.extend_iargs(record.extra_integer.iter().copied());
            block.extend_targs(record.extra_params.iter().map(|v| f64::from(*v)));
            block.extend_bargs(record.extra_bools.iter().copied());
            block.extend_dargs(record.extra_types.iter().copied());
            block.extend_axis(record.dimensions.iter().copied());
            block.set_descriptor(op.descriptor().clone());

            node.op = Some(OpBinding::Borrowed(op));
            node.apply_divergence_rule();
            node.seal_block(block)?;
        } else {
            node.apply_divergence_rule();
            node.seal_block(ArgBlock::new())?;
        }

        Ok(node)
    }

    fn pick_input(&mut self, input_id: i32) {
        self.pick_input_pair(input_id, 0);
    }

    fn pick_input_pair(&mut self, node_id: i32, slot: i32) {
        self.inputs.push((node_id, slot));
        if node_id < 0 {
            self.has_external_inputs = true;
        } else {
            self.has_internal_inputs = true;
        }
    }

    fn pick_output(&mut self, output_id: i32) {
        self.pick_output_pair(output_id, 0);
    }

    /// Registers an output reference. Assembler-facing: output wiring is
    /// derived during graph assembly, before execution begins.
    pub fn pick_output_pair(&mut self, node_id: i32, slot: i32) {
        self.outputs.push((node_id, slot));
        if node_id < 0 {
            self.has_external_outputs = true;
        } else {
            self.has_internal_outputs = true;
        }
    }

    /// Registers an output reference unless an identical one is already wired.
    pub fn pick_output_once(&mut self, node_id: i32, slot: i32) {
        if !self.outputs.contains(&(node_id, slot)) {
            self.pick_output_pair(node_id, slot);
        }
    }

    // Divergent ops (Switch etc.) are always in-place: they select among
    // existing tensors and never allocate.
    fn apply_divergence_rule(&mut self) {
        if self.is_divergence_point() {
            self.inplace = true;
        }
    }

    fn seal_block(&mut self, mut block: ArgBlock) -> Result<(), GraphError> {
        if self.block.is_some() {
            return Err(GraphError::BlockAlreadySealed { node: self.id });
        }
        if block.inputs().is_empty() {
            for pair in &self.inputs {
                block.push_input(*pair);
            }
        }
        block.set_inplace(self.inplace);
        self.block = Some(block);
        Ok(())
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn category(&self) -> OpCategory {
        self.category
    }

    pub fn op_num(&self) -> i64 {
        self.opcode
    }

    /// Input wiring as `(source node, source output slot)` pairs. Negative
    /// node ids denote graph-boundary inputs.
    pub fn inputs(&self) -> &[(i32, i32)] {
        &self.inputs
    }

    /// Output wiring as `(destination node, destination input slot)` pairs.
    pub fn outputs(&self) -> &[(i32, i32)] {
        &self.outputs
    }

    pub fn dimensions(&self) -> &[i64] {
        &self.dimensions
    }

    /// Scalar payload widened to f64.
    pub fn scalar(&self) -> Result<f64, GraphError> {
        self.scalar.read_scalar_f64()
    }

    pub fn operator(&self) -> Option<&OpBinding> {
        self.op.as_ref()
    }

    /// The node's sealed argument block. Every constructed node carries one;
    /// its input view is a snapshot of the wiring taken at seal time.
    pub fn arg_block(&self) -> &ArgBlock {
        self.block
            .as_ref()
            .expect("argument block is sealed during construction")
    }

    /// Returns `true` when the node owns its operator instance.
    pub fn is_deductable(&self) -> bool {
        self.op.as_ref().is_some_and(OpBinding::is_owned)
    }

    pub fn is_inplace(&self) -> bool {
        self.inplace
    }

    pub fn mark_inplace(&mut self, inplace: bool) {
        self.inplace = inplace;
        if let Some(block) = self.block.as_mut() {
            block.set_inplace(inplace);
        }
    }

    /// Divergence points select one of several outputs for activation and
    /// never allocate storage.
    pub fn is_divergence_point(&self) -> bool {
        if let Some(op) = &self.op {
            if op.descriptor().is_divergent() {
                return true;
            }
        }
        self.category == OpCategory::Logic && self.opcode == opcode::LOGIC_SWITCH
    }

    pub fn has_external_inputs(&self) -> bool {
        self.has_external_inputs
    }

    pub fn has_internal_inputs(&self) -> bool {
        self.has_internal_inputs
    }

    pub fn has_external_outputs(&self) -> bool {
        self.has_external_outputs
    }

    pub fn has_internal_outputs(&self) -> bool {
        self.has_internal_outputs
    }

    pub fn is_multi_input(&self) -> bool {
        self.inputs.len() > 1
    }

    pub fn is_multi_output(&self) -> bool {
        self.outputs.len() > 1
    }

    /// Loop iterations toggle this to skip inactive nodes.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Loop-frame identity for Enter nodes; `None` everywhere else.
    pub fn frame_id(&self) -> Option<i64> {
        self.frame_id
    }

    pub fn set_frame_id(&mut self, frame_id: i64) {
        self.frame_id = Some(frame_id);
    }

    pub fn is_scoped(&self) -> bool {
        self.scope_id != 0
    }

    pub fn set_scope_info(&mut self, id: i32, name: Option<&str>) {
        self.scope_id = id;
        self.scope_name = name.map(str::to_owned);
    }

    pub fn scope_id(&self) -> i32 {
        self.scope_id
    }

    pub fn scope_name(&self) -> Option<&str> {
        self.scope_name.as_deref()
    }

    /// Count of downstream nodes referencing this node as an input; used by
    /// graph compaction.
    pub fn total_references(&self) -> usize {
        self.referenced_by.len()
    }

    pub fn add_reference(&mut self, node_id: i32) {
        self.referenced_by.push(node_id);
    }

    /// Loop re-entry target.
    pub fn rewind_node(&self) -> i32 {
        self.rewind_node
    }

    pub fn set_rewind_node(&mut self, node_id: i32) {
        self.rewind_node = node_id;
    }

    pub fn rewind_layer(&self) -> (i32, i32) {
        self.rewind_layer
    }

    pub fn set_rewind_layer(&mut self, layer_id: i32, step_id: i32) {
        self.rewind_layer = (layer_id, step_id);
    }

    /// Operator-identity equality: same category and opcode.
    pub fn equals(&self, other: &GraphNode) -> bool {
        self.category == other.category && self.opcode == other.opcode
    }
}
