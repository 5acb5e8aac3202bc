//! Variable storage for graph execution.
//!
//! A [`VariableSpace`] maps `(node, slot)` pairs and symbolic names to
//! [`Variable`]s holding tensors. Plain node ids alias slot 0 of that node, so
//! `get(2)` and `get_pair(2, 0)` resolve the same entry while `(2, 3)` stays
//! invisible to the id form. The space tracks external and internal memory
//! separately; external variables are graph boundary values owned by the
//! caller, internal ones are produced during execution.

use std::collections::HashMap;

use crate::error::GraphError;
use crate::tensor::Tensor;

/// One stored tensor plus its ownership marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    tensor: Tensor,
    name: Option<String>,
    external: bool,
}

impl Variable {
    pub fn new(tensor: Tensor) -> Self {
        Self {
            tensor,
            name: None,
            external: false,
        }
    }

    pub fn with_name(tensor: Tensor, name: impl Into<String>) -> Self {
        Self {
            tensor,
            name: Some(name.into()),
            external: false,
        }
    }

    /// Marks the variable as a graph boundary value.
    pub fn mark_external(mut self, external: bool) -> Self {
        self.external = external;
        self
    }

    pub fn is_external(&self) -> bool {
        self.external
    }

    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    pub fn tensor_mut(&mut self) -> &mut Tensor {
        &mut self.tensor
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn byte_len(&self) -> usize {
        self.tensor.byte_len()
    }
}

#[derive(Debug, Clone)]
struct Entry {
    variable: Variable,
    pair: (i32, i32),
}

/// Keyed store of execution variables with byte-level memory accounting.
#[derive(Debug, Clone, Default)]
pub struct VariableSpace {
    entries: Vec<Entry>,
    by_pair: HashMap<(i32, i32), usize>,
    by_name: HashMap<String, usize>,
    external_bytes: usize,
    internal_bytes: usize,
}

impl VariableSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a variable under a `(node, slot)` pair. If the variable carries a
    /// name it is additionally indexed by that name. Duplicate keys are
    /// rejected rather than silently replaced.
    pub fn put(&mut self, pair: (i32, i32), variable: Variable) -> Result<(), GraphError> {
        if self.by_pair.contains_key(&pair) {
            return Err(GraphError::VariableAlreadyExists {
                key: format!("({}, {})", pair.0, pair.1),
            });
        }
        if let Some(name) = variable.name() {
            if self.by_name.contains_key(name) {
                return Err(GraphError::VariableAlreadyExists {
                    key: name.to_owned(),
                });
            }
        }

        let index = self.entries.len();
        if variable.is_external() {
            self.external_bytes += variable.byte_len();
        } else {
            self.internal_bytes += variable.byte_len();
        }
        if let Some(name) = variable.name() {
            self.by_name.insert(name.to_owned(), index);
        }
        self.by_pair.insert(pair, index);
        self.entries.push(Entry { variable, pair });
        Ok(())
    }

    /// Stores a variable under a plain node id, aliasing pair `(id, 0)`.
    pub fn put_by_id(&mut self, id: i32, variable: Variable) -> Result<(), GraphError> {
        self.put((id, 0), variable)
    }

    /// Stores a variable under a pair and indexes it by `name`, replacing any
    /// name the variable already carries.
    pub fn put_named(
        &mut self,
        pair: (i32, i32),
        name: impl Into<String>,
        mut variable: Variable,
    ) -> Result<(), GraphError> {
        variable.name = Some(name.into());
        self.put(pair, variable)
    }

    pub fn has(&self, id: i32) -> bool {
        self.has_pair(id, 0)
    }

    pub fn has_pair(&self, node: i32, slot: i32) -> bool {
        self.by_pair.contains_key(&(node, slot))
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Resolves a plain node id, i.e. pair `(id, 0)`. A variable stored under a
    /// nonzero slot is not visible through this form.
    pub fn get(&self, id: i32) -> Option<&Variable> {
        self.get_pair(id, 0)
    }

    pub fn get_pair(&self, node: i32, slot: i32) -> Option<&Variable> {
        self.by_pair
            .get(&(node, slot))
            .map(|index| &self.entries[*index].variable)
    }

    pub fn get_name(&self, name: &str) -> Option<&Variable> {
        self.by_name
            .get(name)
            .map(|index| &self.entries[*index].variable)
    }

    pub fn get_mut(&mut self, id: i32) -> Option<&mut Variable> {
        self.get_pair_mut(id, 0)
    }

    pub fn get_pair_mut(&mut self, node: i32, slot: i32) -> Option<&mut Variable> {
        let index = *self.by_pair.get(&(node, slot))?;
        Some(&mut self.entries[index].variable)
    }

    /// Fallible form of [`get_pair`](Self::get_pair) for callers that treat a
    /// missing variable as an error.
    pub fn require_pair(&self, node: i32, slot: i32) -> Result<&Variable, GraphError> {
        self.get_pair(node, slot)
            .ok_or_else(|| GraphError::VariableNotFound {
                key: format!("({node}, {slot})"),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes held by external (caller-owned boundary) variables.
    pub fn external_memory(&self) -> usize {
        self.external_bytes
    }

    /// Bytes held by variables produced during execution.
    pub fn internal_memory(&self) -> usize {
        self.internal_bytes
    }

    /// Pairs of every stored variable, in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.entries.iter().map(|entry| entry.pair)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.entries.iter().map(|entry| &entry.variable)
    }
}
