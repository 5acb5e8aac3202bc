//! Dense tensor storage used by graph nodes and variable spaces.
//!
//! The graph core treats tensor buffers as opaque storage with a known byte
//! size. Only the handful of typed accessors the graph itself needs (scalar
//! payloads, f32 fill/readback for tests and boundary values) live here;
//! kernel math stays with the execution backends.

use half::{bf16, f16};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Enumerates scalar element types carried through the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F16,
    Bf16,
    F32,
    F64,
}

impl DType {
    /// Returns the storage size of one element in bytes.
    pub fn size_in_bytes(self) -> usize {
        match self {
            DType::Bool | DType::I8 | DType::U8 => 1,
            DType::I16 | DType::U16 | DType::F16 | DType::Bf16 => 2,
            DType::I32 | DType::U32 | DType::F32 => 4,
            DType::I64 | DType::U64 | DType::F64 => 8,
        }
    }

    /// Returns `true` when the dtype is a floating-point representation.
    pub fn is_float(self) -> bool {
        matches!(self, DType::F16 | DType::Bf16 | DType::F32 | DType::F64)
    }

    /// Returns `true` when the dtype is any signed or unsigned integer.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            DType::I8
                | DType::U8
                | DType::I16
                | DType::U16
                | DType::I32
                | DType::U32
                | DType::I64
                | DType::U64
        )
    }
}

/// Tensor metadata coupling dtype and static shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TensorSpec {
    pub dtype: DType,
    pub dims: Vec<usize>,
}

impl TensorSpec {
    pub fn new(dtype: DType, dims: impl Into<Vec<usize>>) -> Self {
        Self {
            dtype,
            dims: dims.into(),
        }
    }

    /// Spec of a rank-0 tensor.
    pub fn scalar(dtype: DType) -> Self {
        Self::new(dtype, Vec::new())
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total element count. Rank-0 tensors hold one element.
    pub fn element_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Total storage size in bytes.
    pub fn byte_len(&self) -> usize {
        self.element_count() * self.dtype.size_in_bytes()
    }
}

/// Owned dense tensor buffer.
///
/// Cloning copies the underlying storage, so clones never alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    spec: TensorSpec,
    data: Vec<u8>,
}

impl Tensor {
    /// Allocates a zero-filled tensor for the given spec.
    pub fn zeros(spec: TensorSpec) -> Self {
        let len = spec.byte_len();
        Self {
            spec,
            data: vec![0u8; len],
        }
    }

    /// Builds a rank-0 f32 tensor holding `value`.
    pub fn scalar_f32(value: f32) -> Self {
        Self {
            spec: TensorSpec::scalar(DType::F32),
            data: value.to_le_bytes().to_vec(),
        }
    }

    /// Builds an f32 tensor from explicit dimensions and values.
    pub fn from_f32(dims: impl Into<Vec<usize>>, values: &[f32]) -> Result<Self, GraphError> {
        let spec = TensorSpec::new(DType::F32, dims);
        if spec.element_count() != values.len() {
            return Err(GraphError::ElementCountMismatch {
                expected: spec.element_count(),
                actual: values.len(),
            });
        }
        let mut data = Vec::with_capacity(spec.byte_len());
        for value in values {
            data.extend_from_slice(&value.to_le_bytes());
        }
        Ok(Self { spec, data })
    }

    /// Reconstructs a tensor from a decoded spec and raw bytes.
    pub fn from_bytes(spec: TensorSpec, data: Vec<u8>) -> Result<Self, GraphError> {
        if spec.byte_len() != data.len() {
            return Err(GraphError::ElementCountMismatch {
                expected: spec.byte_len(),
                actual: data.len(),
            });
        }
        Ok(Self { spec, data })
    }

    pub fn spec(&self) -> &TensorSpec {
        &self.spec
    }

    pub fn dtype(&self) -> DType {
        self.spec.dtype
    }

    /// Storage size in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Reads element 0 widened to f64, regardless of stored dtype.
    pub fn read_scalar_f64(&self) -> Result<f64, GraphError> {
        let size = self.spec.dtype.size_in_bytes();
        let raw = self
            .data
            .get(..size)
            .ok_or(GraphError::ElementCountMismatch {
                expected: size,
                actual: self.data.len(),
            })?;
        let value = match self.spec.dtype {
            DType::Bool => {
                if raw[0] != 0 {
                    1.0
                } else {
                    0.0
                }
            }
            DType::I8 => f64::from(raw[0] as i8),
            DType::U8 => f64::from(raw[0]),
            DType::I16 => f64::from(i16::from_le_bytes([raw[0], raw[1]])),
            DType::U16 => f64::from(u16::from_le_bytes([raw[0], raw[1]])),
            DType::I32 => f64::from(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
            DType::U32 => f64::from(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
            DType::I64 => i64::from_le_bytes(raw.try_into().expect("8-byte slice")) as f64,
            DType::U64 => u64::from_le_bytes(raw.try_into().expect("8-byte slice")) as f64,
            DType::F16 => f64::from(f16::from_le_bytes([raw[0], raw[1]])),
            DType::Bf16 => f64::from(bf16::from_le_bytes([raw[0], raw[1]])),
            DType::F32 => f64::from(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
            DType::F64 => f64::from_le_bytes(raw.try_into().expect("8-byte slice")),
        };
        Ok(value)
    }

    /// Overwrites every element with `value`. F32 tensors only.
    pub fn fill_f32(&mut self, value: f32) -> Result<(), GraphError> {
        if self.spec.dtype != DType::F32 {
            return Err(GraphError::ScalarDType {
                dtype: self.spec.dtype,
            });
        }
        let bytes = value.to_le_bytes();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&bytes);
        }
        Ok(())
    }

    /// Reads the full buffer back as f32 values. F32 tensors only.
    pub fn to_f32_vec(&self) -> Result<Vec<f32>, GraphError> {
        if self.spec.dtype != DType::F32 {
            return Err(GraphError::ScalarDType {
                dtype: self.spec.dtype,
            });
        }
        Ok(self
            .data
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }
}
