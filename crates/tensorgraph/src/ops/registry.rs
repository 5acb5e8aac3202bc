//! Read-mostly registry of custom operators.
//!
//! The registry is populated once before graph construction begins and then
//! consumed by the record decoder, which receives it by reference rather than
//! through ambient global state. Keys are either explicit opcodes or the
//! stable hash of an operator name.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::CustomOp;

/// Maps opcode/name-hash keys to shared operator instances.
#[derive(Default)]
pub struct OpRegistry {
    ops: RwLock<HashMap<i64, Arc<dyn CustomOp>>>,
}

impl OpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an operator under an explicit key, replacing any previous
    /// registration for that key.
    pub fn register(&self, key: i64, op: Arc<dyn CustomOp>) {
        self.ops.write().unwrap().insert(key, op);
    }

    /// Registers an operator under the hash of its descriptor name and returns
    /// the key it was stored under.
    pub fn register_named(&self, op: Arc<dyn CustomOp>) -> i64 {
        let key = Self::hash_name(op.descriptor().name());
        self.register(key, op);
        key
    }

    /// Resolves an operator by key. `None` means the key was never registered.
    pub fn lookup(&self, key: i64) -> Option<Arc<dyn CustomOp>> {
        self.ops.read().unwrap().get(&key).map(Arc::clone)
    }

    pub fn has(&self, key: i64) -> bool {
        self.ops.read().unwrap().contains_key(&key)
    }

    pub fn keys(&self) -> Vec<i64> {
        self.ops.read().unwrap().keys().copied().collect()
    }

    /// Stable 64-bit FNV-1a hash of an operator name, truncated into the
    /// non-negative opcode space.
    pub fn hash_name(name: &str) -> i64 {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
        let mut hash = FNV_OFFSET;
        for byte in name.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        (hash >> 1) as i64
    }
}
