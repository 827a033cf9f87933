//! Constant pool implementation
//!
//! Holds the wide push immediates the optimizer lifts out of the code. An
//! entry's position is the one-byte operand of the `PUSHC` that references
//! it, which caps the pool at 256 entries.

use primitive_types::U256;
use tracing::trace;

use crate::error::{BytecodeError, Result};

/// Deduplicating, insertion-ordered pool of 256-bit constants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantPool {
    constants: Vec<U256>,
}

impl ConstantPool {
    /// Maximum number of entries addressable by a one-byte index
    pub const MAX_CONSTANTS: usize = 256;

    pub fn new() -> Self {
        Self {
            constants: Vec::new(),
        }
    }

    /// Return the index of `value`, appending it if it is not pooled yet.
    ///
    /// `None` means the pool is full and the caller must keep the original
    /// instruction. The search is linear so indices only depend on the order
    /// in which values were first seen.
    pub fn insert_or_find(&mut self, value: U256) -> Option<u8> {
        trace!(%value, "pool constant");
        if let Some(index) = self.constants.iter().position(|pooled| *pooled == value) {
            return Some(index as u8);
        }

        if self.is_full() {
            return None;
        }

        let index = self.constants.len() as u8;
        self.constants.push(value);
        trace!(%value, index, "constant pooled");
        Some(index)
    }

    /// Constant referenced by a `PUSHC` operand
    #[inline]
    pub fn get(&self, index: u8) -> Result<&U256> {
        self.constants
            .get(index as usize)
            .ok_or(BytecodeError::InvalidConstantIndex {
                index,
                len: self.constants.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.constants.len() >= Self::MAX_CONSTANTS
    }

    pub fn iter(&self) -> impl Iterator<Item = &U256> {
        self.constants.iter()
    }

    pub fn as_slice(&self) -> &[U256] {
        &self.constants
    }
}
