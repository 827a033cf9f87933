//! JUMPDEST analysis
//!
//! First pass over a freshly padded code space. It records every reachable
//! `JUMPDEST` and traps any byte that aliases an optimizer-only opcode, so
//! untrusted code can never enter a fast path that trusts its operands.

use primitive_types::U256;
use tracing::{debug, trace};

use crate::core::opcodes::{Opcode, is_synthetic, push_width};
use crate::error::{BytecodeError, Result};

/// Sorted offsets of the legal jump destinations of one program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JumpDestTable {
    dests: Vec<usize>,
    trapped: usize,
}

impl JumpDestTable {
    /// Scan `code` once, collecting jump destinations and rewriting synthetic
    /// opcode bytes to `BAD`.
    ///
    /// PUSHn immediates are stepped over, never inspected. The scan runs over
    /// the padding too; padding is all zeros (`STOP`) so it contributes
    /// nothing.
    #[tracing::instrument(level = "debug", skip_all, fields(len = code.len()))]
    pub fn build(code: &mut [u8]) -> Self {
        let mut dests = Vec::new();
        let mut trapped = 0;

        let mut pc = 0;
        while pc < code.len() {
            let op = code[pc];
            trace!(pc, op, "scan");

            if is_synthetic(op) {
                debug!(pc, op, "trapping synthetic opcode in user code");
                code[pc] = Opcode::BAD as u8;
                trapped += 1;
            }

            if op == Opcode::JUMPDEST as u8 {
                dests.push(pc);
            }

            pc += 1 + push_width(op);
        }

        if trapped > 0 {
            metrics::counter!("evm_bytecode_trapped_bytes").increment(trapped as u64);
        }
        debug!(jump_dests = dests.len(), trapped, "built JUMPDEST table");

        Self { dests, trapped }
    }

    /// Whether `dest` names a `JUMPDEST` in the original program
    #[inline]
    pub fn is_valid(&self, dest: U256) -> bool {
        self.position(dest).is_some()
    }

    #[inline]
    pub fn is_valid_offset(&self, offset: usize) -> bool {
        self.dests.binary_search(&offset).is_ok()
    }

    /// Index of `dest` within the table
    pub fn position(&self, dest: U256) -> Option<usize> {
        let offset = offset_of(dest)?;
        self.dests.binary_search(&offset).ok()
    }

    /// Check a dynamically computed jump target.
    ///
    /// A failure is a fatal fault for the running program.
    pub fn verify(&self, dest: U256) -> Result<usize> {
        offset_of(dest)
            .filter(|offset| self.is_valid_offset(*offset))
            .ok_or(BytecodeError::InvalidJump { destination: dest })
    }

    /// Number of synthetic opcode bytes replaced by `BAD`
    pub fn trapped(&self) -> usize {
        self.trapped
    }

    pub fn len(&self) -> usize {
        self.dests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.dests.iter().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.dests
    }
}

/// Destinations that do not fit in a code offset are never valid
fn offset_of(dest: U256) -> Option<usize> {
    if dest.bits() > 64 {
        return None;
    }
    usize::try_from(dest.low_u64()).ok()
}
