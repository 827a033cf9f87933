//! Code space: the owned, padded buffer a program is executed from
//!
//! Preparation is one-shot and strictly ordered:
//!
//! ```text
//! CodeSpace<Raw> --analyze--> CodeSpace<Analyzed> --optimize/finish--> CodeSpace<Prepared>
//! ```
//!
//! Each step consumes the previous phase, so the JUMPDEST scan can never be
//! rerun over code the optimizer has already rewritten.

use std::fmt;
use std::marker::PhantomData;

use primitive_types::U256;
use tracing::debug;

use crate::core::constants::ConstantPool;
use crate::core::instructions::Instructions;
use crate::core::jumpdest::JumpDestTable;
use crate::core::metrics::{MetricsTable, init_metrics};
use crate::core::opcodes::MAX_IMMEDIATE_WIDTH;
#[cfg(feature = "optimizer")]
use crate::core::optimizer::{OptimizerConfig, PeepholeOptimizer};
use crate::core::optimizer::OptimizationStats;
use crate::error::Result;

/// Zero bytes appended after the program.
///
/// Enough for a PUSH32 starting on the last real byte plus the byte after
/// it, so immediate decoding and the optimizer's look-ahead never need a
/// bounds check.
pub const CODE_PADDING: usize = MAX_IMMEDIATE_WIDTH + 1;

mod sealed {
    pub trait Sealed {}
}

/// Preparation phase of a [`CodeSpace`]
pub trait Phase: sealed::Sealed + fmt::Debug {}

/// Freshly copied and padded, not scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Raw;

/// JUMPDEST table built, synthetic bytes trapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analyzed;

/// Ready for the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prepared;

impl sealed::Sealed for Raw {}
impl sealed::Sealed for Analyzed {}
impl sealed::Sealed for Prepared {}
impl Phase for Raw {}
impl Phase for Analyzed {}
impl Phase for Prepared {}

/// Owned program buffer together with its side tables
#[derive(Debug, Clone)]
pub struct CodeSpace<P: Phase = Prepared> {
    code: Vec<u8>,
    len: usize,
    jump_dests: JumpDestTable,
    pool: ConstantPool,
    stats: OptimizationStats,
    _phase: PhantomData<P>,
}

impl<P: Phase> CodeSpace<P> {
    /// Whole buffer, padding included
    #[inline]
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Program bytes without the padding
    pub fn program(&self) -> &[u8] {
        &self.code[..self.len]
    }

    /// Length of the original program
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn padded_len(&self) -> usize {
        self.code.len()
    }

    fn into_phase<Q: Phase>(self) -> CodeSpace<Q> {
        CodeSpace {
            code: self.code,
            len: self.len,
            jump_dests: self.jump_dests,
            pool: self.pool,
            stats: self.stats,
            _phase: PhantomData,
        }
    }
}

impl CodeSpace<Raw> {
    /// Copy `program` into a new buffer followed by [`CODE_PADDING`] zeros
    pub fn new(program: &[u8]) -> Self {
        let mut code = Vec::with_capacity(program.len() + CODE_PADDING);
        code.extend_from_slice(program);
        code.resize(program.len() + CODE_PADDING, 0);

        Self {
            code,
            len: program.len(),
            jump_dests: JumpDestTable::default(),
            pool: ConstantPool::new(),
            stats: OptimizationStats::default(),
            _phase: PhantomData,
        }
    }

    /// Build the JUMPDEST table and trap synthetic opcodes
    pub fn analyze(mut self) -> CodeSpace<Analyzed> {
        self.jump_dests = JumpDestTable::build(&mut self.code);
        self.into_phase()
    }
}

impl CodeSpace<Analyzed> {
    pub fn jump_dests(&self) -> &JumpDestTable {
        &self.jump_dests
    }

    /// Walk the program instruction by instruction
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions::new(&self.code, self.len)
    }

    /// Run the peephole optimizer over the analyzed code
    #[cfg(feature = "optimizer")]
    pub fn optimize(mut self, config: &OptimizerConfig) -> CodeSpace<Prepared> {
        self.stats = PeepholeOptimizer::new(*config, &self.jump_dests, &mut self.pool)
            .run(&mut self.code, self.len);
        self.into_phase()
    }

    /// Hand the analyzed code to the dispatcher unchanged
    pub fn finish(self) -> CodeSpace<Prepared> {
        self.into_phase()
    }
}

impl CodeSpace<Prepared> {
    pub fn jump_dests(&self) -> &JumpDestTable {
        &self.jump_dests
    }

    /// Walk the prepared program; `PUSHC` spans the push it replaced
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions::new(&self.code, self.len)
    }

    pub fn constant_pool(&self) -> &ConstantPool {
        &self.pool
    }

    pub fn stats(&self) -> &OptimizationStats {
        &self.stats
    }

    /// Check a dynamic jump target, see [`JumpDestTable::verify`]
    #[inline]
    pub fn verify_jump(&self, dest: U256) -> Result<usize> {
        self.jump_dests.verify(dest)
    }

    /// Value pushed by a `PUSHC` with operand `index`
    #[inline]
    pub fn constant(&self, index: u8) -> Result<&U256> {
        self.pool.get(index)
    }

    /// Shared opcode metrics for dispatching this code
    pub fn metrics(&self) -> &'static MetricsTable {
        init_metrics()
    }
}

/// Prepare `program` for execution with the default optimizer settings
pub fn prepare(program: &[u8]) -> CodeSpace<Prepared> {
    #[cfg(feature = "optimizer")]
    {
        prepare_with(program, &OptimizerConfig::default())
    }
    #[cfg(not(feature = "optimizer"))]
    {
        init_metrics();
        prepared(CodeSpace::new(program).analyze().finish())
    }
}

/// Prepare `program` for execution with explicit optimizer settings
#[cfg(feature = "optimizer")]
#[tracing::instrument(level = "debug", skip_all, fields(len = program.len()))]
pub fn prepare_with(program: &[u8], config: &OptimizerConfig) -> CodeSpace<Prepared> {
    init_metrics();
    prepared(CodeSpace::new(program).analyze().optimize(config))
}

fn prepared(space: CodeSpace<Prepared>) -> CodeSpace<Prepared> {
    metrics::counter!("evm_bytecode_programs_prepared").increment(1);
    debug!(
        jump_dests = space.jump_dests().len(),
        constants = space.constant_pool().len(),
        "program prepared"
    );
    space
}
