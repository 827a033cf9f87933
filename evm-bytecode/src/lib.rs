//! EVM bytecode preparation
//!
//! Turns raw, untrusted EVM bytecode into the form the interpreter executes:
//! a zero-padded code buffer, a sorted JUMPDEST table and, with the
//! `optimizer` feature, a constant pool plus in-place `PUSHC`/`JUMPV`/`JUMPVI`
//! rewrites. Preparation runs once per program load and never fails.

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod core;
pub mod disassembler;
pub mod error;

// Re-export commonly used types
pub use crate::core::{
    CODE_PADDING, CodeSpace, ConstantPool, GasPriceTier, InstructionMetric, JumpDestTable,
    MetricsTable, OptimizationStats, OptimizerConfig, Opcode, Prepared, init_metrics,
    instruction_info, prepare,
};
#[cfg(feature = "optimizer")]
pub use crate::core::prepare_with;
pub use crate::disassembler::{Disassembler, DisassemblyFormat};
pub use crate::error::{BytecodeError, Result};

/// 256-bit machine word
pub use primitive_types::U256;
