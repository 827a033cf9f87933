//! Error types for bytecode operations

use primitive_types::U256;
use thiserror::Error;

/// Main error type for bytecode operations
///
/// Preparation itself never fails; these are raised by the queries the
/// dispatcher makes against a prepared program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BytecodeError {
    #[error("Invalid opcode: {0:#04x}")]
    InvalidOpcode(u8),

    #[error("Invalid jump destination: {destination:#x}")]
    InvalidJump { destination: U256 },

    #[error("Invalid constant index {index} for pool of {len} entries")]
    InvalidConstantIndex { index: u8, len: usize },
}

/// Convenient Result type
pub type Result<T> = std::result::Result<T, BytecodeError>;
