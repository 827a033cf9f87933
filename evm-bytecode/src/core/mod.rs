pub mod code;
pub mod constants;
pub mod instructions;
pub mod jumpdest;
pub mod metrics;
pub mod opcodes;
pub mod optimizer;

// Re-export core types
pub use self::code::{Analyzed, CODE_PADDING, CodeSpace, Phase, Prepared, Raw, prepare};
#[cfg(feature = "optimizer")]
pub use self::code::prepare_with;
pub use self::constants::ConstantPool;
pub use self::instructions::{Instruction, Instructions};
pub use self::jumpdest::JumpDestTable;
pub use self::metrics::{InstructionMetric, MetricsTable, init_metrics, metrics};
pub use self::opcodes::{
    GasPriceTier, InstructionInfo, MAX_IMMEDIATE_WIDTH, Opcode, OpcodeFlags, instruction_info,
};
pub use self::optimizer::{OptimizationStats, OptimizerConfig};
