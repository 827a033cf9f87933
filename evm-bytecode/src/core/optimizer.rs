//! Peephole optimizer
//!
//! Second forward pass over analyzed code. Wide pushes become `PUSHC`
//! references into the constant pool, and a `JUMP`/`JUMPI` fed directly by a
//! push of a verified destination becomes `JUMPV`/`JUMPVI`, which the
//! dispatcher executes without a runtime destination check.
//!
//! Rewrites happen in place and never grow an instruction, so offsets and the
//! JUMPDEST table built by the first pass stay valid.

use primitive_types::U256;
use tracing::{debug, trace};

use crate::core::constants::ConstantPool;
use crate::core::jumpdest::JumpDestTable;
use crate::core::opcodes::{Opcode, push_width};

/// Which rewrites the optimizer performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizerConfig {
    /// Replace PUSH2..PUSH32 with `PUSHC`
    pub use_constant_pool: bool,
    /// Replace `JUMP`/`JUMPI` to a constant valid destination with `JUMPV`/`JUMPVI`
    pub resolve_constant_jumps: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            use_constant_pool: true,
            resolve_constant_jumps: true,
        }
    }
}

impl OptimizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave the code exactly as analyzed
    pub fn disabled() -> Self {
        Self {
            use_constant_pool: false,
            resolve_constant_jumps: false,
        }
    }

    pub fn use_constant_pool(mut self, enabled: bool) -> Self {
        self.use_constant_pool = enabled;
        self
    }

    pub fn resolve_constant_jumps(mut self, enabled: bool) -> Self {
        self.resolve_constant_jumps = enabled;
        self
    }
}

/// What a single optimizer run changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizationStats {
    /// Pushes rewritten to `PUSHC`
    pub pushes_pooled: usize,
    /// Wide pushes left alone because the pool was full
    pub pool_exhausted: usize,
    /// Jumps rewritten to `JUMPV`/`JUMPVI`
    pub jumps_resolved: usize,
    /// Constant jumps whose destination failed verification
    pub jumps_left_dynamic: usize,
}

/// Single-use rewriter over one program's analyzed code
pub(crate) struct PeepholeOptimizer<'a> {
    config: OptimizerConfig,
    jump_dests: &'a JumpDestTable,
    pool: &'a mut ConstantPool,
    stats: OptimizationStats,
}

impl<'a> PeepholeOptimizer<'a> {
    pub(crate) fn new(
        config: OptimizerConfig,
        jump_dests: &'a JumpDestTable,
        pool: &'a mut ConstantPool,
    ) -> Self {
        Self {
            config,
            jump_dests,
            pool,
            stats: OptimizationStats::default(),
        }
    }

    /// Rewrite the first `program_len` bytes of `code` in place.
    ///
    /// `code` must carry the zero padding of a code space: immediates and the
    /// byte after the last push are read without bounds checks on the
    /// original length. Nothing is ever written into the padding.
    #[tracing::instrument(level = "debug", skip_all, fields(len = program_len))]
    pub(crate) fn run(mut self, code: &mut [u8], program_len: usize) -> OptimizationStats {
        let mut pc = 0;
        while pc < program_len {
            let op = code[pc];
            let width = push_width(op);
            if width != 0 {
                self.rewrite_push(code, pc, width, program_len);
            }
            pc += 1 + width;
        }

        debug!(stats = ?self.stats, pool = self.pool.len(), "finished optimizations");
        self.stats
    }

    fn rewrite_push(&mut self, code: &mut [u8], pc: usize, width: usize, program_len: usize) {
        let immediate = &code[pc + 1..pc + 1 + width];
        let value = U256::from_big_endian(immediate);

        // PUSHC needs its two operand bytes inside the program
        if self.config.use_constant_pool && width > 1 && pc + 2 < program_len {
            match self.pool.insert_or_find(value) {
                Some(index) => {
                    code[pc] = Opcode::PUSHC as u8;
                    code[pc + 1] = index;
                    code[pc + 2] = (width - 1) as u8;
                    self.stats.pushes_pooled += 1;
                    metrics::counter!("evm_bytecode_constants_pooled").increment(1);
                    trace!(pc, index, width, "PUSHC");
                }
                None => {
                    self.stats.pool_exhausted += 1;
                    metrics::counter!("evm_bytecode_pool_exhausted").increment(1);
                    trace!(pc, %value, "constant pool full");
                }
            }
        }

        if self.config.resolve_constant_jumps {
            self.resolve_jump(code, pc + 1 + width, value);
        }
    }

    fn resolve_jump(&mut self, code: &mut [u8], jump_pc: usize, dest: U256) {
        let Some(&op) = code.get(jump_pc) else {
            return;
        };
        let Some(resolved) = Opcode::from_byte(op).ok().and_then(Opcode::resolved) else {
            return;
        };

        if self.jump_dests.is_valid(dest) {
            code[jump_pc] = resolved as u8;
            self.stats.jumps_resolved += 1;
            metrics::counter!("evm_bytecode_jumps_resolved").increment(1);
            debug!(pc = jump_pc, %dest, "replaced constant jump with {resolved}");
        } else {
            self.stats.jumps_left_dynamic += 1;
            trace!(pc = jump_pc, %dest, "constant jump to invalid destination left dynamic");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::code::CODE_PADDING;
    use pretty_assertions::assert_eq;

    const JUMPDEST: u8 = Opcode::JUMPDEST as u8;
    const PUSH1: u8 = Opcode::PUSH1 as u8;
    const PUSH2: u8 = Opcode::PUSH2 as u8;
    const JUMP: u8 = Opcode::JUMP as u8;
    const JUMPI: u8 = Opcode::JUMPI as u8;

    fn optimize(
        program: &[u8],
        config: OptimizerConfig,
    ) -> (Vec<u8>, ConstantPool, OptimizationStats) {
        let mut code = program.to_vec();
        code.resize(program.len() + CODE_PADDING, 0);
        let table = JumpDestTable::build(&mut code);
        let mut pool = ConstantPool::new();
        let stats = PeepholeOptimizer::new(config, &table, &mut pool).run(&mut code, program.len());
        code.truncate(program.len());
        (code, pool, stats)
    }

    #[test]
    fn test_push1_is_never_pooled() {
        let (code, pool, stats) = optimize(&[PUSH1, 0xFF, Opcode::POP as u8], OptimizerConfig::new());
        assert_eq!(code, vec![PUSH1, 0xFF, Opcode::POP as u8]);
        assert!(pool.is_empty());
        assert_eq!(stats.pushes_pooled, 0);
    }

    #[test]
    fn test_wide_push_becomes_pushc() {
        let (code, pool, _) = optimize(&[PUSH2, 0x12, 0x34, Opcode::POP as u8], OptimizerConfig::new());
        assert_eq!(code, vec![Opcode::PUSHC as u8, 0, 1, Opcode::POP as u8]);
        assert_eq!(pool.as_slice(), &[U256::from(0x1234)]);
    }

    #[test]
    fn test_pushc_keeps_trailing_immediate_bytes() {
        let push4 = Opcode::PUSH4 as u8;
        let (code, _, _) = optimize(&[push4, 0xDE, 0xAD, 0xBE, 0xEF], OptimizerConfig::new());
        assert_eq!(code, vec![Opcode::PUSHC as u8, 0, 3, 0xBE, 0xEF]);
    }

    #[test]
    fn test_jumpi_is_resolved() {
        // JUMPDEST PUSH1 1 PUSH1 0 JUMPI
        let program = [JUMPDEST, PUSH1, 0x01, PUSH1, 0x00, JUMPI];
        let (code, _, stats) = optimize(&program, OptimizerConfig::new());
        assert_eq!(code[5], Opcode::JUMPVI as u8);
        assert_eq!(stats.jumps_resolved, 1);
    }

    #[test]
    fn test_resolution_after_pooled_push_uses_original_footprint() {
        // PUSH2 0x0004 JUMP JUMPDEST
        let program = [PUSH2, 0x00, 0x04, JUMP, JUMPDEST];
        let (code, pool, stats) = optimize(&program, OptimizerConfig::new());
        assert_eq!(code, vec![Opcode::PUSHC as u8, 0, 1, Opcode::JUMPV as u8, JUMPDEST]);
        assert_eq!(pool.as_slice(), &[U256::from(4)]);
        assert_eq!(stats.jumps_resolved, 1);
    }

    #[test]
    fn test_invalid_destination_is_left_dynamic() {
        let program = [PUSH1, 0x03, JUMP, Opcode::STOP as u8];
        let (code, _, stats) = optimize(&program, OptimizerConfig::new());
        assert_eq!(code[2], JUMP);
        assert_eq!(stats.jumps_left_dynamic, 1);
    }

    #[test]
    fn test_truncated_push_is_not_pooled_into_padding() {
        let (code, pool, _) = optimize(&[Opcode::POP as u8, PUSH2, 0x12], OptimizerConfig::new());
        assert_eq!(code, vec![Opcode::POP as u8, PUSH2, 0x12]);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_config_switches() {
        let program = [PUSH2, 0x00, 0x04, JUMP, JUMPDEST];

        let (code, pool, _) = optimize(&program, OptimizerConfig::new().use_constant_pool(false));
        assert_eq!(code, vec![PUSH2, 0x00, 0x04, Opcode::JUMPV as u8, JUMPDEST]);
        assert!(pool.is_empty());

        let (code, _, _) = optimize(&program, OptimizerConfig::new().resolve_constant_jumps(false));
        assert_eq!(code, vec![Opcode::PUSHC as u8, 0, 1, JUMP, JUMPDEST]);

        let (code, _, stats) = optimize(&program, OptimizerConfig::disabled());
        assert_eq!(code, program.to_vec());
        assert_eq!(stats, OptimizationStats::default());
    }
}
