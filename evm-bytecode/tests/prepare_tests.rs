#![cfg(feature = "optimizer")]

use evm_bytecode::core::code::{CodeSpace, Raw};
use evm_bytecode::{
    BytecodeError, CODE_PADDING, ConstantPool, Opcode, OptimizerConfig, U256, prepare,
    prepare_with,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

const STOP: u8 = Opcode::STOP as u8;
const POP: u8 = Opcode::POP as u8;
const JUMP: u8 = Opcode::JUMP as u8;
const JUMPI: u8 = Opcode::JUMPI as u8;
const JUMPDEST: u8 = Opcode::JUMPDEST as u8;
const PUSH1: u8 = Opcode::PUSH1 as u8;
const PUSH2: u8 = Opcode::PUSH2 as u8;
const PUSH32: u8 = Opcode::PUSH32 as u8;
const PUSHC: u8 = Opcode::PUSHC as u8;
const JUMPV: u8 = Opcode::JUMPV as u8;
const JUMPVI: u8 = Opcode::JUMPVI as u8;
const BAD: u8 = Opcode::BAD as u8;

#[test]
fn jumpdest_then_stop() {
    let program = [JUMPDEST, STOP];
    let prepared = prepare(&program);

    assert_eq!(prepared.jump_dests().as_slice(), &[0]);
    assert_eq!(prepared.program(), &program);
    assert!(prepared.constant_pool().is_empty());
}

#[test]
fn jump_to_non_jumpdest_stays_dynamic() {
    let program = [PUSH1, 0x00, JUMP];
    let prepared = prepare(&program);

    assert_eq!(prepared.program(), &program);
    assert!(prepared.jump_dests().is_empty());
    assert_eq!(
        prepared.verify_jump(U256::zero()),
        Err(BytecodeError::InvalidJump {
            destination: U256::zero()
        })
    );
    assert_eq!(prepared.stats().jumps_left_dynamic, 1);
}

#[test]
fn jump_to_jumpdest_is_pre_resolved() {
    let prepared = prepare(&[JUMPDEST, PUSH1, 0x00, JUMP]);

    assert_eq!(prepared.jump_dests().as_slice(), &[0]);
    assert_eq!(prepared.program(), &[JUMPDEST, PUSH1, 0x00, JUMPV]);
    assert_eq!(prepared.stats().jumps_resolved, 1);
}

#[test]
fn repeated_wide_constant_shares_one_pool_entry() {
    let prepared = prepare(&[PUSH2, 0x12, 0x34, POP, PUSH2, 0x12, 0x34, POP]);

    assert_eq!(
        prepared.program(),
        &[PUSHC, 0, 1, POP, PUSHC, 0, 1, POP]
    );
    assert_eq!(prepared.constant_pool().as_slice(), &[U256::from(0x1234)]);
    assert_eq!(prepared.constant(0), Ok(&U256::from(0x1234)));
    assert_eq!(prepared.stats().pushes_pooled, 2);
}

#[test]
fn pool_overflow_leaves_push_unchanged() {
    let mut program = Vec::new();
    for i in 0..=ConstantPool::MAX_CONSTANTS as u16 {
        let value = 0x0100 + i;
        program.extend_from_slice(&[PUSH2, (value >> 8) as u8, value as u8, POP]);
    }

    let prepared = prepare(&program);
    assert_eq!(prepared.constant_pool().len(), ConstantPool::MAX_CONSTANTS);
    assert_eq!(prepared.stats().pushes_pooled, ConstantPool::MAX_CONSTANTS);
    assert_eq!(prepared.stats().pool_exhausted, 1);

    let code = prepared.program();
    let last = code.len() - 4;
    assert_eq!(&code[last..], &[PUSH2, 0x02, 0x00, POP]);
    assert_eq!(&code[last - 4..last], &[PUSHC, 255, 1, POP]);
}

#[test]
fn pool_overflow_still_resolves_jump() {
    let mut program = Vec::new();
    for i in 0..ConstantPool::MAX_CONSTANTS as u16 {
        let value = 0x1000 + i;
        program.extend_from_slice(&[PUSH2, (value >> 8) as u8, value as u8, POP]);
    }
    let dest = program.len() + 4;
    program.extend_from_slice(&[PUSH2, (dest >> 8) as u8, dest as u8, JUMP, JUMPDEST]);

    let prepared = prepare(&program);
    let code = prepared.program();
    assert_eq!(&code[dest - 4..], &[PUSH2, (dest >> 8) as u8, dest as u8, JUMPV, JUMPDEST]);
}

#[test]
fn synthetic_bytes_in_user_code_are_trapped() {
    let prepared = prepare(&[PUSHC, 0x00, 0x01, JUMPV, JUMPVI, STOP]);

    // 0x00 and 0x01 are now plain STOP / ADD instructions, not a PUSHC operand
    assert_eq!(prepared.program(), &[BAD, 0x00, 0x01, BAD, BAD, STOP]);
    assert_eq!(prepared.jump_dests().trapped(), 3);
    assert!(prepared.constant_pool().is_empty());
}

#[test]
fn jumpdest_inside_immediate_is_ignored() {
    let prepared = prepare(&[PUSH2, JUMPDEST, JUMPDEST, JUMPDEST]);
    assert_eq!(prepared.jump_dests().as_slice(), &[3]);
    assert!(!prepared.jump_dests().is_valid(U256::from(1)));
}

#[test]
fn truncated_push_reads_zero_padding() {
    // PUSH32 with only two real immediate bytes
    let prepared = prepare(&[PUSH32, 0xAB, 0xCD]);

    let mut expected = [0u8; 32];
    expected[0] = 0xAB;
    expected[1] = 0xCD;
    assert_eq!(
        prepared.constant_pool().as_slice(),
        &[U256::from_big_endian(&expected)]
    );
    assert_eq!(prepared.program(), &[PUSHC, 0, 31]);
    assert_eq!(prepared.padded_len(), 3 + CODE_PADDING);
}

#[test]
fn push_at_end_of_program_does_not_rewrite_padding() {
    let prepared = prepare(&[JUMPDEST, PUSH1, 0x00]);
    assert!(prepared.code()[3..].iter().all(|b| *b == 0));
    assert_eq!(prepared.stats().jumps_resolved, 0);
}

#[rstest]
#[case::jump(JUMP, JUMPV)]
#[case::jumpi(JUMPI, JUMPVI)]
fn constant_jumps_resolve_to_their_verified_form(#[case] jump: u8, #[case] resolved: u8) {
    let prepared = prepare(&[PUSH1, 0x03, jump, JUMPDEST]);
    assert_eq!(prepared.program()[2], resolved);
}

#[rstest]
#[case::no_pool(OptimizerConfig::new().use_constant_pool(false), &[PUSH2, 0x00, 0x04, JUMPV, JUMPDEST])]
#[case::no_jumps(OptimizerConfig::new().resolve_constant_jumps(false), &[PUSHC, 0, 1, JUMP, JUMPDEST])]
#[case::disabled(OptimizerConfig::disabled(), &[PUSH2, 0x00, 0x04, JUMP, JUMPDEST])]
fn optimizer_config_selects_rewrites(#[case] config: OptimizerConfig, #[case] expected: &[u8]) {
    let prepared = prepare_with(&[PUSH2, 0x00, 0x04, JUMP, JUMPDEST], &config);
    assert_eq!(prepared.program(), expected);
}

#[test]
fn preparation_is_deterministic() {
    let program = [
        PUSH2, 0xAA, 0xBB, PUSH2, 0xCC, 0xDD, PUSH2, 0xAA, 0xBB, JUMPDEST, PUSH1, 0x09, JUMPI,
    ];
    let first = prepare(&program);
    let second = prepare(&program);

    assert_eq!(first.code(), second.code());
    assert_eq!(first.constant_pool(), second.constant_pool());
    assert_eq!(first.jump_dests(), second.jump_dests());
    assert_eq!(first.constant_pool().as_slice(), &[U256::from(0xAABB), U256::from(0xCCDD)]);
}

#[test]
fn staged_pipeline_matches_prepare() {
    let program = [JUMPDEST, PUSH2, 0x00, 0x00, JUMP];
    let staged = CodeSpace::<Raw>::new(&program)
        .analyze()
        .optimize(&OptimizerConfig::default());

    assert_eq!(staged.code(), prepare(&program).code());
}
