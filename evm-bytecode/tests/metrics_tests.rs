use evm_bytecode::core::metrics::metrics;
use evm_bytecode::{GasPriceTier, InstructionMetric, Opcode, init_metrics, instruction_info};
use test_case::test_case;

#[test_case(Opcode::STOP, GasPriceTier::Zero, 0, 0 ; "stop")]
#[test_case(Opcode::ADD, GasPriceTier::VeryLow, 2, 1 ; "add")]
#[test_case(Opcode::ADDMOD, GasPriceTier::Mid, 3, 1 ; "addmod")]
#[test_case(Opcode::BALANCE, GasPriceTier::Ext, 1, 1 ; "balance")]
#[test_case(Opcode::JUMP, GasPriceTier::Mid, 1, 0 ; "jump")]
#[test_case(Opcode::JUMPI, GasPriceTier::High, 2, 0 ; "jumpi")]
#[test_case(Opcode::JUMPV, GasPriceTier::Mid, 1, 0 ; "jumpv matches jump")]
#[test_case(Opcode::JUMPVI, GasPriceTier::High, 2, 0 ; "jumpvi matches jumpi")]
#[test_case(Opcode::PUSH1, GasPriceTier::VeryLow, 0, 1 ; "push1")]
#[test_case(Opcode::PUSHC, GasPriceTier::VeryLow, 0, 1 ; "pushc matches push")]
#[test_case(Opcode::DUP16, GasPriceTier::VeryLow, 16, 17 ; "dup16")]
#[test_case(Opcode::SWAP1, GasPriceTier::VeryLow, 2, 2 ; "swap1")]
#[test_case(Opcode::LOG4, GasPriceTier::Special, 6, 0 ; "log4")]
#[test_case(Opcode::DELEGATECALL, GasPriceTier::Special, 6, 1 ; "delegatecall")]
fn metrics_entry(opcode: Opcode, tier: GasPriceTier, args: u8, ret: u8) {
    let metric = metrics()[opcode as u8];
    assert_eq!(
        metric,
        InstructionMetric {
            gas_price_tier: tier,
            args,
            ret,
        }
    );
}

#[test]
fn metrics_agree_with_instruction_info_for_every_byte() {
    let table = init_metrics();
    for byte in 0..=u8::MAX {
        let info = instruction_info(byte);
        let metric = table.get(byte);
        assert_eq!(metric.gas_price_tier, info.gas_price_tier, "{byte:#04x}");
        assert_eq!((metric.args, metric.ret), (info.args, info.ret), "{byte:#04x}");
    }
}

#[test]
fn repeated_initialization_is_observably_identical() {
    let first = init_metrics().clone();
    let second = init_metrics();
    assert_eq!(&first, second);
    assert!(std::ptr::eq(second, metrics()));
}
