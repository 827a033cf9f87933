//! Opcode definitions and the static instruction information source
//!
//! Every decision the preparation passes make about an opcode byte (how wide
//! its immediate is, whether it is a jump, whether user code may contain it)
//! is answered here.

use crate::error::{BytecodeError, Result};
use bitflags::bitflags;

/// Widest immediate operand carried by a push instruction (PUSH32)
pub const MAX_IMMEDIATE_WIDTH: usize = 32;

/// EVM opcode enumeration (8 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
#[allow(non_camel_case_types)] // Opcodes follow assembly/bytecode naming convention
pub enum Opcode {
    // Stop and arithmetic (0x00 - 0x0B)
    STOP = 0x00,
    ADD = 0x01,
    MUL = 0x02,
    SUB = 0x03,
    DIV = 0x04,
    SDIV = 0x05,
    MOD = 0x06,
    SMOD = 0x07,
    ADDMOD = 0x08,
    MULMOD = 0x09,
    EXP = 0x0A,
    SIGNEXTEND = 0x0B,

    // Comparison and bitwise logic (0x10 - 0x1D)
    LT = 0x10,
    GT = 0x11,
    SLT = 0x12,
    SGT = 0x13,
    EQ = 0x14,
    ISZERO = 0x15,
    AND = 0x16,
    OR = 0x17,
    XOR = 0x18,
    NOT = 0x19,
    BYTE = 0x1A,
    SHL = 0x1B,
    SHR = 0x1C,
    SAR = 0x1D,

    // Hashing (0x20)
    SHA3 = 0x20,

    // Environment (0x30 - 0x3F)
    ADDRESS = 0x30,
    BALANCE = 0x31,
    ORIGIN = 0x32,
    CALLER = 0x33,
    CALLVALUE = 0x34,
    CALLDATALOAD = 0x35,
    CALLDATASIZE = 0x36,
    CALLDATACOPY = 0x37,
    CODESIZE = 0x38,
    CODECOPY = 0x39,
    GASPRICE = 0x3A,
    EXTCODESIZE = 0x3B,
    EXTCODECOPY = 0x3C,
    RETURNDATASIZE = 0x3D,
    RETURNDATACOPY = 0x3E,
    EXTCODEHASH = 0x3F,

    // Block information (0x40 - 0x45)
    BLOCKHASH = 0x40,
    COINBASE = 0x41,
    TIMESTAMP = 0x42,
    NUMBER = 0x43,
    DIFFICULTY = 0x44,
    GASLIMIT = 0x45,

    // Stack, memory, storage and flow (0x50 - 0x5B)
    POP = 0x50,
    MLOAD = 0x51,
    MSTORE = 0x52,
    MSTORE8 = 0x53,
    SLOAD = 0x54,
    SSTORE = 0x55,
    JUMP = 0x56,
    JUMPI = 0x57,
    PC = 0x58,
    MSIZE = 0x59,
    GAS = 0x5A,
    JUMPDEST = 0x5B,

    // Push (0x60 - 0x7F)
    PUSH1 = 0x60,
    PUSH2 = 0x61,
    PUSH3 = 0x62,
    PUSH4 = 0x63,
    PUSH5 = 0x64,
    PUSH6 = 0x65,
    PUSH7 = 0x66,
    PUSH8 = 0x67,
    PUSH9 = 0x68,
    PUSH10 = 0x69,
    PUSH11 = 0x6A,
    PUSH12 = 0x6B,
    PUSH13 = 0x6C,
    PUSH14 = 0x6D,
    PUSH15 = 0x6E,
    PUSH16 = 0x6F,
    PUSH17 = 0x70,
    PUSH18 = 0x71,
    PUSH19 = 0x72,
    PUSH20 = 0x73,
    PUSH21 = 0x74,
    PUSH22 = 0x75,
    PUSH23 = 0x76,
    PUSH24 = 0x77,
    PUSH25 = 0x78,
    PUSH26 = 0x79,
    PUSH27 = 0x7A,
    PUSH28 = 0x7B,
    PUSH29 = 0x7C,
    PUSH30 = 0x7D,
    PUSH31 = 0x7E,
    PUSH32 = 0x7F,

    // Duplication (0x80 - 0x8F)
    DUP1 = 0x80,
    DUP2 = 0x81,
    DUP3 = 0x82,
    DUP4 = 0x83,
    DUP5 = 0x84,
    DUP6 = 0x85,
    DUP7 = 0x86,
    DUP8 = 0x87,
    DUP9 = 0x88,
    DUP10 = 0x89,
    DUP11 = 0x8A,
    DUP12 = 0x8B,
    DUP13 = 0x8C,
    DUP14 = 0x8D,
    DUP15 = 0x8E,
    DUP16 = 0x8F,

    // Exchange (0x90 - 0x9F)
    SWAP1 = 0x90,
    SWAP2 = 0x91,
    SWAP3 = 0x92,
    SWAP4 = 0x93,
    SWAP5 = 0x94,
    SWAP6 = 0x95,
    SWAP7 = 0x96,
    SWAP8 = 0x97,
    SWAP9 = 0x98,
    SWAP10 = 0x99,
    SWAP11 = 0x9A,
    SWAP12 = 0x9B,
    SWAP13 = 0x9C,
    SWAP14 = 0x9D,
    SWAP15 = 0x9E,
    SWAP16 = 0x9F,

    // Logging (0xA0 - 0xA4)
    LOG0 = 0xA0,
    LOG1 = 0xA1,
    LOG2 = 0xA2,
    LOG3 = 0xA3,
    LOG4 = 0xA4,

    // Synthetic, produced only by the optimizer (0xAC - 0xAF)
    PUSHC = 0xAC,
    JUMPV = 0xAD,
    JUMPVI = 0xAE,
    BAD = 0xAF,

    // System (0xF0 - 0xFF)
    CREATE = 0xF0,
    CALL = 0xF1,
    CALLCODE = 0xF2,
    RETURN = 0xF3,
    DELEGATECALL = 0xF4,
    CREATE2 = 0xF5,
    STATICCALL = 0xFA,
    REVERT = 0xFD,
    INVALID = 0xFE,
    SELFDESTRUCT = 0xFF,
}

impl Opcode {
    /// Parse opcode from byte
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0x00 => Ok(Opcode::STOP),
            0x01 => Ok(Opcode::ADD),
            0x02 => Ok(Opcode::MUL),
            0x03 => Ok(Opcode::SUB),
            0x04 => Ok(Opcode::DIV),
            0x05 => Ok(Opcode::SDIV),
            0x06 => Ok(Opcode::MOD),
            0x07 => Ok(Opcode::SMOD),
            0x08 => Ok(Opcode::ADDMOD),
            0x09 => Ok(Opcode::MULMOD),
            0x0A => Ok(Opcode::EXP),
            0x0B => Ok(Opcode::SIGNEXTEND),

            0x10 => Ok(Opcode::LT),
            0x11 => Ok(Opcode::GT),
            0x12 => Ok(Opcode::SLT),
            0x13 => Ok(Opcode::SGT),
            0x14 => Ok(Opcode::EQ),
            0x15 => Ok(Opcode::ISZERO),
            0x16 => Ok(Opcode::AND),
            0x17 => Ok(Opcode::OR),
            0x18 => Ok(Opcode::XOR),
            0x19 => Ok(Opcode::NOT),
            0x1A => Ok(Opcode::BYTE),
            0x1B => Ok(Opcode::SHL),
            0x1C => Ok(Opcode::SHR),
            0x1D => Ok(Opcode::SAR),

            0x20 => Ok(Opcode::SHA3),

            0x30 => Ok(Opcode::ADDRESS),
            0x31 => Ok(Opcode::BALANCE),
            0x32 => Ok(Opcode::ORIGIN),
            0x33 => Ok(Opcode::CALLER),
            0x34 => Ok(Opcode::CALLVALUE),
            0x35 => Ok(Opcode::CALLDATALOAD),
            0x36 => Ok(Opcode::CALLDATASIZE),
            0x37 => Ok(Opcode::CALLDATACOPY),
            0x38 => Ok(Opcode::CODESIZE),
            0x39 => Ok(Opcode::CODECOPY),
            0x3A => Ok(Opcode::GASPRICE),
            0x3B => Ok(Opcode::EXTCODESIZE),
            0x3C => Ok(Opcode::EXTCODECOPY),
            0x3D => Ok(Opcode::RETURNDATASIZE),
            0x3E => Ok(Opcode::RETURNDATACOPY),
            0x3F => Ok(Opcode::EXTCODEHASH),

            0x40 => Ok(Opcode::BLOCKHASH),
            0x41 => Ok(Opcode::COINBASE),
            0x42 => Ok(Opcode::TIMESTAMP),
            0x43 => Ok(Opcode::NUMBER),
            0x44 => Ok(Opcode::DIFFICULTY),
            0x45 => Ok(Opcode::GASLIMIT),

            0x50 => Ok(Opcode::POP),
            0x51 => Ok(Opcode::MLOAD),
            0x52 => Ok(Opcode::MSTORE),
            0x53 => Ok(Opcode::MSTORE8),
            0x54 => Ok(Opcode::SLOAD),
            0x55 => Ok(Opcode::SSTORE),
            0x56 => Ok(Opcode::JUMP),
            0x57 => Ok(Opcode::JUMPI),
            0x58 => Ok(Opcode::PC),
            0x59 => Ok(Opcode::MSIZE),
            0x5A => Ok(Opcode::GAS),
            0x5B => Ok(Opcode::JUMPDEST),

            0x60 => Ok(Opcode::PUSH1),
            0x61 => Ok(Opcode::PUSH2),
            0x62 => Ok(Opcode::PUSH3),
            0x63 => Ok(Opcode::PUSH4),
            0x64 => Ok(Opcode::PUSH5),
            0x65 => Ok(Opcode::PUSH6),
            0x66 => Ok(Opcode::PUSH7),
            0x67 => Ok(Opcode::PUSH8),
            0x68 => Ok(Opcode::PUSH9),
            0x69 => Ok(Opcode::PUSH10),
            0x6A => Ok(Opcode::PUSH11),
            0x6B => Ok(Opcode::PUSH12),
            0x6C => Ok(Opcode::PUSH13),
            0x6D => Ok(Opcode::PUSH14),
            0x6E => Ok(Opcode::PUSH15),
            0x6F => Ok(Opcode::PUSH16),
            0x70 => Ok(Opcode::PUSH17),
            0x71 => Ok(Opcode::PUSH18),
            0x72 => Ok(Opcode::PUSH19),
            0x73 => Ok(Opcode::PUSH20),
            0x74 => Ok(Opcode::PUSH21),
            0x75 => Ok(Opcode::PUSH22),
            0x76 => Ok(Opcode::PUSH23),
            0x77 => Ok(Opcode::PUSH24),
            0x78 => Ok(Opcode::PUSH25),
            0x79 => Ok(Opcode::PUSH26),
            0x7A => Ok(Opcode::PUSH27),
            0x7B => Ok(Opcode::PUSH28),
            0x7C => Ok(Opcode::PUSH29),
            0x7D => Ok(Opcode::PUSH30),
            0x7E => Ok(Opcode::PUSH31),
            0x7F => Ok(Opcode::PUSH32),

            0x80 => Ok(Opcode::DUP1),
            0x81 => Ok(Opcode::DUP2),
            0x82 => Ok(Opcode::DUP3),
            0x83 => Ok(Opcode::DUP4),
            0x84 => Ok(Opcode::DUP5),
            0x85 => Ok(Opcode::DUP6),
            0x86 => Ok(Opcode::DUP7),
            0x87 => Ok(Opcode::DUP8),
            0x88 => Ok(Opcode::DUP9),
            0x89 => Ok(Opcode::DUP10),
            0x8A => Ok(Opcode::DUP11),
            0x8B => Ok(Opcode::DUP12),
            0x8C => Ok(Opcode::DUP13),
            0x8D => Ok(Opcode::DUP14),
            0x8E => Ok(Opcode::DUP15),
            0x8F => Ok(Opcode::DUP16),

            0x90 => Ok(Opcode::SWAP1),
            0x91 => Ok(Opcode::SWAP2),
            0x92 => Ok(Opcode::SWAP3),
            0x93 => Ok(Opcode::SWAP4),
            0x94 => Ok(Opcode::SWAP5),
            0x95 => Ok(Opcode::SWAP6),
            0x96 => Ok(Opcode::SWAP7),
            0x97 => Ok(Opcode::SWAP8),
            0x98 => Ok(Opcode::SWAP9),
            0x99 => Ok(Opcode::SWAP10),
            0x9A => Ok(Opcode::SWAP11),
            0x9B => Ok(Opcode::SWAP12),
            0x9C => Ok(Opcode::SWAP13),
            0x9D => Ok(Opcode::SWAP14),
            0x9E => Ok(Opcode::SWAP15),
            0x9F => Ok(Opcode::SWAP16),

            0xA0 => Ok(Opcode::LOG0),
            0xA1 => Ok(Opcode::LOG1),
            0xA2 => Ok(Opcode::LOG2),
            0xA3 => Ok(Opcode::LOG3),
            0xA4 => Ok(Opcode::LOG4),

            0xAC => Ok(Opcode::PUSHC),
            0xAD => Ok(Opcode::JUMPV),
            0xAE => Ok(Opcode::JUMPVI),
            0xAF => Ok(Opcode::BAD),

            0xF0 => Ok(Opcode::CREATE),
            0xF1 => Ok(Opcode::CALL),
            0xF2 => Ok(Opcode::CALLCODE),
            0xF3 => Ok(Opcode::RETURN),
            0xF4 => Ok(Opcode::DELEGATECALL),
            0xF5 => Ok(Opcode::CREATE2),
            0xFA => Ok(Opcode::STATICCALL),
            0xFD => Ok(Opcode::REVERT),
            0xFE => Ok(Opcode::INVALID),
            0xFF => Ok(Opcode::SELFDESTRUCT),

            _ => Err(BytecodeError::InvalidOpcode(byte)),
        }
    }

    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Mnemonic as it appears in assembly listings
    pub const fn name(self) -> &'static str {
        match self {
            Opcode::STOP => "STOP",
            Opcode::ADD => "ADD",
            Opcode::MUL => "MUL",
            Opcode::SUB => "SUB",
            Opcode::DIV => "DIV",
            Opcode::SDIV => "SDIV",
            Opcode::MOD => "MOD",
            Opcode::SMOD => "SMOD",
            Opcode::ADDMOD => "ADDMOD",
            Opcode::MULMOD => "MULMOD",
            Opcode::EXP => "EXP",
            Opcode::SIGNEXTEND => "SIGNEXTEND",
            Opcode::LT => "LT",
            Opcode::GT => "GT",
            Opcode::SLT => "SLT",
            Opcode::SGT => "SGT",
            Opcode::EQ => "EQ",
            Opcode::ISZERO => "ISZERO",
            Opcode::AND => "AND",
            Opcode::OR => "OR",
            Opcode::XOR => "XOR",
            Opcode::NOT => "NOT",
            Opcode::BYTE => "BYTE",
            Opcode::SHL => "SHL",
            Opcode::SHR => "SHR",
            Opcode::SAR => "SAR",
            Opcode::SHA3 => "SHA3",
            Opcode::ADDRESS => "ADDRESS",
            Opcode::BALANCE => "BALANCE",
            Opcode::ORIGIN => "ORIGIN",
            Opcode::CALLER => "CALLER",
            Opcode::CALLVALUE => "CALLVALUE",
            Opcode::CALLDATALOAD => "CALLDATALOAD",
            Opcode::CALLDATASIZE => "CALLDATASIZE",
            Opcode::CALLDATACOPY => "CALLDATACOPY",
            Opcode::CODESIZE => "CODESIZE",
            Opcode::CODECOPY => "CODECOPY",
            Opcode::GASPRICE => "GASPRICE",
            Opcode::EXTCODESIZE => "EXTCODESIZE",
            Opcode::EXTCODECOPY => "EXTCODECOPY",
            Opcode::RETURNDATASIZE => "RETURNDATASIZE",
            Opcode::RETURNDATACOPY => "RETURNDATACOPY",
            Opcode::EXTCODEHASH => "EXTCODEHASH",
            Opcode::BLOCKHASH => "BLOCKHASH",
            Opcode::COINBASE => "COINBASE",
            Opcode::TIMESTAMP => "TIMESTAMP",
            Opcode::NUMBER => "NUMBER",
            Opcode::DIFFICULTY => "DIFFICULTY",
            Opcode::GASLIMIT => "GASLIMIT",
            Opcode::POP => "POP",
            Opcode::MLOAD => "MLOAD",
            Opcode::MSTORE => "MSTORE",
            Opcode::MSTORE8 => "MSTORE8",
            Opcode::SLOAD => "SLOAD",
            Opcode::SSTORE => "SSTORE",
            Opcode::JUMP => "JUMP",
            Opcode::JUMPI => "JUMPI",
            Opcode::PC => "PC",
            Opcode::MSIZE => "MSIZE",
            Opcode::GAS => "GAS",
            Opcode::JUMPDEST => "JUMPDEST",
            Opcode::PUSH1 => "PUSH1",
            Opcode::PUSH2 => "PUSH2",
            Opcode::PUSH3 => "PUSH3",
            Opcode::PUSH4 => "PUSH4",
            Opcode::PUSH5 => "PUSH5",
            Opcode::PUSH6 => "PUSH6",
            Opcode::PUSH7 => "PUSH7",
            Opcode::PUSH8 => "PUSH8",
            Opcode::PUSH9 => "PUSH9",
            Opcode::PUSH10 => "PUSH10",
            Opcode::PUSH11 => "PUSH11",
            Opcode::PUSH12 => "PUSH12",
            Opcode::PUSH13 => "PUSH13",
            Opcode::PUSH14 => "PUSH14",
            Opcode::PUSH15 => "PUSH15",
            Opcode::PUSH16 => "PUSH16",
            Opcode::PUSH17 => "PUSH17",
            Opcode::PUSH18 => "PUSH18",
            Opcode::PUSH19 => "PUSH19",
            Opcode::PUSH20 => "PUSH20",
            Opcode::PUSH21 => "PUSH21",
            Opcode::PUSH22 => "PUSH22",
            Opcode::PUSH23 => "PUSH23",
            Opcode::PUSH24 => "PUSH24",
            Opcode::PUSH25 => "PUSH25",
            Opcode::PUSH26 => "PUSH26",
            Opcode::PUSH27 => "PUSH27",
            Opcode::PUSH28 => "PUSH28",
            Opcode::PUSH29 => "PUSH29",
            Opcode::PUSH30 => "PUSH30",
            Opcode::PUSH31 => "PUSH31",
            Opcode::PUSH32 => "PUSH32",
            Opcode::DUP1 => "DUP1",
            Opcode::DUP2 => "DUP2",
            Opcode::DUP3 => "DUP3",
            Opcode::DUP4 => "DUP4",
            Opcode::DUP5 => "DUP5",
            Opcode::DUP6 => "DUP6",
            Opcode::DUP7 => "DUP7",
            Opcode::DUP8 => "DUP8",
            Opcode::DUP9 => "DUP9",
            Opcode::DUP10 => "DUP10",
            Opcode::DUP11 => "DUP11",
            Opcode::DUP12 => "DUP12",
            Opcode::DUP13 => "DUP13",
            Opcode::DUP14 => "DUP14",
            Opcode::DUP15 => "DUP15",
            Opcode::DUP16 => "DUP16",
            Opcode::SWAP1 => "SWAP1",
            Opcode::SWAP2 => "SWAP2",
            Opcode::SWAP3 => "SWAP3",
            Opcode::SWAP4 => "SWAP4",
            Opcode::SWAP5 => "SWAP5",
            Opcode::SWAP6 => "SWAP6",
            Opcode::SWAP7 => "SWAP7",
            Opcode::SWAP8 => "SWAP8",
            Opcode::SWAP9 => "SWAP9",
            Opcode::SWAP10 => "SWAP10",
            Opcode::SWAP11 => "SWAP11",
            Opcode::SWAP12 => "SWAP12",
            Opcode::SWAP13 => "SWAP13",
            Opcode::SWAP14 => "SWAP14",
            Opcode::SWAP15 => "SWAP15",
            Opcode::SWAP16 => "SWAP16",
            Opcode::LOG0 => "LOG0",
            Opcode::LOG1 => "LOG1",
            Opcode::LOG2 => "LOG2",
            Opcode::LOG3 => "LOG3",
            Opcode::LOG4 => "LOG4",
            Opcode::PUSHC => "PUSHC",
            Opcode::JUMPV => "JUMPV",
            Opcode::JUMPVI => "JUMPVI",
            Opcode::BAD => "BAD",
            Opcode::CREATE => "CREATE",
            Opcode::CALL => "CALL",
            Opcode::CALLCODE => "CALLCODE",
            Opcode::RETURN => "RETURN",
            Opcode::DELEGATECALL => "DELEGATECALL",
            Opcode::CREATE2 => "CREATE2",
            Opcode::STATICCALL => "STATICCALL",
            Opcode::REVERT => "REVERT",
            Opcode::INVALID => "INVALID",
            Opcode::SELFDESTRUCT => "SELFDESTRUCT",
        }
    }
}

impl Opcode {
    /// Push instruction carrying an `n`-byte immediate (1..=32)
    pub fn push(n: usize) -> Option<Self> {
        if (1..=MAX_IMMEDIATE_WIDTH).contains(&n) {
            Opcode::from_byte(Opcode::PUSH1 as u8 + (n as u8 - 1)).ok()
        } else {
            None
        }
    }

    /// Number of inline immediate bytes following the opcode in source code
    pub const fn immediate_width(self) -> usize {
        match self {
            Opcode::PUSHC => 2,
            _ => push_width(self as u8),
        }
    }

    pub const fn is_push(self) -> bool {
        push_width(self as u8) != 0
    }

    /// Jump instruction, dynamic or pre-resolved
    pub const fn is_jump(self) -> bool {
        matches!(
            self,
            Opcode::JUMP | Opcode::JUMPI | Opcode::JUMPV | Opcode::JUMPVI
        )
    }

    pub const fn is_synthetic(self) -> bool {
        is_synthetic(self as u8)
    }

    /// Pre-resolved counterpart of a dynamic jump
    pub const fn resolved(self) -> Option<Self> {
        match self {
            Opcode::JUMP => Some(Opcode::JUMPV),
            Opcode::JUMPI => Some(Opcode::JUMPVI),
            _ => None,
        }
    }

    /// Static shape facts for this opcode
    pub fn info(self) -> InstructionInfo {
        use GasPriceTier::*;

        let byte = self as u8;
        let (args, ret, gas_price_tier) = match self {
            Opcode::STOP | Opcode::INVALID | Opcode::BAD => (0, 0, Zero),
            Opcode::RETURN | Opcode::REVERT => (2, 0, Zero),

            Opcode::ADD
            | Opcode::SUB
            | Opcode::LT
            | Opcode::GT
            | Opcode::SLT
            | Opcode::SGT
            | Opcode::EQ
            | Opcode::AND
            | Opcode::OR
            | Opcode::XOR
            | Opcode::BYTE
            | Opcode::SHL
            | Opcode::SHR
            | Opcode::SAR => (2, 1, VeryLow),
            Opcode::ISZERO | Opcode::NOT | Opcode::CALLDATALOAD | Opcode::MLOAD => (1, 1, VeryLow),
            Opcode::MSTORE | Opcode::MSTORE8 => (2, 0, VeryLow),
            Opcode::CALLDATACOPY | Opcode::CODECOPY | Opcode::RETURNDATACOPY => (3, 0, VeryLow),

            Opcode::MUL
            | Opcode::DIV
            | Opcode::SDIV
            | Opcode::MOD
            | Opcode::SMOD
            | Opcode::SIGNEXTEND => (2, 1, Low),
            Opcode::ADDMOD | Opcode::MULMOD => (3, 1, Mid),
            Opcode::EXP | Opcode::SHA3 => (2, 1, Special),

            Opcode::ADDRESS
            | Opcode::ORIGIN
            | Opcode::CALLER
            | Opcode::CALLVALUE
            | Opcode::CALLDATASIZE
            | Opcode::CODESIZE
            | Opcode::GASPRICE
            | Opcode::RETURNDATASIZE
            | Opcode::COINBASE
            | Opcode::TIMESTAMP
            | Opcode::NUMBER
            | Opcode::DIFFICULTY
            | Opcode::GASLIMIT
            | Opcode::PC
            | Opcode::MSIZE
            | Opcode::GAS => (0, 1, Base),
            Opcode::POP => (1, 0, Base),

            Opcode::BALANCE | Opcode::EXTCODESIZE | Opcode::EXTCODEHASH | Opcode::BLOCKHASH => {
                (1, 1, Ext)
            }
            Opcode::EXTCODECOPY => (4, 0, Ext),

            Opcode::SLOAD => (1, 1, Special),
            Opcode::SSTORE => (2, 0, Special),
            Opcode::JUMPDEST => (0, 0, Special),
            Opcode::JUMP | Opcode::JUMPV => (1, 0, Mid),
            Opcode::JUMPI | Opcode::JUMPVI => (2, 0, High),
            Opcode::PUSHC => (0, 1, VeryLow),

            Opcode::CREATE => (3, 1, Special),
            Opcode::CREATE2 => (4, 1, Special),
            Opcode::CALL | Opcode::CALLCODE => (7, 1, Special),
            Opcode::DELEGATECALL | Opcode::STATICCALL => (6, 1, Special),
            Opcode::SELFDESTRUCT => (1, 0, Special),

            _ if self.is_push() => (0, 1, VeryLow),
            _ if (Opcode::DUP1 as u8..=Opcode::DUP16 as u8).contains(&byte) => {
                let n = byte - Opcode::DUP1 as u8 + 1;
                (n, n + 1, VeryLow)
            }
            _ if (Opcode::SWAP1 as u8..=Opcode::SWAP16 as u8).contains(&byte) => {
                let n = byte - Opcode::SWAP1 as u8 + 1;
                (n + 1, n + 1, VeryLow)
            }
            _ => {
                // LOG0..LOG4 are the only opcodes left
                let n = byte - Opcode::LOG0 as u8;
                (n + 2, 0, Special)
            }
        };

        InstructionInfo {
            name: self.name(),
            immediate_width: self.immediate_width() as u8,
            args,
            ret,
            gas_price_tier,
            flags: self.flags(),
        }
    }

    /// Category flags for this opcode
    pub fn flags(self) -> OpcodeFlags {
        let mut flags = OpcodeFlags::empty();

        if self.is_push() || self == Opcode::PUSHC {
            flags |= OpcodeFlags::PUSH;
        }
        if self.is_jump() {
            flags |= OpcodeFlags::JUMP;
        }
        if self == Opcode::JUMPDEST {
            flags |= OpcodeFlags::JUMP_TARGET;
        }
        if self.is_synthetic() {
            flags |= OpcodeFlags::SYNTHETIC;
        }
        if matches!(
            self,
            Opcode::STOP
                | Opcode::RETURN
                | Opcode::REVERT
                | Opcode::INVALID
                | Opcode::SELFDESTRUCT
                | Opcode::BAD
                | Opcode::JUMP
                | Opcode::JUMPV
        ) {
            flags |= OpcodeFlags::TERMINATOR;
        }
        if matches!(
            self,
            Opcode::SSTORE
                | Opcode::LOG0
                | Opcode::LOG1
                | Opcode::LOG2
                | Opcode::LOG3
                | Opcode::LOG4
                | Opcode::CREATE
                | Opcode::CREATE2
                | Opcode::CALL
                | Opcode::CALLCODE
                | Opcode::DELEGATECALL
                | Opcode::STATICCALL
                | Opcode::SELFDESTRUCT
        ) {
            flags |= OpcodeFlags::SIDE_EFFECTS;
        }

        flags
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Opcode {
    type Error = BytecodeError;

    fn try_from(byte: u8) -> Result<Self> {
        Opcode::from_byte(byte)
    }
}

/// Immediate width of a raw opcode byte: `n` for PUSHn, 0 otherwise.
///
/// This is the cursor rule shared by every forward scan over source code.
#[inline]
pub const fn push_width(byte: u8) -> usize {
    if byte >= Opcode::PUSH1 as u8 && byte <= Opcode::PUSH32 as u8 {
        (byte - Opcode::PUSH1 as u8) as usize + 1
    } else {
        0
    }
}

/// Whether a raw byte aliases one of the optimizer-only opcodes
#[inline]
pub const fn is_synthetic(byte: u8) -> bool {
    byte >= Opcode::PUSHC as u8 && byte <= Opcode::BAD as u8
}

/// Gas price tiers, cheapest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum GasPriceTier {
    Zero,
    Base,
    VeryLow,
    Low,
    Mid,
    High,
    Ext,
    Special,
    /// Not an instruction
    #[default]
    Invalid,
}

bitflags! {
    /// Opcode category (8 bits)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OpcodeFlags: u8 {
        /// Carries an inline immediate operand
        const PUSH = 0b00000001;

        /// Transfers control to a stack-supplied destination
        const JUMP = 0b00000010;

        /// Legal jump destination
        const JUMP_TARGET = 0b00000100;

        /// Control never falls through to the next instruction
        const TERMINATOR = 0b00001000;

        /// Never legal in source code
        const SYNTHETIC = 0b00010000;

        /// Mutates state outside the machine
        const SIDE_EFFECTS = 0b00100000;
    }
}

/// Static information about one opcode byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionInfo {
    pub name: &'static str,
    pub immediate_width: u8,
    pub args: u8,
    pub ret: u8,
    pub gas_price_tier: GasPriceTier,
    pub flags: OpcodeFlags,
}

impl InstructionInfo {
    /// Entry for bytes that are not assigned to any instruction
    pub const INVALID: InstructionInfo = InstructionInfo {
        name: "INVALID",
        immediate_width: 0,
        args: 0,
        ret: 0,
        gas_price_tier: GasPriceTier::Invalid,
        flags: OpcodeFlags::empty(),
    };
}

/// Authoritative information source for any opcode byte
pub fn instruction_info(byte: u8) -> InstructionInfo {
    match Opcode::from_byte(byte) {
        Ok(opcode) => opcode.info(),
        Err(_) => InstructionInfo::INVALID,
    }
}
