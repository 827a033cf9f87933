//! Decoded instruction view over a code space
//!
//! Instructions are variable width: an opcode byte followed by its inline
//! immediate. `PUSHC` keeps the footprint of the push it replaced, recorded
//! in its second operand byte.

use std::fmt;

use primitive_types::U256;

use crate::core::opcodes::{InstructionInfo, Opcode, instruction_info, push_width};

/// One instruction borrowed from a code buffer
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    pub offset: usize,
    pub opcode: u8,
    pub immediate: &'a [u8],
}

impl<'a> Instruction<'a> {
    /// Decode the instruction at `offset` of a padded buffer
    pub fn decode(code: &'a [u8], offset: usize) -> Self {
        let opcode = code[offset];
        let width = if opcode == Opcode::PUSHC as u8 {
            // the second operand byte holds the replaced push width minus one
            code.get(offset + 2).map_or(2, |width| *width as usize + 1)
        } else {
            push_width(opcode)
        };
        let end = (offset + 1 + width).min(code.len());

        Self {
            offset,
            opcode,
            immediate: &code[offset + 1..end],
        }
    }

    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_byte(self.opcode).ok()
    }

    pub fn info(&self) -> InstructionInfo {
        instruction_info(self.opcode)
    }

    /// Bytes occupied, opcode included
    pub fn len(&self) -> usize {
        1 + self.immediate.len()
    }

    /// Big-endian value of a PUSHn immediate
    pub fn push_value(&self) -> Option<U256> {
        if push_width(self.opcode) == 0 {
            return None;
        }
        Some(U256::from_big_endian(self.immediate))
    }

    /// Constant pool index of a `PUSHC`
    pub fn pool_index(&self) -> Option<u8> {
        if self.opcode == Opcode::PUSHC as u8 {
            self.immediate.first().copied()
        } else {
            None
        }
    }
}

impl fmt::Debug for Instruction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode() {
            Some(opcode) => write!(f, "{opcode}")?,
            None => write!(f, "INVALID({:#04x})", self.opcode)?,
        }

        if let Some(index) = self.pool_index() {
            write!(f, " #{index}")
        } else if let Some(value) = self.push_value() {
            write!(f, " {value:#x}")
        } else {
            Ok(())
        }
    }
}

/// Forward iterator over the instructions of a program.
///
/// Uses the same cursor rule as the preparation scans, so immediate bytes
/// are never reported as instructions.
#[derive(Debug, Clone)]
pub struct Instructions<'a> {
    code: &'a [u8],
    end: usize,
    pc: usize,
}

impl<'a> Instructions<'a> {
    /// Iterate over `code[..end]`; bytes past `end` may be read as immediates
    pub fn new(code: &'a [u8], end: usize) -> Self {
        Self {
            code,
            end: end.min(code.len()),
            pc: 0,
        }
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Instruction<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pc >= self.end {
            return None;
        }
        let instruction = Instruction::decode(self.code, self.pc);
        self.pc += instruction.len();
        Some(instruction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_push() {
        let code = [Opcode::PUSH2 as u8, 0x01, 0x02, Opcode::ADD as u8];
        let inst = Instruction::decode(&code, 0);
        assert_eq!(inst.opcode(), Some(Opcode::PUSH2));
        assert_eq!(inst.len(), 3);
        assert_eq!(inst.push_value(), Some(U256::from(0x0102)));
        assert_eq!(format!("{inst:?}"), "PUSH2 0x102");
    }

    #[test]
    fn test_decode_pushc_keeps_footprint() {
        let code = [Opcode::PUSHC as u8, 7, 3, 0xBE, 0xEF, Opcode::POP as u8];
        let inst = Instruction::decode(&code, 0);
        assert_eq!(inst.len(), 5);
        assert_eq!(inst.pool_index(), Some(7));
        assert_eq!(inst.push_value(), None);
        assert_eq!(format!("{inst:?}"), "PUSHC #7");
    }

    #[test]
    fn test_iterator_skips_immediates() {
        let code = [
            Opcode::PUSH1 as u8,
            Opcode::JUMPDEST as u8,
            Opcode::JUMPDEST as u8,
            0xEF,
            0,
            0,
        ];
        let ops: Vec<(usize, u8)> = Instructions::new(&code, 4)
            .map(|inst| (inst.offset, inst.opcode))
            .collect();
        assert_eq!(
            ops,
            vec![(0, Opcode::PUSH1 as u8), (2, Opcode::JUMPDEST as u8), (3, 0xEF)]
        );
    }

    #[test]
    fn test_truncated_push_reads_into_padding() {
        let code = [Opcode::PUSH4 as u8, 0xAA, 0, 0, 0, 0];
        let inst = Instructions::new(&code, 2).next().unwrap();
        assert_eq!(inst.push_value(), Some(U256::from(0xAA000000u64)));
        assert_eq!(format!("{:?}", Instruction::decode(&code, 5)), "STOP");
    }
}
