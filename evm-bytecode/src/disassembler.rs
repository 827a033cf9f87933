//! Bytecode disassembler
//!
//! Provides multiple output formats for inspecting analyzed or prepared code:
//! - Compact: Simple instruction listing
//! - Verbose: Offsets, side tables and comments
//! - Hexdump: Raw hex bytes with instruction annotations
//!
//! ## Example
//!
//! ```ignore
//! use evm_bytecode::{Disassembler, DisassemblyFormat, prepare};
//!
//! let prepared = prepare(&[0x5b, 0x60, 0x00, 0x56]);
//! let listing = Disassembler::with_format(DisassemblyFormat::Verbose)
//!     .show_hex(true)
//!     .disassemble(&prepared);
//! println!("{listing}");
//! ```

use std::fmt::Write as _;
use std::io::Write;

use crate::core::code::{Analyzed, CodeSpace, Prepared};
use crate::core::constants::ConstantPool;
use crate::core::instructions::{Instruction, Instructions};
use crate::core::jumpdest::JumpDestTable;
use crate::core::opcodes::Opcode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisassemblyFormat {
    /// Compact format: "PUSH2 0x1234"
    Compact,

    /// Verbose format with offsets and comments
    /// "0003: JUMPV  ; jump to pre-verified destination"
    Verbose,

    /// Raw hexadecimal dump
    /// "0000:  61 12 34  |PUSH2 0x1234|"
    Hexdump,
}

#[derive(Debug, Clone)]
pub struct DisassemblerConfig {
    pub format: DisassemblyFormat,
    pub show_addresses: bool,
    pub show_hex: bool,
    pub show_comments: bool,
    pub show_constant_pool: bool,
    pub show_jump_table: bool,
}

impl Default for DisassemblerConfig {
    fn default() -> Self {
        Self {
            format: DisassemblyFormat::Verbose,
            show_addresses: true,
            show_hex: false,
            show_comments: true,
            show_constant_pool: true,
            show_jump_table: true,
        }
    }
}

/// Code that can be listed: anything past the JUMPDEST scan
pub trait Disassemble {
    fn instructions(&self) -> Instructions<'_>;
    fn jump_dests(&self) -> &JumpDestTable;
    fn constant_pool(&self) -> Option<&ConstantPool>;
    fn program_len(&self) -> usize;
}

impl Disassemble for CodeSpace<Analyzed> {
    fn instructions(&self) -> Instructions<'_> {
        CodeSpace::<Analyzed>::instructions(self)
    }

    fn jump_dests(&self) -> &JumpDestTable {
        CodeSpace::<Analyzed>::jump_dests(self)
    }

    fn constant_pool(&self) -> Option<&ConstantPool> {
        None
    }

    fn program_len(&self) -> usize {
        self.len()
    }
}

impl Disassemble for CodeSpace<Prepared> {
    fn instructions(&self) -> Instructions<'_> {
        CodeSpace::<Prepared>::instructions(self)
    }

    fn jump_dests(&self) -> &JumpDestTable {
        CodeSpace::<Prepared>::jump_dests(self)
    }

    fn constant_pool(&self) -> Option<&ConstantPool> {
        Some(CodeSpace::<Prepared>::constant_pool(self))
    }

    fn program_len(&self) -> usize {
        self.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Disassembler {
    config: DisassemblerConfig,
}

impl Disassembler {
    pub fn new() -> Self {
        Self {
            config: DisassemblerConfig::default(),
        }
    }

    pub fn with_format(format: DisassemblyFormat) -> Self {
        Self {
            config: DisassemblerConfig {
                format,
                ..Default::default()
            },
        }
    }

    pub fn show_addresses(mut self, show: bool) -> Self {
        self.config.show_addresses = show;
        self
    }

    pub fn show_hex(mut self, show: bool) -> Self {
        self.config.show_hex = show;
        self
    }

    pub fn show_comments(mut self, show: bool) -> Self {
        self.config.show_comments = show;
        self
    }

    pub fn show_constant_pool(mut self, show: bool) -> Self {
        self.config.show_constant_pool = show;
        self
    }

    pub fn show_jump_table(mut self, show: bool) -> Self {
        self.config.show_jump_table = show;
        self
    }

    pub fn disassemble(&self, code: &impl Disassemble) -> String {
        match self.config.format {
            DisassemblyFormat::Compact => self.format_compact(code),
            DisassemblyFormat::Verbose => self.format_verbose(code),
            DisassemblyFormat::Hexdump => self.format_hexdump(code),
        }
    }

    /// Disassemble to a writer (for file output)
    pub fn disassemble_to_writer(
        &self,
        code: &impl Disassemble,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        write!(writer, "{}", self.disassemble(code))
    }

    fn format_compact(&self, code: &impl Disassemble) -> String {
        let mut output = String::new();

        for inst in code.instructions() {
            let _ = writeln!(output, "{inst:?}");
        }

        output
    }

    fn format_verbose(&self, code: &impl Disassemble) -> String {
        let mut output = String::new();

        if self.config.show_jump_table && !code.jump_dests().is_empty() {
            output.push_str("Jump destinations:\n");
            for dest in code.jump_dests().iter() {
                let _ = writeln!(output, "  {dest:04x}");
            }
            output.push('\n');
        }

        if self.config.show_constant_pool {
            if let Some(pool) = code.constant_pool().filter(|pool| !pool.is_empty()) {
                output.push_str("Constant pool:\n");
                for (idx, value) in pool.iter().enumerate() {
                    let _ = writeln!(output, "  [{idx}]: {value:#x}");
                }
                output.push('\n');
            }
        }

        let _ = writeln!(output, "Code ({} bytes):", code.program_len());
        for inst in code.instructions() {
            if self.config.show_addresses {
                let _ = write!(output, "  {:04x}: ", inst.offset);
            } else {
                output.push_str("  ");
            }

            if self.config.show_hex {
                let _ = write!(output, "{:<24}", hex_bytes(&inst));
            }

            let _ = write!(output, "{inst:?}");

            if self.config.show_comments {
                if let Some(comment) = self.instruction_comment(&inst, code.constant_pool()) {
                    let _ = write!(output, "  ; {comment}");
                }
            }

            output.push('\n');
        }

        output
    }

    fn format_hexdump(&self, code: &impl Disassemble) -> String {
        let mut output = String::new();

        for inst in code.instructions() {
            let _ = writeln!(output, "{:04x}:  {}  |{:?}|", inst.offset, hex_bytes(&inst), inst);
        }

        output
    }

    /// Get a readable comment for an instruction
    fn instruction_comment(
        &self,
        inst: &Instruction<'_>,
        pool: Option<&ConstantPool>,
    ) -> Option<String> {
        let comment = match inst.opcode()? {
            Opcode::JUMPDEST => "jump target".to_string(),
            Opcode::JUMP | Opcode::JUMPI => "dynamic destination, checked at run time".to_string(),
            Opcode::JUMPV => "jump to pre-verified destination".to_string(),
            Opcode::JUMPVI => "conditional jump to pre-verified destination".to_string(),
            Opcode::BAD => "trap".to_string(),
            Opcode::PUSHC => {
                let index = inst.pool_index()?;
                match pool.and_then(|pool| pool.get(index).ok()) {
                    Some(value) => format!("push constant {value:#x}"),
                    None => format!("push constant #{index}"),
                }
            }
            _ => return None,
        };

        Some(comment)
    }
}

fn hex_bytes(inst: &Instruction<'_>) -> String {
    let mut hex = format!("{:02x}", inst.opcode);
    for byte in inst.immediate {
        let _ = write!(hex, " {byte:02x}");
    }
    hex
}
