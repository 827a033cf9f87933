//! Process-wide opcode metrics table
//!
//! The dispatcher needs gas tier and stack arity for every instruction it
//! executes. Those facts never depend on the program, so they are pulled out
//! of [`instruction_info`] once per process and shared by every prepared
//! program afterwards.

use std::ops::Index;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::core::opcodes::{GasPriceTier, instruction_info};

/// Per-opcode facts consumed by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstructionMetric {
    pub gas_price_tier: GasPriceTier,
    /// Stack items consumed
    pub args: u8,
    /// Stack items produced
    pub ret: u8,
}

/// Opcode-indexed table of [`InstructionMetric`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsTable {
    entries: [InstructionMetric; 256],
}

impl MetricsTable {
    fn build() -> Self {
        let mut entries = [InstructionMetric::default(); 256];
        for (byte, entry) in (0..=u8::MAX).zip(entries.iter_mut()) {
            let info = instruction_info(byte);
            *entry = InstructionMetric {
                gas_price_tier: info.gas_price_tier,
                args: info.args,
                ret: info.ret,
            };
        }
        Self { entries }
    }

    #[inline]
    pub fn get(&self, opcode: u8) -> &InstructionMetric {
        &self.entries[opcode as usize]
    }

    pub fn as_slice(&self) -> &[InstructionMetric] {
        &self.entries
    }
}

impl Index<u8> for MetricsTable {
    type Output = InstructionMetric;

    #[inline]
    fn index(&self, opcode: u8) -> &InstructionMetric {
        self.get(opcode)
    }
}

static METRICS: OnceCell<MetricsTable> = OnceCell::new();

/// Build the metrics table if no caller has yet.
///
/// Concurrent first callers block until the single builder finishes, so no
/// reader can observe a partially populated table. Later calls are no-ops.
pub fn init_metrics() -> &'static MetricsTable {
    METRICS.get_or_init(|| {
        debug!("building opcode metrics table");
        MetricsTable::build()
    })
}

/// The process-wide metrics table, built on first use
#[inline]
pub fn metrics() -> &'static MetricsTable {
    init_metrics()
}
