/*!
 * Register Context
 * Minimal simulated CPU state saved and restored across context switches
 */

use serde::{Deserialize, Serialize};

const TEXT_BASE: u64 = 0x40_0000;
const STACK_BASE: u64 = 0x7FFF_FFF0;
const INSTRUCTION_WIDTH: u64 = 4;

/// Simulated register file of one process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterContext {
    pub program_counter: u64,
    pub stack_pointer: u64,
    pub accumulator: u64,
}

impl RegisterContext {
    /// Advance the simulated program by one step per executed time unit
    pub fn execute(&mut self, units: u64) {
        self.accumulator = self.accumulator.wrapping_add(units);
        self.program_counter = self
            .program_counter
            .wrapping_add(units.wrapping_mul(INSTRUCTION_WIDTH));
    }
}

impl Default for RegisterContext {
    fn default() -> Self {
        Self {
            program_counter: TEXT_BASE,
            stack_pointer: STACK_BASE,
            accumulator: 0,
        }
    }
}
