// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Busy-wait delays calibrated by instruction count.
//!
//! There is no timer: a delay of `ms` milliseconds decrements a volatile
//! counter `ms * (cycles_per_ms / cycles_per_instr)` times. Accuracy depends
//! entirely on the calibration matching the running core.

use crate::periph_map::cpu;
use embedded_hal::delay::DelayNs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinDelay {
    instr_per_ms: u32,
}

impl SpinDelay {
    /// Calibration from the generated address table.
    pub const DEFAULT: Self = Self::from_clock(cpu::CYCLES_PER_MS, cpu::CYCLES_PER_INSTR);

    /// `cycles_per_instr` must be non-zero.
    pub const fn from_clock(cycles_per_ms: u32, cycles_per_instr: u32) -> Self {
        Self {
            instr_per_ms: cycles_per_ms / cycles_per_instr,
        }
    }

    pub const fn instr_per_ms(&self) -> u32 {
        self.instr_per_ms
    }

    /// Loop iterations for `ms` milliseconds, saturating at `u32::MAX`.
    pub const fn iterations(&self, ms: u32) -> u32 {
        ms.saturating_mul(self.instr_per_ms)
    }

    /// Loop iterations for `ns` nanoseconds, rounded up to a whole iteration.
    pub const fn ns_iterations(&self, ns: u32) -> u64 {
        (ns as u64 * self.instr_per_ms as u64).div_ceil(1_000_000)
    }

    /// Blocks for roughly `ms` milliseconds. Returns the iterations spun.
    pub fn countdown(&self, ms: u32) -> u32 {
        spin(self.iterations(ms))
    }
}

impl Default for SpinDelay {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl DelayNs for SpinDelay {
    fn delay_ns(&mut self, ns: u32) {
        let mut remaining = self.ns_iterations(ns);
        while remaining > 0 {
            let chunk = remaining.min(u64::from(u32::MAX)) as u32;
            spin(chunk);
            remaining -= u64::from(chunk);
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.countdown(ms);
    }
}

/// Decrements a volatile counter from `iterations` to zero.
pub fn spin(iterations: u32) -> u32 {
    let mut remaining = iterations;
    let counter: *mut u32 = &mut remaining;
    let mut performed = 0;
    // SAFETY: `counter` points to a local that outlives the loop.
    unsafe {
        while counter.read_volatile() != 0 {
            counter.write_volatile(counter.read_volatile() - 1);
            performed += 1;
        }
    }
    performed
}
