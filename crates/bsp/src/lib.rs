// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Board support for the mtkcpu SoC.
//!
//! Everything here is synchronous and single-threaded: GPIO writes are
//! read-modify-write sequences on a shared state word, UART output polls a
//! busy flag, and delays spin on a volatile counter. The [`Board`] owns the
//! register handle, so nothing else can reach the hardware.

#![cfg_attr(not(test), no_std)]

mod macros;

pub mod blink;
pub mod board;
pub mod delay;
pub mod led;
pub mod mmio;
pub mod periph_map;
pub mod regs;

#[cfg(test)]
mod testing;

pub use board::{Board, GPIO_LINES};
pub use delay::SpinDelay;
pub use led::Led;
pub use mmio::{Mmio, Volatile};
pub use regs::{BoardLayout, GpioRegs, LedLines, UartRegs};
