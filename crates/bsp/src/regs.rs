// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Register accessors: `base + offset`, no I/O.

use crate::periph_map::{gpio, uart};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartRegs {
    base: u32,
    tx_busy_offset: u32,
    tx_data_offset: u32,
}

impl UartRegs {
    pub const fn new(base: u32) -> Self {
        Self::with_offsets(base, uart::TX_BUSY_OFFSET, uart::TX_DATA_OFFSET)
    }

    pub const fn with_offsets(base: u32, tx_busy_offset: u32, tx_data_offset: u32) -> Self {
        Self {
            base,
            tx_busy_offset,
            tx_data_offset,
        }
    }

    pub const fn base(&self) -> u32 {
        self.base
    }

    /// Read only. Non-zero while a byte is in flight; a `tx_data` write has
    /// no effect until it reads zero.
    pub const fn tx_busy(&self) -> u32 {
        self.base + self.tx_busy_offset
    }

    /// Write only, 8 bits wide.
    pub const fn tx_data(&self) -> u32 {
        self.base + self.tx_data_offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioRegs {
    base: u32,
    state_offset: u32,
}

impl GpioRegs {
    pub const fn new(base: u32) -> Self {
        Self::with_offset(base, gpio::GPIO_STATE_OFFSET)
    }

    pub const fn with_offset(base: u32, state_offset: u32) -> Self {
        Self { base, state_offset }
    }

    pub const fn base(&self) -> u32 {
        self.base
    }

    /// Output level of every line, one bit per line.
    pub const fn state(&self) -> u32 {
        self.base + self.state_offset
    }
}

/// Bit offsets of the LED lines in the GPIO state word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedLines {
    pub green: u32,
    pub red: u32,
}

impl LedLines {
    pub const DEFAULT: Self = Self {
        green: gpio::gpio_state::LED_G_0,
        red: gpio::gpio_state::LED_R_0,
    };
}

/// Where the board's registers and LED lines live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    pub uart: UartRegs,
    pub gpio: GpioRegs,
    pub leds: LedLines,
}

impl BoardLayout {
    /// Layout from the generated address table.
    pub const DEFAULT: Self = Self {
        uart: UartRegs::new(uart::BASE),
        gpio: GpioRegs::new(gpio::BASE),
        leds: LedLines::DEFAULT,
    };
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}
