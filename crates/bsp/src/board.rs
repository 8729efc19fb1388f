// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::delay::SpinDelay;
use crate::led::Led;
use crate::mmio::Mmio;
use crate::regs::BoardLayout;
use core::fmt;

/// Number of lines in the GPIO state word.
pub const GPIO_LINES: u32 = 32;

/// Board-support utilities over an exclusively owned register handle.
///
/// The GPIO read-modify-write is not atomic. It is only correct while this
/// board is the sole writer of the state word: no interrupts, one core.
#[derive(Debug)]
pub struct Board<M: Mmio> {
    mmio: M,
    layout: BoardLayout,
    delay: SpinDelay,
}

impl<M: Mmio> Board<M> {
    /// Board described by the generated address table.
    pub fn new(mmio: M) -> Self {
        Self::with_layout(mmio, BoardLayout::DEFAULT, SpinDelay::DEFAULT)
    }

    pub fn with_layout(mmio: M, layout: BoardLayout, delay: SpinDelay) -> Self {
        Self {
            mmio,
            layout,
            delay,
        }
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn delay(&self) -> SpinDelay {
        self.delay
    }

    pub fn mmio(&self) -> &M {
        &self.mmio
    }

    /// Gives the register handle back.
    pub fn release(self) -> M {
        self.mmio
    }

    /// Busy-waits for roughly `ms` milliseconds.
    pub fn sleep(&mut self, ms: u32) {
        self.delay.countdown(ms);
    }

    /// Current value of the GPIO state word.
    pub fn gpio_state(&mut self) -> u32 {
        self.mmio.read_u32(self.layout.gpio.state())
    }

    /// Drives line `offset` high or low, leaving every other line as is.
    ///
    /// `offset` must be below [`GPIO_LINES`]; anything else halts the board
    /// before the state word is touched.
    pub fn gpio_set_state(&mut self, offset: u32, high: bool) {
        crate::bsp_assert!(self, offset < GPIO_LINES);
        let addr = self.layout.gpio.state();
        let old_value_masked = self.mmio.read_u32(addr) & all_ones_but_one(offset);
        self.mmio
            .write_u32(addr, old_value_masked | (u32::from(high) << offset));
    }

    pub fn gpio_on(&mut self, offset: u32) {
        self.gpio_set_state(offset, true);
    }

    pub fn gpio_off(&mut self, offset: u32) {
        self.gpio_set_state(offset, false);
    }

    pub fn enable_green_led(&mut self) {
        self.gpio_on(self.layout.leds.green);
    }

    pub fn disable_green_led(&mut self) {
        self.gpio_off(self.layout.leds.green);
    }

    pub fn enable_red_led(&mut self) {
        self.gpio_on(self.layout.leds.red);
    }

    pub fn disable_red_led(&mut self) {
        self.gpio_off(self.layout.leds.red);
    }

    pub fn green_led(&mut self) -> Led<'_, M> {
        let line = self.layout.leds.green;
        Led::new(self, line)
    }

    pub fn red_led(&mut self) -> Led<'_, M> {
        let line = self.layout.leds.red;
        Led::new(self, line)
    }

    /// Sends one byte. Spins without timeout while the UART is busy.
    pub fn uart_putc(&mut self, c: u8) {
        let regs = self.layout.uart;
        while self.mmio.read_u32(regs.tx_busy()) != 0 {}
        self.mmio.write_u8(regs.tx_data(), c);
    }

    /// Sends `msg` up to its first NUL byte, then a line terminator.
    pub fn print(&mut self, msg: &str) {
        for &c in msg.as_bytes().iter().take_while(|&&c| c != 0) {
            self.uart_putc(c);
        }
        self.uart_putc(b'\n');
    }

    /// Prints `msg` and never returns.
    pub fn fatal(&mut self, msg: &str) -> ! {
        self.print(msg);
        self.mmio.halt()
    }

    /// Calls [`fatal`](Self::fatal) with `msg` unless `cond` holds.
    pub fn check(&mut self, cond: bool, msg: &str) {
        if !cond {
            self.fatal(msg);
        }
    }
}

impl<M: Mmio> fmt::Write for Board<M> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for &c in s.as_bytes() {
            self.uart_putc(c);
        }
        Ok(())
    }
}

fn all_ones_but_one(zero_offset: u32) -> u32 {
    !(1 << zero_offset)
}
