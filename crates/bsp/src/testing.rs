// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::mmio::Mmio;
use crate::regs::BoardLayout;
use std::collections::HashMap;

/// Unwind payload raised by [`FakeMmio::halt`].
#[derive(Debug)]
pub struct Halted;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read(u32),
    Write32(u32, u32),
    Write8(u32, u8),
}

/// Register file with a UART busy flag that stays set for a fixed number of
/// polls after each transmitted byte.
#[derive(Debug)]
pub struct FakeMmio {
    layout: BoardLayout,
    regs: HashMap<u32, u32>,
    pub log: Vec<Access>,
    pub tx: Vec<u8>,
    pub busy_polls: u32,
    pub busy_after_write: u32,
    pub writes_while_busy: u32,
}

impl FakeMmio {
    pub fn new() -> Self {
        Self {
            layout: BoardLayout::DEFAULT,
            regs: HashMap::new(),
            log: Vec::new(),
            tx: Vec::new(),
            busy_polls: 0,
            busy_after_write: 0,
            writes_while_busy: 0,
        }
    }

    pub fn set_gpio_state(&mut self, value: u32) {
        self.regs.insert(self.layout.gpio.state(), value);
    }

    pub fn gpio_state(&self) -> u32 {
        self.regs
            .get(&self.layout.gpio.state())
            .copied()
            .unwrap_or(0)
    }

    pub fn touched(&self, addr: u32) -> bool {
        self.log.iter().any(|a| match *a {
            Access::Read(x) | Access::Write32(x, _) | Access::Write8(x, _) => x == addr,
        })
    }
}

impl Mmio for FakeMmio {
    fn read_u32(&mut self, addr: u32) -> u32 {
        self.log.push(Access::Read(addr));
        if addr == self.layout.uart.tx_busy() {
            if self.busy_polls > 0 {
                self.busy_polls -= 1;
                return 1;
            }
            return 0;
        }
        self.regs.get(&addr).copied().unwrap_or(0)
    }

    fn write_u32(&mut self, addr: u32, value: u32) {
        self.log.push(Access::Write32(addr, value));
        self.regs.insert(addr, value);
    }

    fn write_u8(&mut self, addr: u32, value: u8) {
        self.log.push(Access::Write8(addr, value));
        if addr == self.layout.uart.tx_data() {
            if self.busy_polls > 0 {
                self.writes_while_busy += 1;
                return;
            }
            self.tx.push(value);
            self.busy_polls = self.busy_after_write;
        }
    }

    fn halt(&mut self) -> ! {
        std::panic::resume_unwind(Box::new(Halted))
    }
}
