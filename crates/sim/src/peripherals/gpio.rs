// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::SimResult;
use mtk_config::PeripheralConfig;

/// GPIO block with a single aggregate state register, one bit per line.
#[derive(Debug, Default)]
pub struct GpioPort {
    state_offset: u64,
    state: u32,
}

impl GpioPort {
    pub fn new(state_offset: u64) -> Self {
        Self {
            state_offset,
            state: 0,
        }
    }

    /// `None` if the description has no `gpio_state` register.
    pub fn from_config(cfg: &PeripheralConfig) -> Option<Self> {
        cfg.register("gpio_state").map(|r| Self::new(r.addr))
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn line(&self, offset: u32) -> bool {
        offset < 32 && self.state & (1 << offset) != 0
    }

    fn byte_lane(&self, offset: u64) -> Option<u32> {
        offset
            .checked_sub(self.state_offset)
            .filter(|lane| *lane < 4)
            .map(|lane| lane as u32)
    }
}

impl crate::Peripheral for GpioPort {
    fn read(&self, offset: u64) -> SimResult<u8> {
        Ok(match self.byte_lane(offset) {
            Some(lane) => ((self.state >> (lane * 8)) & 0xFF) as u8,
            None => 0,
        })
    }

    fn write(&mut self, offset: u64, value: u8) -> SimResult<()> {
        if let Some(lane) = self.byte_lane(offset) {
            let mask = 0xFF << (lane * 8);
            let old = self.state;
            self.state = (self.state & !mask) | ((value as u32) << (lane * 8));
            if self.state != old {
                tracing::debug!("GPIO state {:#010x} -> {:#010x}", old, self.state);
            }
        }
        Ok(())
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }
}
