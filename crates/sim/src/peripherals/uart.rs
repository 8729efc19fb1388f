// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::SimResult;
use mtk_config::PeripheralConfig;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

pub const DEFAULT_BUSY_TICKS: u32 = 1;

/// Transmit-only UART with a busy flag.
///
/// A byte written to `tx_data` while idle goes to the sink and keeps the
/// device busy for `busy_ticks` bus accesses, the write included. Bytes
/// written while busy are dropped.
#[derive(Debug)]
pub struct Uart {
    tx_busy_offset: u64,
    tx_data_offset: u64,
    busy_ticks: u32,
    busy_remaining: u32,
    dropped_writes: u64,
    sink: Option<Arc<Mutex<Vec<u8>>>>,
    echo_stdout: bool,
}

impl Uart {
    pub fn new(tx_busy_offset: u64, tx_data_offset: u64) -> Self {
        Self {
            tx_busy_offset,
            tx_data_offset,
            busy_ticks: DEFAULT_BUSY_TICKS,
            busy_remaining: 0,
            dropped_writes: 0,
            sink: None,
            echo_stdout: false,
        }
    }

    /// `None` if the description lacks `tx_busy` or `tx_data`.
    pub fn from_config(cfg: &PeripheralConfig) -> Option<Self> {
        let busy = cfg.register("tx_busy")?;
        let data = cfg.register("tx_data")?;
        let mut uart = Self::new(busy.addr, data.addr);
        if let Some(ticks) = cfg.config_u64("busy_ticks") {
            uart.set_busy_ticks(u32::try_from(ticks).unwrap_or(u32::MAX));
        }
        Some(uart)
    }

    pub fn set_busy_ticks(&mut self, ticks: u32) {
        self.busy_ticks = ticks;
    }

    pub fn busy_ticks(&self) -> u32 {
        self.busy_ticks
    }

    pub fn is_busy(&self) -> bool {
        self.busy_remaining > 0
    }

    pub fn dropped_writes(&self) -> u64 {
        self.dropped_writes
    }

    pub fn set_sink(&mut self, sink: Option<Arc<Mutex<Vec<u8>>>>, echo_stdout: bool) {
        self.sink = sink;
        self.echo_stdout = echo_stdout;
    }

    fn push_tx(&mut self, value: u8) {
        if let Some(sink) = &self.sink {
            if let Ok(mut guard) = sink.lock() {
                guard.push(value);
            }
        }

        if self.echo_stdout {
            let mut stdout = io::stdout();
            let _ = stdout.write_all(&[value]);
            let _ = stdout.flush();
        }
    }

    fn busy_word(&self) -> u32 {
        u32::from(self.is_busy())
    }
}

impl crate::Peripheral for Uart {
    fn read(&self, offset: u64) -> SimResult<u8> {
        match offset.checked_sub(self.tx_busy_offset) {
            Some(lane @ 0..=3) => Ok(((self.busy_word() >> (lane * 8)) & 0xFF) as u8),
            _ => Ok(0),
        }
    }

    fn write(&mut self, offset: u64, value: u8) -> SimResult<()> {
        if offset != self.tx_data_offset {
            return Ok(());
        }
        if self.is_busy() {
            self.dropped_writes += 1;
            tracing::debug!("UART busy, dropped {:#04x}", value);
            return Ok(());
        }
        self.push_tx(value);
        self.busy_remaining = self.busy_ticks;
        Ok(())
    }

    fn tick(&mut self) {
        self.busy_remaining = self.busy_remaining.saturating_sub(1);
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }
}
