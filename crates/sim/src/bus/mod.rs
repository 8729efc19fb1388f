// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::memory::LinearMemory;
use crate::peripherals::gpio::GpioPort;
use crate::peripherals::uart::Uart;
use crate::{Bus, Peripheral, SimResult, SimulationError};
use mtk_config::{HardwareDescription, PeripheralKind};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
pub struct PeripheralEntry {
    pub name: String,
    pub base: u64,
    pub size: u64,
    pub dev: Box<dyn Peripheral>,
}

/// Why the bus stopped the board. Raised as an unwind payload out of
/// [`mtk_bsp::Mmio`] calls, which cannot return errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimStop {
    Halt,
    Fault(SimulationError),
}

#[derive(Debug, Default)]
pub struct SystemBus {
    pub peripherals: Vec<PeripheralEntry>,
    accesses: u64,
}

impl SystemBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps every described peripheral the model knows how to build.
    pub fn from_description(desc: &HardwareDescription) -> anyhow::Result<Self> {
        let mut bus = Self::new();

        for p_cfg in &desc.peripherals {
            let dev: Box<dyn Peripheral> = match p_cfg.kind {
                PeripheralKind::Uart => match Uart::from_config(p_cfg) {
                    Some(uart) => Box::new(uart),
                    None => {
                        tracing::warn!(
                            "UART '{}' lacks tx_busy/tx_data registers; skipping",
                            p_cfg.basename
                        );
                        continue;
                    }
                },
                PeripheralKind::Gpio => match GpioPort::from_config(p_cfg) {
                    Some(gpio) => Box::new(gpio),
                    None => {
                        tracing::warn!(
                            "GPIO '{}' lacks a gpio_state register; skipping",
                            p_cfg.basename
                        );
                        continue;
                    }
                },
                PeripheralKind::Memory => {
                    let size = usize::try_from(p_cfg.span())?;
                    Box::new(LinearMemory::new(size, p_cfg.base()))
                }
            };

            tracing::debug!(
                "Mapped {} at {:#x}..{:#x}",
                p_cfg.basename,
                p_cfg.first_valid_addr,
                p_cfg.last_valid_addr
            );
            bus.peripherals.push(PeripheralEntry {
                name: p_cfg.basename.clone(),
                base: p_cfg.base(),
                size: p_cfg.span(),
                dev,
            });
        }

        Ok(bus)
    }

    /// Attach a UART TX capture sink to any UART peripherals on this bus.
    ///
    /// When `echo_stdout` is false, UART writes are not printed to stdout.
    pub fn attach_uart_tx_sink(&mut self, sink: Arc<Mutex<Vec<u8>>>, echo_stdout: bool) {
        for uart in self.devices_mut::<Uart>() {
            uart.set_sink(Some(sink.clone()), echo_stdout);
        }
    }

    pub fn set_uart_busy_ticks(&mut self, ticks: u32) {
        for uart in self.devices_mut::<Uart>() {
            uart.set_busy_ticks(ticks);
        }
    }

    /// The peripheral mapped as `name`, if it is a `T`.
    pub fn find<T: 'static>(&self, name: &str) -> Option<&T> {
        self.peripherals
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.dev.as_any())
            .and_then(|any| any.downcast_ref::<T>())
    }

    pub fn devices<T: 'static>(&self) -> impl Iterator<Item = &T> {
        self.peripherals
            .iter()
            .filter_map(|p| p.dev.as_any()?.downcast_ref::<T>())
    }

    fn devices_mut<T: 'static>(&mut self) -> impl Iterator<Item = &mut T> {
        self.peripherals
            .iter_mut()
            .filter_map(|p| p.dev.as_any_mut()?.downcast_mut::<T>())
    }

    /// Number of [`mtk_bsp::Mmio`] accesses made so far.
    pub fn accesses(&self) -> u64 {
        self.accesses
    }

    fn locate(&self, addr: u64) -> Option<usize> {
        self.peripherals
            .iter()
            .position(|p| addr >= p.base && addr < p.base + p.size)
    }

    /// Counts one access, then lets every device advance by a tick.
    fn complete_access<T>(&mut self, res: SimResult<T>) -> T {
        self.accesses += 1;
        self.tick_peripherals();
        match res {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!("Bus fault: {}", e);
                std::panic::resume_unwind(Box::new(SimStop::Fault(e)))
            }
        }
    }
}

impl Bus for SystemBus {
    fn read_u8(&self, addr: u64) -> SimResult<u8> {
        let idx = self
            .locate(addr)
            .ok_or(SimulationError::MemoryViolation(addr))?;
        let p = &self.peripherals[idx];
        p.dev.read(addr - p.base)
    }

    fn write_u8(&mut self, addr: u64, value: u8) -> SimResult<()> {
        let idx = self
            .locate(addr)
            .ok_or(SimulationError::MemoryViolation(addr))?;
        let p = &mut self.peripherals[idx];
        p.dev.write(addr - p.base, value)
    }

    fn tick_peripherals(&mut self) {
        for p in &mut self.peripherals {
            p.dev.tick();
        }
    }
}

impl mtk_bsp::Mmio for SystemBus {
    fn read_u32(&mut self, addr: u32) -> u32 {
        let res = Bus::read_u32(self, u64::from(addr));
        self.complete_access(res)
    }

    fn write_u32(&mut self, addr: u32, value: u32) {
        let res = Bus::write_u32(self, u64::from(addr), value);
        self.complete_access(res)
    }

    fn write_u8(&mut self, addr: u32, value: u8) {
        let res = Bus::write_u8(self, u64::from(addr), value);
        self.complete_access(res)
    }

    fn halt(&mut self) -> ! {
        tracing::debug!("Board halted after {} accesses", self.accesses);
        std::panic::resume_unwind(Box::new(SimStop::Halt))
    }
}
