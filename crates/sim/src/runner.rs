// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bus::{SimStop, SystemBus};
use crate::layout::{board_layout, spin_delay, GREEN_LED_LINE, RED_LED_LINE};
use crate::peripherals::gpio::GpioPort;
use crate::peripherals::uart::Uart;
use crate::SimulationError;
use anyhow::Context;
use mtk_bsp::blink::{self, BlinkPhase, HALF_PERIOD_MS};
use mtk_bsp::{Board, LedLines};
use mtk_config::{HardwareDescription, PeripheralKind};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

/// What the board is made to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scenario {
    /// Runs the blink loop for a fixed number of half-periods.
    Blink { half_periods: u32 },
    Print { message: String },
    GpioWrite { offset: u32, high: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Completed,
    /// The board took its fatal path.
    Halt,
    MemoryViolation,
}

/// LED levels at the end of one blink half-period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedSample {
    pub half_period: u32,
    pub green: bool,
    pub red: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub hardware: String,
    pub scenario: Scenario,
    pub stop_reason: StopReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault_address: Option<u64>,
    pub led_trace: Vec<LedSample>,
    pub uart_output: String,
    pub uart_dropped_writes: u64,
    pub gpio_state: u32,
    pub bus_accesses: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SimOptions {
    /// Overrides every UART's `busy_ticks`.
    pub uart_busy_ticks: Option<u32>,
    /// Copies UART output to stdout as it is sent.
    pub echo_uart: bool,
}

/// One board wired to the register model of a hardware description.
pub struct Simulation {
    hardware: String,
    gpio_name: String,
    leds: LedLines,
    board: Board<SystemBus>,
    uart_sink: Arc<Mutex<Vec<u8>>>,
}

impl Simulation {
    pub fn new(desc: &HardwareDescription, options: &SimOptions) -> anyhow::Result<Self> {
        let layout = board_layout(desc, GREEN_LED_LINE, RED_LED_LINE)
            .with_context(|| format!("'{}' cannot host the board", desc.name))?;
        let gpio_name = desc
            .first_of_kind(PeripheralKind::Gpio)
            .map(|p| p.basename.clone())
            .unwrap_or_default();

        let mut bus = SystemBus::from_description(desc)?;
        let uart_sink = Arc::new(Mutex::new(Vec::new()));
        bus.attach_uart_tx_sink(uart_sink.clone(), options.echo_uart);
        if let Some(ticks) = options.uart_busy_ticks {
            bus.set_uart_busy_ticks(ticks);
        }

        Ok(Self {
            hardware: desc.name.clone(),
            gpio_name,
            leds: layout.leds,
            board: Board::with_layout(bus, layout, spin_delay(desc)),
            uart_sink,
        })
    }

    pub fn run(mut self, scenario: Scenario) -> RunReport {
        tracing::info!("Running {:?} on '{}'", scenario, self.hardware);

        let mut led_trace = Vec::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            Self::drive(&mut self.board, &scenario, self.leds, &self.gpio_name, &mut led_trace)
        }));

        let (stop_reason, fault_address) = match outcome {
            Ok(()) => (StopReason::Completed, None),
            Err(payload) => match payload.downcast::<SimStop>() {
                Ok(stop) => match *stop {
                    SimStop::Halt => (StopReason::Halt, None),
                    SimStop::Fault(SimulationError::MemoryViolation(addr)) => {
                        tracing::warn!("Memory access violation at {:#x}", addr);
                        (StopReason::MemoryViolation, Some(addr))
                    }
                },
                Err(other) => panic::resume_unwind(other),
            },
        };

        let bus = self.board.release();
        let uart_output = self
            .uart_sink
            .lock()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default();
        let report = RunReport {
            hardware: self.hardware,
            scenario,
            stop_reason,
            fault_address,
            led_trace,
            uart_output,
            uart_dropped_writes: bus.devices::<Uart>().map(Uart::dropped_writes).sum(),
            gpio_state: bus
                .find::<GpioPort>(&self.gpio_name)
                .map(GpioPort::state)
                .unwrap_or(0),
            bus_accesses: bus.accesses(),
        };
        tracing::info!(
            "Stopped ({:?}) after {} bus accesses",
            report.stop_reason,
            report.bus_accesses
        );
        report
    }

    fn drive(
        board: &mut Board<SystemBus>,
        scenario: &Scenario,
        leds: LedLines,
        gpio_name: &str,
        led_trace: &mut Vec<LedSample>,
    ) {
        match scenario {
            Scenario::Blink { half_periods } => {
                let mut phase = BlinkPhase::default();
                for half_period in 0..*half_periods {
                    phase = blink::step(board, phase, HALF_PERIOD_MS);
                    // Sampled straight from the model so the trace costs no bus accesses.
                    if let Some(gpio) = board.mmio().find::<GpioPort>(gpio_name) {
                        led_trace.push(LedSample {
                            half_period,
                            green: gpio.line(leds.green),
                            red: gpio.line(leds.red),
                        });
                    }
                }
            }
            Scenario::Print { message } => board.print(message),
            Scenario::GpioWrite { offset, high } => board.gpio_set_state(*offset, *high),
        }
    }
}
