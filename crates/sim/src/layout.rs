// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Builds a [`BoardLayout`] and calibration from a parsed description
//! instead of the generated address table.

use mtk_bsp::{BoardLayout, GpioRegs, LedLines, SpinDelay, UartRegs};
use mtk_config::{HardwareDescription, PeripheralConfig, PeripheralKind};

pub const GREEN_LED_LINE: &str = "led_g_0";
pub const RED_LED_LINE: &str = "led_r_0";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Hardware description has no {0:?} peripheral")]
    MissingPeripheral(PeripheralKind),
    #[error("Peripheral '{peripheral}' has no register '{register}'")]
    MissingRegister { peripheral: String, register: String },
    #[error("GPIO register '{register}' has no line '{line}'")]
    MissingLine { register: String, line: String },
    #[error("Address {0:#x} does not fit the 32-bit bus")]
    AddressTooWide(u64),
}

/// Layout for the first UART and GPIO of `desc`, with the LEDs on the named
/// lines of the GPIO state register.
pub fn board_layout(
    desc: &HardwareDescription,
    green: &str,
    red: &str,
) -> Result<BoardLayout, LayoutError> {
    let uart = desc
        .first_of_kind(PeripheralKind::Uart)
        .ok_or(LayoutError::MissingPeripheral(PeripheralKind::Uart))?;
    let gpio = desc
        .first_of_kind(PeripheralKind::Gpio)
        .ok_or(LayoutError::MissingPeripheral(PeripheralKind::Gpio))?;

    let state = register(gpio, "gpio_state")?;
    let line = |name: &str| {
        state
            .bit(name)
            .map(|b| b.offset)
            .ok_or_else(|| LayoutError::MissingLine {
                register: state.name.clone(),
                line: name.to_string(),
            })
    };

    Ok(BoardLayout {
        uart: UartRegs::with_offsets(
            narrow(uart.base())?,
            narrow(register(uart, "tx_busy")?.addr)?,
            narrow(register(uart, "tx_data")?.addr)?,
        ),
        gpio: GpioRegs::with_offset(narrow(gpio.base())?, narrow(state.addr)?),
        leds: LedLines {
            green: line(green)?,
            red: line(red)?,
        },
    })
}

pub fn spin_delay(desc: &HardwareDescription) -> SpinDelay {
    SpinDelay::from_clock(desc.cpu.cycles_per_ms, desc.cpu.cycles_per_instr)
}

fn register<'a>(
    periph: &'a PeripheralConfig,
    name: &str,
) -> Result<&'a mtk_config::RegisterConfig, LayoutError> {
    periph
        .register(name)
        .ok_or_else(|| LayoutError::MissingRegister {
            peripheral: periph.basename.clone(),
            register: name.to_string(),
        })
}

fn narrow(addr: u64) -> Result<u32, LayoutError> {
    u32::try_from(addr).map_err(|_| LayoutError::AddressTooWide(addr))
}
