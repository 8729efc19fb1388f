// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::Context;
use clap::{Parser, Subcommand};
use mtk_codegen::AddressTableGenerator;
use mtk_config::HardwareDescription;
use mtk_sim::layout::{board_layout, GREEN_LED_LINE, RED_LED_LINE};
use mtk_sim::{RunReport, Scenario, SimOptions, Simulation, StopReason};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable register-level tracing
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a hardware description
    Check {
        /// Path to the hardware description (YAML)
        #[arg(long)]
        hw: PathBuf,
    },
    /// Generate the peripheral address table
    Gen {
        /// Path to the hardware description (YAML)
        #[arg(long)]
        hw: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Run the board-support code against the register model
    Sim {
        /// Path to the hardware description (YAML)
        #[arg(long)]
        hw: PathBuf,

        /// Write the run report (JSON) to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Override the UART busy time, in bus accesses
        #[arg(long)]
        uart_busy_ticks: Option<u32>,

        /// Print UART bytes as they are sent
        #[arg(long)]
        echo_uart: bool,

        #[command(subcommand)]
        scenario: ScenarioArg,
    },
}

#[derive(Subcommand, Debug)]
enum ScenarioArg {
    /// Run the blink loop
    Blink {
        /// Number of half-periods to run
        #[arg(long, default_value = "4")]
        half_periods: u32,
    },
    /// Print a message over the UART
    Print { message: String },
    /// Drive one GPIO line
    Gpio {
        /// Line offset in the GPIO state word
        #[arg(long)]
        offset: u32,

        /// Drive the line low instead of high
        #[arg(long)]
        low: bool,
    },
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::Blink { half_periods } => Scenario::Blink { half_periods },
            ScenarioArg::Print { message } => Scenario::Print { message },
            ScenarioArg::Gpio { offset, low } => Scenario::GpioWrite { offset, high: !low },
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries generated code and UART output.
    let level = if cli.trace {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Check { hw } => check(hw),
        Command::Gen { hw, out } => generate(hw, out),
        Command::Sim {
            hw,
            report,
            uart_busy_ticks,
            echo_uart,
            scenario,
        } => sim(
            hw,
            report,
            SimOptions {
                uart_busy_ticks,
                echo_uart,
            },
            scenario.into(),
        ),
    }
}

fn check(hw: PathBuf) -> anyhow::Result<ExitCode> {
    info!("Loading hardware description: {:?}", hw);
    let desc = HardwareDescription::from_file(&hw)?;

    info!("Hardware: {}", desc.name);
    info!(
        "CPU: {} cycles/ms, {} cycles/instr",
        desc.cpu.cycles_per_ms, desc.cpu.cycles_per_instr
    );
    for p in &desc.peripherals {
        info!(
            "{:<8} {:?} {:#010x}..{:#010x}",
            p.basename, p.kind, p.first_valid_addr, p.last_valid_addr
        );
        for r in &p.registers {
            info!("    {:<12} +{:#x}", r.name, r.addr);
        }
        for region in &p.regions {
            info!(
                "    region {} at {:#x} ({})",
                region.name, region.start_addr, region.size
            );
        }
    }

    match board_layout(&desc, GREEN_LED_LINE, RED_LED_LINE) {
        Ok(_) => info!("Description provides everything the board needs"),
        Err(e) => warn!("Board support cannot run on this description: {}", e),
    }
    Ok(ExitCode::SUCCESS)
}

fn generate(hw: PathBuf, out: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let table = AddressTableGenerator::generate_from_file(&hw)?;
    match out {
        Some(path) => {
            std::fs::write(&path, &table)
                .with_context(|| format!("Failed to write address table to {:?}", path))?;
            info!("Wrote address table to {:?}", path);
        }
        None => std::io::stdout()
            .write_all(table.as_bytes())
            .context("Failed to write address table to stdout")?,
    }
    Ok(ExitCode::SUCCESS)
}

fn sim(
    hw: PathBuf,
    report_path: Option<PathBuf>,
    options: SimOptions,
    scenario: Scenario,
) -> anyhow::Result<ExitCode> {
    info!("Loading hardware description: {:?}", hw);
    let desc = HardwareDescription::from_file(&hw)?;
    let echo_uart = options.echo_uart;

    let report = Simulation::new(&desc, &options)?.run(scenario);
    if !echo_uart {
        std::io::stdout()
            .write_all(report.uart_output.as_bytes())
            .context("Failed to write UART output")?;
    }
    summarize(&report);

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        info!("Report written to {:?}", path);
    }

    Ok(match report.stop_reason {
        StopReason::Completed => ExitCode::SUCCESS,
        StopReason::Halt => ExitCode::from(1),
        StopReason::MemoryViolation => ExitCode::from(2),
    })
}

fn summarize(report: &RunReport) {
    info!("Stop reason: {:?}", report.stop_reason);
    if let Some(addr) = report.fault_address {
        info!("Fault address: {:#x}", addr);
    }
    info!("GPIO state: {:#010x}", report.gpio_state);
    if !report.led_trace.is_empty() {
        info!("LED half-periods: {}", report.led_trace.len());
    }
    info!(
        "UART: {} bytes sent, {} writes dropped",
        report.uart_output.len(),
        report.uart_dropped_writes
    );
    info!("Bus accesses: {}", report.bus_accesses);
}
