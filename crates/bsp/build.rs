// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{bail, Context, Result};
use mtk_codegen::AddressTableGenerator;
use mtk_config::HardwareDescription;
use std::env;
use std::fs;
use std::path::PathBuf;

const DESCRIPTION_ENV: &str = "MTK_HW_DESCRIPTION";

// Registers and lines the board-support code refers to by name.
const REQUIRED_REGISTERS: &[(&str, &str)] = &[
    ("uart", "tx_busy"),
    ("uart", "tx_data"),
    ("gpio", "gpio_state"),
];
const REQUIRED_GPIO_LINES: &[&str] = &["led_g_0", "led_r_0"];

fn main() -> Result<()> {
    let manifest_dir =
        PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").context("CARGO_MANIFEST_DIR not set")?);
    let path = match env::var_os(DESCRIPTION_ENV) {
        Some(p) => PathBuf::from(p),
        None => manifest_dir.join("../../hw/mtkcpu.yaml"),
    };
    println!("cargo:rerun-if-env-changed={}", DESCRIPTION_ENV);
    println!("cargo:rerun-if-changed={}", path.display());

    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read hardware description {:?}", path))?;
    let desc = HardwareDescription::from_yaml(&text)?;
    check_board_requirements(&desc)?;

    let table = AddressTableGenerator::generate(&desc, &mtk_codegen::digest(&text))?;
    let out = PathBuf::from(env::var_os("OUT_DIR").context("OUT_DIR not set")?);
    fs::write(out.join("periph_map.rs"), table).context("Failed to write periph_map.rs")?;
    Ok(())
}

fn check_board_requirements(desc: &HardwareDescription) -> Result<()> {
    for (periph, reg) in REQUIRED_REGISTERS {
        let found = desc
            .peripheral(periph)
            .and_then(|p| p.register(reg))
            .is_some();
        if !found {
            bail!("{}: board support needs register {}.{}", desc.name, periph, reg);
        }
    }
    let state = desc
        .peripheral("gpio")
        .and_then(|p| p.register("gpio_state"));
    for line in REQUIRED_GPIO_LINES {
        if state.and_then(|r| r.bit(line)).is_none() {
            bail!("{}: board support needs GPIO line {}", desc.name, line);
        }
    }
    Ok(())
}
