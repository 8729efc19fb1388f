// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Hardware description of the SoC memory map.
//!
//! The description lists every memory-mapped peripheral with its address
//! space, its registers (with optional named bits) and any memory regions it
//! exposes. It is the single source the board-support address table is
//! generated from.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Width of the GPIO state register.
pub const GPIO_STATE_BITS: u32 = 32;

/// Upper bound (exclusive) of the 32-bit physical address space.
const ADDRESS_SPACE_END: u64 = 1 << 32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Duplicate peripheral '{0}'")]
    DuplicatePeripheral(String),
    #[error("Invalid identifier '{0}': expected [a-z_][a-z0-9_]*")]
    InvalidName(String),
    #[error("Peripheral '{name}': word size must be non-zero")]
    ZeroWordSize { name: String },
    #[error("Peripheral '{name}': empty address space {first:#x}..{last:#x}")]
    EmptyAddressSpace { name: String, first: u64, last: u64 },
    #[error("Peripheral '{name}': span {span:#x} is not a multiple of word size {word_size}")]
    MisalignedAddressSpace {
        name: String,
        span: u64,
        word_size: u64,
    },
    #[error("Peripheral '{name}': address space ends at {last:#x}, beyond the 32-bit bus")]
    AddressOutOfRange { name: String, last: u64 },
    #[error("Peripherals '{first}' and '{second}' have overlapping address spaces")]
    OverlappingPeripherals { first: String, second: String },
    #[error("Peripheral '{peripheral}': register '{register}' at offset {offset:#x} is outside the address space")]
    RegisterOutOfRange {
        peripheral: String,
        register: String,
        offset: u64,
    },
    #[error("Peripheral '{peripheral}': duplicate register '{register}'")]
    DuplicateRegister {
        peripheral: String,
        register: String,
    },
    #[error("Register '{register}': bit '{bit}' offset {offset} does not fit a 32-bit register")]
    BitOutOfRange {
        register: String,
        bit: String,
        offset: u32,
    },
    #[error("Register '{register}': bit '{bit}' clashes with another bit by name or offset")]
    DuplicateBit { register: String, bit: String },
    #[error("GPIO '{name}': supports 1 to 32 signals, {count} described")]
    GpioSignalCount { name: String, count: usize },
    #[error("Peripheral '{peripheral}': region '{region}' lies outside the address space")]
    RegionOutOfRange { peripheral: String, region: String },
    #[error("Region '{region}': invalid size '{size}'")]
    InvalidRegionSize { region: String, size: String },
    #[error("CPU clock: cycles_per_instr must be non-zero and not exceed cycles_per_ms ({cycles_per_ms}/{cycles_per_instr})")]
    InvalidClock {
        cycles_per_ms: u32,
        cycles_per_instr: u32,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PeripheralKind {
    Uart,
    Gpio,
    Memory,
}

/// Instruction-count calibration used by the spin delay.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CpuClock {
    #[serde(default = "default_cycles_per_ms")]
    pub cycles_per_ms: u32,
    #[serde(default = "default_cycles_per_instr")]
    pub cycles_per_instr: u32,
}

fn default_cycles_per_ms() -> u32 {
    1000
}

fn default_cycles_per_instr() -> u32 {
    10
}

fn default_word_size() -> u64 {
    4
}

impl Default for CpuClock {
    fn default() -> Self {
        Self {
            cycles_per_ms: default_cycles_per_ms(),
            cycles_per_instr: default_cycles_per_instr(),
        }
    }
}

impl CpuClock {
    /// Spin-loop iterations per millisecond.
    pub fn instr_per_ms(&self) -> u32 {
        self.cycles_per_ms / self.cycles_per_instr
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BitField {
    pub name: String,
    pub offset: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegisterConfig {
    pub name: String,
    /// Offset from the peripheral base address.
    pub addr: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub bits: Vec<BitField>,
}

impl RegisterConfig {
    pub fn bit(&self, name: &str) -> Option<&BitField> {
        self.bits.iter().find(|b| b.name == name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegionConfig {
    pub name: String,
    /// Absolute address of the first byte.
    pub start_addr: u64,
    pub size: String, // e.g. "4 KiB"
    #[serde(default)]
    pub description: String,
}

impl RegionConfig {
    pub fn num_bytes(&self) -> Result<u64, ConfigError> {
        parse_size(&self.size).map_err(|_| ConfigError::InvalidRegionSize {
            region: self.name.clone(),
            size: self.size.clone(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PeripheralConfig {
    pub basename: String,
    pub kind: PeripheralKind,
    /// First valid address, inclusive.
    pub first_valid_addr: u64,
    /// Last valid address, exclusive.
    pub last_valid_addr: u64,
    #[serde(default = "default_word_size")]
    pub word_size: u64,
    #[serde(default)]
    pub registers: Vec<RegisterConfig>,
    #[serde(default)]
    pub regions: Vec<RegionConfig>,
    #[serde(default)]
    pub config: HashMap<String, serde_yaml::Value>,
}

impl PeripheralConfig {
    pub fn base(&self) -> u64 {
        self.first_valid_addr
    }

    pub fn span(&self) -> u64 {
        self.last_valid_addr.saturating_sub(self.first_valid_addr)
    }

    pub fn register(&self, name: &str) -> Option<&RegisterConfig> {
        self.registers.iter().find(|r| r.name == name)
    }

    pub fn config_u64(&self, key: &str) -> Option<u64> {
        self.config.get(key).and_then(|v| v.as_u64())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_ident(&self.basename)?;
        let name = self.basename.clone();

        if self.word_size == 0 {
            return Err(ConfigError::ZeroWordSize { name });
        }
        if self.first_valid_addr >= self.last_valid_addr {
            return Err(ConfigError::EmptyAddressSpace {
                name,
                first: self.first_valid_addr,
                last: self.last_valid_addr,
            });
        }
        if self.span() % self.word_size != 0 {
            return Err(ConfigError::MisalignedAddressSpace {
                name,
                span: self.span(),
                word_size: self.word_size,
            });
        }
        if self.last_valid_addr > ADDRESS_SPACE_END {
            return Err(ConfigError::AddressOutOfRange {
                name,
                last: self.last_valid_addr,
            });
        }

        let mut seen = HashSet::new();
        for reg in &self.registers {
            check_ident(&reg.name)?;
            if !seen.insert(reg.name.as_str()) {
                return Err(ConfigError::DuplicateRegister {
                    peripheral: name,
                    register: reg.name.clone(),
                });
            }
            let fits = reg
                .addr
                .checked_add(self.word_size)
                .is_some_and(|end| end <= self.span());
            if !fits {
                return Err(ConfigError::RegisterOutOfRange {
                    peripheral: name,
                    register: reg.name.clone(),
                    offset: reg.addr,
                });
            }
            validate_bits(reg)?;
        }

        if self.kind == PeripheralKind::Gpio {
            let count: usize = self.registers.iter().map(|r| r.bits.len()).sum();
            if count == 0 || count > GPIO_STATE_BITS as usize {
                return Err(ConfigError::GpioSignalCount { name, count });
            }
        }

        for region in &self.regions {
            check_ident(&region.name)?;
            let num_bytes = region.num_bytes()?;
            let in_range = region.start_addr >= self.first_valid_addr
                && region
                    .start_addr
                    .checked_add(num_bytes)
                    .is_some_and(|end| end <= self.last_valid_addr);
            if !in_range {
                return Err(ConfigError::RegionOutOfRange {
                    peripheral: name,
                    region: region.name.clone(),
                });
            }
        }

        Ok(())
    }
}

fn validate_bits(reg: &RegisterConfig) -> Result<(), ConfigError> {
    let mut names = HashSet::new();
    let mut offsets = HashSet::new();
    for bit in &reg.bits {
        check_ident(&bit.name)?;
        if bit.offset >= GPIO_STATE_BITS {
            return Err(ConfigError::BitOutOfRange {
                register: reg.name.clone(),
                bit: bit.name.clone(),
                offset: bit.offset,
            });
        }
        if !names.insert(bit.name.as_str()) || !offsets.insert(bit.offset) {
            return Err(ConfigError::DuplicateBit {
                register: reg.name.clone(),
                bit: bit.name.clone(),
            });
        }
    }
    Ok(())
}

/// Names end up as Rust identifiers in the generated address table.
fn check_ident(name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    // These cannot be raw identifiers.
    let reserved = matches!(name, "_" | "self" | "super" | "crate");
    if valid_start && valid_rest && !reserved {
        Ok(())
    } else {
        Err(ConfigError::InvalidName(name.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HardwareDescription {
    pub name: String,
    #[serde(default)]
    pub cpu: CpuClock,
    pub peripherals: Vec<PeripheralConfig>,
}

impl HardwareDescription {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to open hardware description at {:?}",
                path.as_ref()
            )
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let desc: Self =
            serde_yaml::from_str(text).context("Failed to parse Hardware Description YAML")?;
        desc.validate()?;
        tracing::debug!(
            "Hardware description '{}' with {} peripherals",
            desc.name,
            desc.peripherals.len()
        );
        Ok(desc)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let clock = self.cpu;
        if clock.cycles_per_instr == 0 || clock.cycles_per_ms < clock.cycles_per_instr {
            return Err(ConfigError::InvalidClock {
                cycles_per_ms: clock.cycles_per_ms,
                cycles_per_instr: clock.cycles_per_instr,
            });
        }

        let mut names = HashSet::new();
        for periph in &self.peripherals {
            if !names.insert(periph.basename.as_str()) {
                return Err(ConfigError::DuplicatePeripheral(periph.basename.clone()));
            }
            periph.validate()?;
        }

        let mut spaces: Vec<&PeripheralConfig> = self.peripherals.iter().collect();
        spaces.sort_by_key(|p| p.first_valid_addr);
        for pair in spaces.windows(2) {
            if pair[0].last_valid_addr > pair[1].first_valid_addr {
                return Err(ConfigError::OverlappingPeripherals {
                    first: pair[0].basename.clone(),
                    second: pair[1].basename.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn peripheral(&self, basename: &str) -> Option<&PeripheralConfig> {
        self.peripherals.iter().find(|p| p.basename == basename)
    }

    pub fn first_of_kind(&self, kind: PeripheralKind) -> Option<&PeripheralConfig> {
        self.peripherals.iter().find(|p| p.kind == kind)
    }
}

pub fn parse_size(size_str: &str) -> Result<u64> {
    use human_size::{Byte, Size, SpecificSize};
    let s: Size = size_str
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid size format: {}", e))?;
    let bytes: SpecificSize<Byte> = s.into();
    Ok(bytes.value() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name: "test-soc"
peripherals:
  - basename: "uart"
    kind: "uart"
    first_valid_addr: 0x1000
    last_valid_addr: 0x1010
    registers:
      - name: "tx_busy"
        addr: 0x0
      - name: "tx_data"
        addr: 0x8
  - basename: "gpio"
    kind: "gpio"
    first_valid_addr: 0x2000
    last_valid_addr: 0x2004
    registers:
      - name: "gpio_state"
        addr: 0x0
        bits:
          - name: "led_g_0"
            offset: 0
          - name: "led_r_0"
            offset: 1
"#;

    fn parse(yaml: &str) -> HardwareDescription {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn gpio_mut(desc: &mut HardwareDescription) -> &mut PeripheralConfig {
        desc.peripherals
            .iter_mut()
            .find(|p| p.basename == "gpio")
            .unwrap()
    }

    #[test]
    fn test_valid_description() {
        let desc = HardwareDescription::from_yaml(VALID).unwrap();
        assert_eq!(desc.name, "test-soc");
        assert_eq!(desc.cpu, CpuClock::default());
        assert_eq!(desc.cpu.instr_per_ms(), 100);

        let uart = desc.peripheral("uart").unwrap();
        assert_eq!(uart.base(), 0x1000);
        assert_eq!(uart.word_size, 4);
        assert_eq!(uart.register("tx_data").unwrap().addr, 0x8);

        let gpio = desc.first_of_kind(PeripheralKind::Gpio).unwrap();
        let state = gpio.register("gpio_state").unwrap();
        assert_eq!(state.bit("led_r_0").unwrap().offset, 1);
        assert!(state.bit("led_b_0").is_none());
    }

    #[test]
    fn test_duplicate_peripheral() {
        let mut desc = parse(VALID);
        let mut copy = desc.peripherals[0].clone();
        copy.first_valid_addr = 0x3000;
        copy.last_valid_addr = 0x3010;
        desc.peripherals.push(copy);
        assert_eq!(
            desc.validate(),
            Err(ConfigError::DuplicatePeripheral("uart".into()))
        );
    }

    #[test]
    fn test_empty_and_misaligned_spaces() {
        let mut desc = parse(VALID);
        desc.peripherals[0].last_valid_addr = 0x1000;
        assert!(matches!(
            desc.validate(),
            Err(ConfigError::EmptyAddressSpace { .. })
        ));

        let mut desc = parse(VALID);
        desc.peripherals[0].last_valid_addr = 0x1012;
        assert!(matches!(
            desc.validate(),
            Err(ConfigError::MisalignedAddressSpace { .. })
        ));
    }

    #[test]
    fn test_overlapping_peripherals() {
        let mut desc = parse(VALID);
        gpio_mut(&mut desc).first_valid_addr = 0x100c;
        gpio_mut(&mut desc).last_valid_addr = 0x1014;
        let err = desc.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::OverlappingPeripherals {
                first: "uart".into(),
                second: "gpio".into()
            }
        );
    }

    #[test]
    fn test_register_out_of_range() {
        let mut desc = parse(VALID);
        desc.peripherals[0].registers[1].addr = 0x10;
        assert!(matches!(
            desc.validate(),
            Err(ConfigError::RegisterOutOfRange { offset: 0x10, .. })
        ));
    }

    #[test]
    fn test_bit_offset_limit() {
        let mut desc = parse(VALID);
        gpio_mut(&mut desc).registers[0].bits[1].offset = 32;
        assert!(matches!(
            desc.validate(),
            Err(ConfigError::BitOutOfRange { offset: 32, .. })
        ));

        let mut desc = parse(VALID);
        gpio_mut(&mut desc).registers[0].bits[1].offset = 0;
        assert!(matches!(
            desc.validate(),
            Err(ConfigError::DuplicateBit { .. })
        ));
    }

    #[test]
    fn test_gpio_needs_signals() {
        let mut desc = parse(VALID);
        gpio_mut(&mut desc).registers[0].bits.clear();
        assert_eq!(
            desc.validate(),
            Err(ConfigError::GpioSignalCount {
                name: "gpio".into(),
                count: 0
            })
        );
    }

    #[test]
    fn test_invalid_names() {
        for bad in ["Uart", "1uart", "tx-busy", "self", ""] {
            let mut desc = parse(VALID);
            desc.peripherals[0].basename = bad.to_string();
            assert_eq!(
                desc.validate(),
                Err(ConfigError::InvalidName(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_clock() {
        let mut desc = parse(VALID);
        desc.cpu.cycles_per_instr = 0;
        assert!(matches!(
            desc.validate(),
            Err(ConfigError::InvalidClock { .. })
        ));
    }

    #[test]
    fn test_region_bounds() {
        let yaml = r#"
name: "mem"
peripherals:
  - basename: "ebr"
    kind: "memory"
    first_valid_addr: 0x8000
    last_valid_addr: 0x9000
    regions:
      - name: "ebr"
        start_addr: 0x8000
        size: "8 KiB"
"#;
        let err = HardwareDescription::from_yaml(yaml).unwrap_err();
        let err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(err, ConfigError::RegionOutOfRange { .. }));

        let fitting = yaml.replace("8 KiB", "4 KiB");
        let desc = HardwareDescription::from_yaml(&fitting).unwrap();
        let region = &desc.peripherals[0].regions[0];
        assert_eq!(region.num_bytes().unwrap(), 4096);
    }

    #[test]
    fn test_extra_config_values() {
        let mut desc = parse(VALID);
        desc.peripherals[0]
            .config
            .insert("busy_ticks".into(), serde_yaml::Value::from(7u64));
        assert_eq!(desc.peripherals[0].config_u64("busy_ticks"), Some(7));
        assert_eq!(desc.peripherals[0].config_u64("missing"), None);
    }
}
