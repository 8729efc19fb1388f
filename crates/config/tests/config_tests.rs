// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use mtk_config::{ConfigError, HardwareDescription, PeripheralKind};

#[test]
fn test_shipped_description_is_valid() {
    let desc = HardwareDescription::from_file("../../hw/mtkcpu.yaml").unwrap();
    assert_eq!(desc.name, "mtkcpu-icebreaker");

    let uart = desc.first_of_kind(PeripheralKind::Uart).unwrap();
    assert_eq!(uart.register("tx_busy").unwrap().addr, 0x0);
    assert_eq!(uart.register("tx_data").unwrap().addr, 0x8);
    assert_eq!(uart.config_u64("busy_ticks"), Some(4));

    let gpio = desc.first_of_kind(PeripheralKind::Gpio).unwrap();
    let state = gpio.register("gpio_state").unwrap();
    assert!(state.bit("led_g_0").is_some());
    assert!(state.bit("led_r_0").is_some());

    let ebr = desc.peripheral("ebr").unwrap();
    assert_eq!(ebr.kind, PeripheralKind::Memory);
    assert_eq!(ebr.regions[0].num_bytes().unwrap(), 0x1000);
}

#[test]
fn test_missing_file() {
    let err = HardwareDescription::from_file("does/not/exist.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to open hardware description"));
}

#[test]
fn test_unknown_kind_rejected() {
    let yaml = r#"
name: "soc"
peripherals:
  - basename: "spi"
    kind: "spi"
    first_valid_addr: 0x1000
    last_valid_addr: 0x1010
"#;
    let err = HardwareDescription::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("Failed to parse"));
}

#[test]
fn test_too_many_gpio_signals() {
    let mut yaml = String::from(
        r#"
name: "soc"
peripherals:
  - basename: "gpio"
    kind: "gpio"
    first_valid_addr: 0x2000
    last_valid_addr: 0x2008
    registers:
      - name: "gpio_state"
        addr: 0x0
        bits:
"#,
    );
    for i in 0..32 {
        yaml.push_str(&format!(
            "          - name: \"pin_{i}\"\n            offset: {i}\n"
        ));
    }
    yaml.push_str(
        r#"      - name: "gpio_extra"
        addr: 0x4
        bits:
          - name: "pin_extra"
            offset: 0
"#,
    );

    let err = HardwareDescription::from_yaml(&yaml).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::GpioSignalCount {
            name: "gpio".into(),
            count: 33
        })
    );
}

#[test]
fn test_register_offset_overflow_rejected() {
    let yaml = r#"
name: "soc"
peripherals:
  - basename: "uart"
    kind: "uart"
    first_valid_addr: 0x1000
    last_valid_addr: 0x1010
    registers:
      - name: "tx_data"
        addr: 0xffffffffffffffff
"#;
    let err = HardwareDescription::from_yaml(yaml).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::RegisterOutOfRange {
            peripheral: "uart".into(),
            register: "tx_data".into(),
            offset: u64::MAX,
        })
    );
}

#[test]
fn test_region_end_overflow_rejected() {
    let yaml = r#"
name: "soc"
peripherals:
  - basename: "ebr"
    kind: "memory"
    first_valid_addr: 0x8000
    last_valid_addr: 0x9000
    regions:
      - name: "ebr"
        start_addr: 0xffffffffffffffff
        size: "4 KiB"
"#;
    let err = HardwareDescription::from_yaml(yaml).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::RegionOutOfRange {
            peripheral: "ebr".into(),
            region: "ebr".into(),
        })
    );
}
