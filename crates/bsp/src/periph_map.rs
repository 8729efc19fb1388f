// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Peripheral address table, generated at build time from the hardware
//! description (`hw/mtkcpu.yaml` unless `MTK_HW_DESCRIPTION` says otherwise).

include!(concat!(env!("OUT_DIR"), "/periph_map.rs"));

/// Base address of the peripheral called `name`.
pub fn base_address(name: &str) -> Option<u32> {
    PERIPHERALS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, base)| base)
}
