// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

#![no_std]
#![no_main]

use mtk_bsp::{blink, Board, Volatile};
use panic_halt as _;
use riscv_rt::entry;

#[entry]
fn main() -> ! {
    // SAFETY: the only register handle in the program, and the address
    // table was generated for this SoC.
    let mmio = unsafe { Volatile::new() };
    let mut board = Board::new(mmio);
    blink::run(&mut board)
}
