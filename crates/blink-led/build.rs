// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::env;
use std::fs;
use std::path::PathBuf;

// Makes memory.x visible to riscv-rt's link.x.
fn main() {
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR not set"));
    fs::copy("memory.x", out_dir.join("memory.x")).expect("memory.x missing");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rustc-link-search={}", out_dir.display());
    for script in ["memory.x", "link.x"] {
        println!("cargo:rustc-link-arg=-T{script}");
    }
}
