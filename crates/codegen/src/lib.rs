// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Generates the board-support peripheral address table from a hardware
//! description.
//!
//! The output is a plain Rust module meant to be `include!`d: one submodule
//! per peripheral holding its base address, register offsets, named bit
//! offsets and region bounds, plus a name → base address table.

use anyhow::{bail, Context, Result};
use mtk_config::{HardwareDescription, PeripheralConfig, RegisterConfig};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;

/// Module names taken by the generator itself.
const RESERVED_MODULES: &[&str] = &["cpu"];

pub struct AddressTableGenerator;

impl AddressTableGenerator {
    pub fn generate_from_file<P: AsRef<Path>>(path: P) -> Result<String> {
        let text = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to open hardware description at {:?}",
                path.as_ref()
            )
        })?;
        Self::generate_from_yaml(&text)
    }

    pub fn generate_from_yaml(text: &str) -> Result<String> {
        let desc = HardwareDescription::from_yaml(text)?;
        Self::generate(&desc, &digest(text))
    }

    /// `source_digest` identifies the description the table was built from.
    pub fn generate(desc: &HardwareDescription, source_digest: &str) -> Result<String> {
        let name = desc.name.as_str();
        let cycles_per_ms = desc.cpu.cycles_per_ms;
        let cycles_per_instr = desc.cpu.cycles_per_instr;

        let mut items = vec![
            quote! {
                pub const HARDWARE_NAME: &str = #name;
            },
            quote! {
                pub const DESCRIPTION_SHA256: &str = #source_digest;
            },
            quote! {
                pub mod cpu {
                    pub const CYCLES_PER_MS: u32 = #cycles_per_ms;
                    pub const CYCLES_PER_INSTR: u32 = #cycles_per_instr;
                }
            },
        ];

        let mut names = Vec::new();
        let mut bases = Vec::new();
        for periph in &desc.peripherals {
            if RESERVED_MODULES.contains(&periph.basename.as_str()) {
                bail!(
                    "Peripheral name '{}' collides with a generated module",
                    periph.basename
                );
            }
            tracing::debug!(
                "Generating {} at {:#x} ({} registers, {} regions)",
                periph.basename,
                periph.base(),
                periph.registers.len(),
                periph.regions.len()
            );
            items.push(Self::generate_peripheral(periph)?);
            names.push(periph.basename.as_str());
            bases.push(hex(periph.base())?);
        }

        items.push(quote! {
            pub const PERIPHERALS: &[(&str, u32)] = &[#((#names, #bases)),*];
        });

        let mut out = format!(
            "// Code automatically generated by mtk-codegen, do not modify!\n\
             // hardware: {}\n\
             // sha256: {}\n\n",
            desc.name, source_digest
        );
        for item in items {
            out.push_str(&item.to_string());
            out.push_str("\n\n");
        }
        tracing::info!(
            "Generated address table for '{}' ({} peripherals)",
            desc.name,
            desc.peripherals.len()
        );
        Ok(out)
    }

    fn generate_peripheral(periph: &PeripheralConfig) -> Result<TokenStream> {
        let mod_name = format_ident!("{}", sanitize_name(&periph.basename));
        let summary = format!(
            "{} ({:?}), {:#x}..{:#x}.",
            periph.basename, periph.kind, periph.first_valid_addr, periph.last_valid_addr
        );
        let base = hex(periph.base())?;
        let size = hex(periph.span())?;

        let mut consts = ConstNames::new(&periph.basename);
        consts.claim("BASE")?;
        consts.claim("SIZE")?;

        let mut body = Vec::new();
        for reg in &periph.registers {
            body.push(Self::generate_register(reg, &mut consts)?);
        }

        for region in &periph.regions {
            let upper = region.name.to_uppercase();
            let addr_name = format_ident!("{}_ADDR", upper);
            let size_name = format_ident!("{}_NUM_BYTES", upper);
            consts.claim(&addr_name.to_string())?;
            consts.claim(&size_name.to_string())?;
            let addr = hex(region.start_addr)?;
            let num_bytes = hex(region.num_bytes()?)?;
            let doc = doc_attr(&region.description);
            body.push(quote! {
                #doc
                pub const #addr_name: u32 = #addr;
                pub const #size_name: u32 = #num_bytes;
            });
        }

        Ok(quote! {
            #[doc = #summary]
            pub mod #mod_name {
                pub const BASE: u32 = #base;
                pub const SIZE: u32 = #size;

                #(#body)*
            }
        })
    }

    fn generate_register(reg: &RegisterConfig, consts: &mut ConstNames) -> Result<TokenStream> {
        let offset_name = format_ident!("{}_OFFSET", reg.name.to_uppercase());
        consts.claim(&offset_name.to_string())?;
        let offset = hex(reg.addr)?;
        let doc = doc_attr(&reg.description);

        if reg.bits.is_empty() {
            return Ok(quote! {
                #doc
                pub const #offset_name: u32 = #offset;
            });
        }

        let bits_mod = format_ident!("{}", sanitize_name(&reg.name));
        let bit_names = reg
            .bits
            .iter()
            .map(|b| format_ident!("{}", b.name.to_uppercase()));
        let bit_offsets = reg.bits.iter().map(|b| b.offset);
        let bits_doc = format!("Bit offsets within `{}`.", reg.name);

        Ok(quote! {
            #doc
            pub const #offset_name: u32 = #offset;

            #[doc = #bits_doc]
            pub mod #bits_mod {
                #(pub const #bit_names: u32 = #bit_offsets;)*
            }
        })
    }
}

/// Hex-encoded SHA-256 of the description text.
pub fn digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Tracks the constants emitted into one peripheral module.
struct ConstNames<'a> {
    module: &'a str,
    seen: HashSet<String>,
}

impl<'a> ConstNames<'a> {
    fn new(module: &'a str) -> Self {
        Self {
            module,
            seen: HashSet::new(),
        }
    }

    fn claim(&mut self, name: &str) -> Result<()> {
        if !self.seen.insert(name.to_string()) {
            bail!(
                "Peripheral '{}': generated constant {} is defined twice",
                self.module,
                name
            );
        }
        Ok(())
    }
}

fn hex(value: u64) -> Result<TokenStream> {
    let value = u32::try_from(value)
        .with_context(|| format!("Address {:#x} does not fit the 32-bit bus", value))?;
    format!("{:#x}", value)
        .parse()
        .map_err(|e| anyhow::anyhow!("Failed to build literal for {:#x}: {}", value, e))
}

fn doc_attr(description: &str) -> TokenStream {
    if description.is_empty() {
        quote! {}
    } else {
        quote! { #[doc = #description] }
    }
}

fn sanitize_name(name: &str) -> String {
    let keywords = [
        "as", "break", "const", "continue", "else", "enum", "extern", "false", "fn", "for", "if",
        "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
        "static", "struct", "trait", "true", "type", "unsafe", "use", "where", "while", "async",
        "await", "dyn", "abstract", "become", "box", "do", "final", "macro", "override", "priv",
        "typeof", "unsized", "virtual", "yield", "try", "gen",
    ];
    if keywords.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}
