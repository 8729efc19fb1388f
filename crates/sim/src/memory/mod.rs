// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{SimResult, SimulationError};

/// A simple flat memory storage, addressed relative to its base.
#[derive(Debug)]
pub struct LinearMemory {
    pub data: Vec<u8>,
    pub base_addr: u64,
}

impl LinearMemory {
    pub fn new(size: usize, base_addr: u64) -> Self {
        Self {
            data: vec![0; size],
            base_addr,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl crate::Peripheral for LinearMemory {
    fn read(&self, offset: u64) -> SimResult<u8> {
        usize::try_from(offset)
            .ok()
            .and_then(|i| self.data.get(i).copied())
            .ok_or(SimulationError::MemoryViolation(self.base_addr + offset))
    }

    fn write(&mut self, offset: u64, value: u8) -> SimResult<()> {
        let base_addr = self.base_addr;
        let cell = usize::try_from(offset)
            .ok()
            .and_then(|i| self.data.get_mut(i))
            .ok_or(SimulationError::MemoryViolation(base_addr + offset))?;
        *cell = value;
        Ok(())
    }

    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }
}
