// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

/// Register-level access to the memory-mapped I/O space.
///
/// Every call is one bus access. Implementations must not elide, merge or
/// reorder accesses relative to each other.
pub trait Mmio {
    fn read_u32(&mut self, addr: u32) -> u32;
    fn write_u32(&mut self, addr: u32, value: u32);
    fn write_u8(&mut self, addr: u32, value: u8);

    /// Stops the calling thread for good.
    #[allow(clippy::empty_loop)]
    fn halt(&mut self) -> ! {
        loop {}
    }
}

/// Raw volatile accesses on the running target.
#[derive(Debug)]
pub struct Volatile {
    _private: (),
}

impl Volatile {
    /// # Safety
    ///
    /// At most one instance may exist, and the addresses in the generated
    /// address table must be valid device registers on the running target.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl Mmio for Volatile {
    fn read_u32(&mut self, addr: u32) -> u32 {
        // SAFETY: `new` requires `addr` to be a device register.
        unsafe { core::ptr::read_volatile(addr as usize as *const u32) }
    }

    fn write_u32(&mut self, addr: u32, value: u32) {
        // SAFETY: as above.
        unsafe { core::ptr::write_volatile(addr as usize as *mut u32, value) }
    }

    fn write_u8(&mut self, addr: u32, value: u8) {
        // SAFETY: as above.
        unsafe { core::ptr::write_volatile(addr as usize as *mut u8, value) }
    }
}
