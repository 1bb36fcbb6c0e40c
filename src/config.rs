//! Static configuration of the sequencer and the flash part.

use crate::registers::RegisterMap;

/// Purpose of the batch the host is about to run, passed to `init`/`deinit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum Function {
    Erase = 1,
    Program = 2,
    Verify = 3,
}

impl Function {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Function::Erase),
            2 => Some(Function::Program),
            3 => Some(Function::Verify),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Layout of the on-chip array as advertised to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    /// Start of the array in the CPU address space.
    pub flash_address: u32,
    pub flash_size: u32,
    /// Smallest erasable unit.
    pub sector_size: u32,
    /// Largest chunk the host hands to a single `program_page` call.
    pub page_size: u32,
    /// Value every byte reads back as after an erase.
    pub erased_value: u8,
    /// Host-side timeout for one `program_page` call, in milliseconds.
    pub program_timeout_ms: u32,
    /// Host-side timeout for one erase call, in milliseconds.
    pub erase_timeout_ms: u32,
}

impl Geometry {
    pub const HT502X: Self = Self {
        flash_address: 0x0000_0000,
        flash_size: 256 * 1024,
        sector_size: 1024,
        page_size: 256,
        erased_value: 0xFF,
        program_timeout_ms: 1000,
        erase_timeout_ms: 3000,
    };

    /// Start address of the sector containing `addr`, or `None` outside the array.
    pub fn sector_base(&self, addr: u32) -> Option<u32> {
        let offset = self.offset_of(addr)?;
        Some(self.flash_address + (offset - offset % self.sector_size))
    }

    pub fn contains(&self, addr: u32) -> bool {
        self.offset_of(addr).is_some()
    }

    fn offset_of(&self, addr: u32) -> Option<u32> {
        addr.checked_sub(self.flash_address)
            .filter(|offset| *offset < self.flash_size)
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::HT502X
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashConfig {
    pub registers: RegisterMap,
    pub geometry: Geometry,
    /// Maximum number of busy polls per hardware operation.
    ///
    /// `None` waits for the controller indefinitely. With `Some(n)` an
    /// operation still busy after `n` watchdog-serviced polls fails with
    /// [`Error::BusyTimeout`](crate::error::Error::BusyTimeout).
    pub poll_limit: Option<u32>,
}

impl FlashConfig {
    pub const HT502X: Self = Self {
        registers: RegisterMap::HT502X,
        geometry: Geometry::HT502X,
        poll_limit: None,
    };

    pub fn with_poll_limit(mut self, limit: u32) -> Self {
        self.poll_limit = Some(limit);
        self
    }
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self::HT502X
    }
}
