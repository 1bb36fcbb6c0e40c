/// Register map of the HT502x flash controller and watchdog.
///
/// Addresses are absolute; `RegisterMap::HT502X` is the only silicon this
/// crate currently targets, the table exists so tests and derivatives can
/// relocate the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterMap {
    /// Base of the flash control block.
    pub control_base: u32,
    /// Offset of the write-protect ("unlock arm") register, WPREG.
    pub unlock_offset: u32,
    /// Offset of the operation/busy register, FLASHCON.
    pub control_offset: u32,
    /// Offset of the lock-key register, FLASHLOCK.
    pub lock_offset: u32,
    /// Absolute address of the 16-bit watchdog clear register, WDTCLR.
    pub watchdog_clear: u32,
}

impl RegisterMap {
    pub const HT502X: Self = Self {
        control_base: 0x4000_F000,
        unlock_offset: 0x00,
        control_offset: 0x34,
        lock_offset: 0x38,
        watchdog_clear: 0x4001_0004,
    };

    pub const fn unlock(&self) -> u32 {
        self.control_base + self.unlock_offset
    }

    pub const fn control(&self) -> u32 {
        self.control_base + self.control_offset
    }

    pub const fn lock(&self) -> u32 {
        self.control_base + self.lock_offset
    }
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self::HT502X
    }
}

/// Arms the protected region when written to WPREG.
pub const UNLOCK_ARM: u32 = 0xA55A;
/// Opens FLASHCON for erase/program commands when written to FLASHLOCK.
pub const LOCK_KEY_UNLOCK: u32 = 0x7A68;
/// Written to both FLASHLOCK and WPREG to close the controller again.
pub const LOCK_KEY_RELOCK: u32 = 0x0000;
/// Restarts the watchdog countdown.
pub const WATCHDOG_CLEAR: u16 = 0xAAFF;

/// Operation codes accepted by FLASHCON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum Operation {
    /// Byte program.
    Program = 0x01,
    /// Erase the page containing the trigger address.
    SectorErase = 0x02,
    /// Erase the whole array.
    MassErase = 0x03,
}

impl Operation {
    pub fn code(self) -> u32 {
        self as u32
    }
}

bitflags::bitflags! {
    /// FLASHCON bits as read back from the hardware.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Control: u32 {
        /// The latched [`Operation`] code.
        const OPERATION = 0b11;
        /// Set by the controller while an erase or program runs.
        const BUSY = 1 << 2;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Control {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Control({=u32:#x})", self.bits())
    }
}
