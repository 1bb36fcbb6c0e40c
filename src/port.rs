use core::ptr;

/// The interface between the sequencer and the (real or simulated) bus.
///
/// Addresses are absolute. Implementations must perform each access exactly
/// once and in program order: several of these writes are triggers, not data.
pub trait RegisterPort {
    fn read_u32(&mut self, addr: u32) -> u32;

    fn read_u8(&mut self, addr: u32) -> u8;

    /// Word write. Inside the flash array in erase mode this is the erase trigger.
    fn write_u32(&mut self, addr: u32, value: u32);

    /// Half-word write, `addr` must be 2-byte aligned.
    fn write_u16(&mut self, addr: u32, value: u16);

    /// Byte write. Inside the flash array in program mode this programs `value`.
    fn write_u8(&mut self, addr: u32, value: u8);
}

/// Direct volatile access to the memory-mapped bus.
#[derive(Debug)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    ///
    /// Must only be created on the target, where every address handed to the
    /// port is a valid flash or peripheral location, and only one `Mmio` may
    /// be alive at a time.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterPort for Mmio {
    fn read_u32(&mut self, addr: u32) -> u32 {
        // SAFETY: address validity is the contract of `Mmio::new`
        unsafe { ptr::read_volatile(addr as usize as *const u32) }
    }

    fn read_u8(&mut self, addr: u32) -> u8 {
        // SAFETY: see above
        unsafe { ptr::read_volatile(addr as usize as *const u8) }
    }

    fn write_u32(&mut self, addr: u32, value: u32) {
        // SAFETY: see above
        unsafe { ptr::write_volatile(addr as usize as *mut u32, value) }
    }

    fn write_u16(&mut self, addr: u32, value: u16) {
        // SAFETY: see above
        unsafe { ptr::write_volatile(addr as usize as *mut u16, value) }
    }

    fn write_u8(&mut self, addr: u32, value: u8) {
        // SAFETY: see above
        unsafe { ptr::write_volatile(addr as usize as *mut u8, value) }
    }
}

impl<P: RegisterPort + ?Sized> RegisterPort for &mut P {
    fn read_u32(&mut self, addr: u32) -> u32 {
        (**self).read_u32(addr)
    }

    fn read_u8(&mut self, addr: u32) -> u8 {
        (**self).read_u8(addr)
    }

    fn write_u32(&mut self, addr: u32, value: u32) {
        (**self).write_u32(addr, value)
    }

    fn write_u16(&mut self, addr: u32, value: u16) {
        (**self).write_u16(addr, value)
    }

    fn write_u8(&mut self, addr: u32, value: u8) {
        (**self).write_u8(addr, value)
    }
}
