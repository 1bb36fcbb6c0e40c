//! Register-level sequencer for the HT502x on-chip flash.
//!
//! Every erase or program runs inside one unlock session: arm WPREG, open
//! FLASHLOCK, latch the operation in FLASHCON, issue the trigger write into
//! the array, poll the busy bit while clearing the watchdog, then close
//! FLASHLOCK and WPREG again.
use crate::config::{FlashConfig, Function};
use crate::error::Error;
use crate::port::RegisterPort;
use crate::registers::{
    Control, Operation, RegisterMap, LOCK_KEY_RELOCK, LOCK_KEY_UNLOCK, UNLOCK_ARM,
    WATCHDOG_CLEAR,
};
use crate::traits::HardwareFlashDevice;
use core::fmt::Debug;

pub struct FlashController<P> {
    port: P,
    config: FlashConfig,
}

impl<P> Debug for FlashController<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlashController")
            .field("config", &self.config)
            .finish()
    }
}

impl<P> HardwareFlashDevice for FlashController<P>
where
    P: RegisterPort,
{
    type Error = Error;

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), Error> {
        FlashController::read(self, addr, buf)
    }

    fn sector_erase(&mut self, addr: u32) -> Result<(), Error> {
        self.erase_sector(addr)
    }

    fn page_program(&mut self, addr: u32, data: &[u8]) -> Result<(), Error> {
        self.program_page(addr, data)
    }

    fn chip_erase(&mut self) -> Result<(), Error> {
        self.erase_chip()
    }
}

impl<P> FlashController<P>
where
    P: RegisterPort,
{
    pub fn new(port: P, config: FlashConfig) -> Self {
        Self { port, config }
    }

    /// Gives the port back.
    pub fn release(self) -> P {
        self.port
    }

    pub fn config(&self) -> &FlashConfig {
        &self.config
    }

    /// Prepares the controller for a batch of operations.
    ///
    /// Only arms WPREG; the part needs no clock setup and `address` and
    /// `clock` are accepted for the host's benefit. Never fails.
    #[cfg_attr(not(feature = "defmt"), allow(unused_variables))]
    pub fn init(&mut self, address: u32, clock: u32, function: u32) -> Result<(), Error> {
        match Function::from_code(function) {
            Some(kind) => {
                #[cfg(feature = "defmt")]
                defmt::debug!(
                    "init {=u32:#x} @ {=u32} Hz for {:?}",
                    address,
                    clock,
                    kind
                );
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("init with unknown function code {=u32}", function);
            }
        }
        self.port.write_u32(self.config.registers.unlock(), UNLOCK_ARM);
        Ok(())
    }

    /// Ends a batch. The controller has nothing to tear down.
    #[cfg_attr(not(feature = "defmt"), allow(unused_variables))]
    pub fn deinit(&mut self, function: u32) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::debug!("deinit for function code {=u32}", function);
        Ok(())
    }

    /// Mass erase. Takes up to 10 ms on the part.
    ///
    /// This wipes the whole array, including any code executing from it.
    pub fn erase_chip(&mut self) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::debug!("mass erase");
        let trigger = self.config.geometry.flash_address;
        let mut session = self.unlock();
        session.select(Operation::MassErase);
        // Any word anywhere in the array starts the erase; the value is ignored.
        session.port.write_u32(trigger, 0);
        session.wait_done()
    }

    /// Erases the sector containing `addr`. Takes up to 2 ms on the part.
    pub fn erase_sector(&mut self, addr: u32) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::debug!("sector erase at {=u32:#x}", addr);
        let mut session = self.unlock();
        session.select(Operation::SectorErase);
        session.port.write_u32(addr, 0);
        session.wait_done()
    }

    /// Programs `data` starting at `addr`, one byte at a time.
    ///
    /// The destination must already be erased. Bytes go out highest address
    /// first.
    pub fn program_page(&mut self, addr: u32, data: &[u8]) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::debug!("program {=usize} bytes at {=u32:#x}", data.len(), addr);
        let mut session = self.unlock();
        for (index, byte) in data.iter().enumerate().rev() {
            session.select(Operation::Program);
            session.port.write_u8(addr.wrapping_add(index as u32), *byte);
            session.wait_done()?;
            session.clear_watchdog();
        }
        Ok(())
    }

    /// Reads the memory-mapped array into `buf`, starting at `addr`.
    pub fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), Error> {
        for (offset, byte) in buf.iter_mut().enumerate() {
            *byte = self.port.read_u8(addr.wrapping_add(offset as u32));
        }
        Ok(())
    }

    pub fn is_busy(&mut self) -> bool {
        self.read_control().contains(Control::BUSY)
    }

    /// Reads FLASHCON.
    pub fn read_control(&mut self) -> Control {
        Control::from_bits_retain(self.port.read_u32(self.config.registers.control()))
    }

    /// Opens the controller for one operation. Dropping the session locks it again.
    fn unlock(&mut self) -> Unlocked<'_, P> {
        let registers = self.config.registers;
        self.port.write_u32(registers.unlock(), UNLOCK_ARM);
        self.port.write_u32(registers.lock(), LOCK_KEY_UNLOCK);
        #[cfg(feature = "defmt")]
        defmt::trace!("flash unlocked");
        Unlocked {
            port: &mut self.port,
            registers,
            poll_limit: self.config.poll_limit,
        }
    }
}

/// An open FLASHLOCK/WPREG window.
struct Unlocked<'a, P: RegisterPort> {
    port: &'a mut P,
    registers: RegisterMap,
    poll_limit: Option<u32>,
}

impl<P: RegisterPort> Unlocked<'_, P> {
    fn select(&mut self, operation: Operation) {
        self.port
            .write_u32(self.registers.control(), operation.code());
    }

    fn clear_watchdog(&mut self) {
        self.port
            .write_u16(self.registers.watchdog_clear, WATCHDOG_CLEAR);
    }

    /// Block until the busy bit clears, clearing the watchdog on every poll
    /// that still sees it set.
    fn wait_done(&mut self) -> Result<(), Error> {
        let mut polls: u32 = 0;
        while Control::from_bits_retain(self.port.read_u32(self.registers.control()))
            .contains(Control::BUSY)
        {
            self.clear_watchdog();
            polls = polls.saturating_add(1);
            if self.poll_limit.is_some_and(|limit| polls >= limit) {
                #[cfg(feature = "defmt")]
                defmt::warn!("flash still busy after {=u32} polls", polls);
                return Err(Error::BusyTimeout { polls });
            }
        }
        Ok(())
    }
}

impl<P: RegisterPort> Drop for Unlocked<'_, P> {
    fn drop(&mut self) {
        self.port.write_u32(self.registers.lock(), LOCK_KEY_RELOCK);
        self.port.write_u32(self.registers.unlock(), LOCK_KEY_RELOCK);
        #[cfg(feature = "defmt")]
        defmt::trace!("flash locked");
    }
}
