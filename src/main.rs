//! Entry points called by the debug probe host.
//!
//! The host loads this image into RAM, calls `Init`, any number of
//! `EraseChip`/`EraseSector`/`ProgramPage`, then `UnInit`, one call at a time.
#![cfg_attr(target_os = "none", no_std, no_main)]

#[cfg(target_os = "none")]
mod entry {
    use flash_algorithm::{ErrorCode, FlashAlgorithm, Function};
    use ht502x_flash_rs::{Error, FlashConfig, FlashController, Geometry, Mmio};

    const GEOMETRY: Geometry = Geometry::HT502X;

    struct Algorithm {
        flash: FlashController<Mmio>,
        function: u32,
    }

    flash_algorithm::algorithm!(Algorithm, {
        device_name: "HT502x 256kB Flash",
        device_type: DeviceType::Onchip,
        flash_address: GEOMETRY.flash_address,
        flash_size: GEOMETRY.flash_size,
        page_size: GEOMETRY.page_size,
        empty_value: GEOMETRY.erased_value,
        program_time_out: GEOMETRY.program_timeout_ms,
        erase_time_out: GEOMETRY.erase_timeout_ms,
        sectors: [{
            size: GEOMETRY.sector_size,
            address: GEOMETRY.flash_address,
        }]
    });

    fn function_code(function: Function) -> u32 {
        match function {
            Function::Erase => 1,
            Function::Program => 2,
            Function::Verify => 3,
        }
    }

    fn failed(e: Error) -> ErrorCode {
        #[cfg(feature = "defmt")]
        defmt::error!("flash operation failed: {:?}", e);
        ErrorCode::new(e.status().code()).unwrap_or(ErrorCode::MIN)
    }

    impl FlashAlgorithm for Algorithm {
        fn new(address: u32, clock: u32, function: Function) -> Result<Self, ErrorCode> {
            // SAFETY: the host creates exactly one instance, on the part itself
            let port = unsafe { Mmio::new() };
            let mut flash = FlashController::new(port, FlashConfig::HT502X);
            let function = function_code(function);
            flash.init(address, clock, function).map_err(failed)?;
            Ok(Self { flash, function })
        }

        fn erase_all(&mut self) -> Result<(), ErrorCode> {
            self.flash.erase_chip().map_err(failed)
        }

        fn erase_sector(&mut self, address: u32) -> Result<(), ErrorCode> {
            self.flash.erase_sector(address).map_err(failed)
        }

        fn program_page(&mut self, address: u32, data: &[u8]) -> Result<(), ErrorCode> {
            self.flash.program_page(address, data).map_err(failed)
        }
    }

    impl Drop for Algorithm {
        fn drop(&mut self) {
            if let Err(e) = self.flash.deinit(self.function) {
                failed(e);
            }
        }
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
