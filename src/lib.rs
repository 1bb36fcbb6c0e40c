//! Flash programming algorithm for the HT502x on-chip flash.
//!
//! [`FlashController`] drives the flash control block through
//! unlock, operate, busy-wait and lock for mass erase, sector erase and byte
//! program, clearing the watchdog while the hardware is busy. All register
//! traffic goes through a [`RegisterPort`], so the same sequencer runs against
//! [`Mmio`] on the part and against a simulated bus in tests.
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod controller;
pub mod error;
pub mod port;
pub mod registers;
pub mod traits;

#[cfg(test)]
mod sim;

pub use config::{FlashConfig, Function, Geometry};
pub use controller::FlashController;
pub use error::{Error, Status};
pub use port::{Mmio, RegisterPort};
pub use traits::HardwareFlashDevice;
