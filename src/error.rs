use core::fmt;

/// The error type used by this library.
///
/// The controller exposes no fault flags, so the only failure the sequencer
/// can observe is one it imposes itself: a busy bit outliving the configured
/// poll limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The busy bit was still set after `polls` iterations.
    BusyTimeout { polls: u32 },
}

impl Error {
    pub fn status(&self) -> Status {
        Status::Failed
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BusyTimeout { polls } => {
                write!(f, "flash controller still busy after {} polls", polls)
            }
        }
    }
}

/// Return code understood by the programming host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum Status {
    Ok = 0,
    Failed = 1,
}

impl Status {
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl<T> From<&Result<T, Error>> for Status {
    fn from(result: &Result<T, Error>) -> Self {
        match result {
            Ok(_) => Status::Ok,
            Err(e) => e.status(),
        }
    }
}
