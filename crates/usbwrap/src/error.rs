//! Error types
//!
//! Native failures keep the original libusb return code next to the
//! description so callers can match on either.

use thiserror::Error;

pub const LIBUSB_ERROR_IO: i32 = -1;
pub const LIBUSB_ERROR_INVALID_PARAM: i32 = -2;
pub const LIBUSB_ERROR_ACCESS: i32 = -3;
pub const LIBUSB_ERROR_NO_DEVICE: i32 = -4;
pub const LIBUSB_ERROR_NOT_FOUND: i32 = -5;
pub const LIBUSB_ERROR_BUSY: i32 = -6;
pub const LIBUSB_ERROR_TIMEOUT: i32 = -7;
pub const LIBUSB_ERROR_OVERFLOW: i32 = -8;
pub const LIBUSB_ERROR_PIPE: i32 = -9;
pub const LIBUSB_ERROR_INTERRUPTED: i32 = -10;
pub const LIBUSB_ERROR_NO_MEM: i32 = -11;
pub const LIBUSB_ERROR_NOT_SUPPORTED: i32 = -12;
pub const LIBUSB_ERROR_OTHER: i32 = -99;

/// Errors returned by the wrapper types
#[derive(Debug, Error)]
pub enum Error {
    /// The native library returned a negative status code
    #[error("{source} (libusb code {code})")]
    Usb { code: i32, source: rusb::Error },

    /// The operation needs an open device handle
    #[error("Device is not open")]
    NotOpen,

    /// A fixed-size control read came back short
    #[error("Short transfer: expected {expected} bytes, got {actual}")]
    ShortTransfer { expected: usize, actual: usize },

    /// Interface index past the end of the configuration
    #[error("Interface index {index} out of range (configuration has {count})")]
    InterfaceOutOfRange { index: u8, count: u8 },
}

impl Error {
    /// The libusb status code, if this error came from the native layer.
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::Usb { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<rusb::Error> for Error {
    fn from(source: rusb::Error) -> Self {
        Error::Usb {
            code: error_code(source),
            source,
        }
    }
}

/// Map a rusb error back to the libusb status code it was created from.
pub fn error_code(err: rusb::Error) -> i32 {
    match err {
        rusb::Error::Io => LIBUSB_ERROR_IO,
        rusb::Error::InvalidParam => LIBUSB_ERROR_INVALID_PARAM,
        rusb::Error::Access => LIBUSB_ERROR_ACCESS,
        rusb::Error::NoDevice => LIBUSB_ERROR_NO_DEVICE,
        rusb::Error::NotFound => LIBUSB_ERROR_NOT_FOUND,
        rusb::Error::Busy => LIBUSB_ERROR_BUSY,
        rusb::Error::Timeout => LIBUSB_ERROR_TIMEOUT,
        rusb::Error::Overflow => LIBUSB_ERROR_OVERFLOW,
        rusb::Error::Pipe => LIBUSB_ERROR_PIPE,
        rusb::Error::Interrupted => LIBUSB_ERROR_INTERRUPTED,
        rusb::Error::NoMem => LIBUSB_ERROR_NO_MEM,
        rusb::Error::NotSupported => LIBUSB_ERROR_NOT_SUPPORTED,
        _ => LIBUSB_ERROR_OTHER,
    }
}

/// Symbolic libusb name for a status code.
pub fn error_name(code: i32) -> &'static str {
    match code {
        0 => "LIBUSB_SUCCESS",
        LIBUSB_ERROR_IO => "LIBUSB_ERROR_IO",
        LIBUSB_ERROR_INVALID_PARAM => "LIBUSB_ERROR_INVALID_PARAM",
        LIBUSB_ERROR_ACCESS => "LIBUSB_ERROR_ACCESS",
        LIBUSB_ERROR_NO_DEVICE => "LIBUSB_ERROR_NO_DEVICE",
        LIBUSB_ERROR_NOT_FOUND => "LIBUSB_ERROR_NOT_FOUND",
        LIBUSB_ERROR_BUSY => "LIBUSB_ERROR_BUSY",
        LIBUSB_ERROR_TIMEOUT => "LIBUSB_ERROR_TIMEOUT",
        LIBUSB_ERROR_OVERFLOW => "LIBUSB_ERROR_OVERFLOW",
        LIBUSB_ERROR_PIPE => "LIBUSB_ERROR_PIPE",
        LIBUSB_ERROR_INTERRUPTED => "LIBUSB_ERROR_INTERRUPTED",
        LIBUSB_ERROR_NO_MEM => "LIBUSB_ERROR_NO_MEM",
        LIBUSB_ERROR_NOT_SUPPORTED => "LIBUSB_ERROR_NOT_SUPPORTED",
        _ => "LIBUSB_ERROR_OTHER",
    }
}

/// Type alias for wrapper results
pub type Result<T> = std::result::Result<T, Error>;
