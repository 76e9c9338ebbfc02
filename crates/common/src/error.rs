//! Common error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("USB error: {0}")]
    Usb(#[from] usbwrap::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid device filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_error_display() {
        let err = Error::Filter {
            filter: "0x12:zz".to_string(),
            reason: "not a valid hex number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid device filter '0x12:zz': not a valid hex number"
        );
    }

    #[test]
    fn test_usb_error_wraps_code() {
        let err = Error::from(usbwrap::Error::NotOpen);
        assert_eq!(err.to_string(), "USB error: Device is not open");
    }
}
