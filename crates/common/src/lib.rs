//! Common utilities for usbwrap tools
//!
//! Shared error type, logging setup and VID:PID device filters.

pub mod error;
pub mod filter;
pub mod logging;

pub use error::{Error, Result};
pub use filter::{DeviceFilter, FilterRule};
pub use logging::setup_logging;
