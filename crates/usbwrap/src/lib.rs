//! usbwrap
//!
//! Owned, reference-counted types in front of libusb:
//!
//! - [`Context`]: the native library context
//! - [`DeviceList`]: a snapshot of attached devices
//! - [`Device`]: a device reference with a shared open handle, transfers and
//!   interface claiming
//! - [`ConfigDescriptor`]: a configuration descriptor tree
//! - [`RequestOptions`]: the packed `bmRequestType` byte of a control request
//!
//! All calls are synchronous and forward directly to libusb. Native failures
//! come back as [`Error::Usb`] carrying the libusb status code.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use usbwrap::{Context, DataDirection, RecipientType, RequestOptions, RequestType};
//!
//! # fn main() -> usbwrap::Result<()> {
//! let context = Context::new()?;
//! for mut device in &context.devices()? {
//!     if device.open().is_err() {
//!         continue;
//!     }
//!
//!     let descriptor = device.descriptor()?;
//!     println!("{:04x}:{:04x}", descriptor.vendor_id(), descriptor.product_id());
//!
//!     let options = RequestOptions::new(
//!         DataDirection::DeviceToHost,
//!         RequestType::Vendor,
//!         RecipientType::Device,
//!     );
//!     let mut buf = [0u8; 64];
//!     let _ = device.control_transfer(options, 0x01, 0, 0, &mut buf, Duration::from_secs(1));
//! }
//! # Ok(())
//! # }
//! ```

pub mod config_descriptor;
pub mod context;
pub mod device;
pub mod device_list;
pub mod error;
mod handle;
pub mod request_options;

pub use config_descriptor::ConfigDescriptor;
pub use context::Context;
pub use device::{Device, REQUEST_GET_STATUS};
pub use device_list::{DeviceList, Devices};
pub use error::{Error, Result, error_code, error_name};
pub use request_options::{DataDirection, RecipientType, RequestOptions, RequestType};

pub use rusb::{DeviceDescriptor, Interface, InterfaceDescriptor, LogLevel, Speed};
