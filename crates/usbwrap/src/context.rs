//! libusb context
//!
//! Every clone of a [`Context`] refers to the same native context, which is
//! torn down when the last clone is dropped.

use crate::device::Device;
use crate::device_list::DeviceList;
use crate::error::{Error, Result};
use rusb::{LogLevel, UsbContext};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct Context {
    inner: rusb::Context,
}

impl Context {
    /// Initialise a new libusb context with native logging at `Info`.
    pub fn new() -> Result<Self> {
        Self::with_log_level(LogLevel::Info)
    }

    /// Initialise a new libusb context with the given native log level.
    pub fn with_log_level(level: LogLevel) -> Result<Self> {
        let mut inner = rusb::Context::new().map_err(|e| {
            warn!("Failed to initialise libusb: {}", e);
            Error::from(e)
        })?;
        inner.set_log_level(level);

        debug!("libusb context initialised");
        Ok(Self { inner })
    }

    /// Enumerate the devices currently attached.
    pub fn devices(&self) -> Result<DeviceList> {
        let mut list = DeviceList::new();
        list.find_devices(self)?;
        Ok(list)
    }

    /// Open the first device matching `vendor_id:product_id`.
    ///
    /// Returns `Ok(None)` if no attached device matches.
    pub fn open_device_with_vid_pid(
        &self,
        vendor_id: u16,
        product_id: u16,
    ) -> Result<Option<Device>> {
        for mut device in &self.devices()? {
            let descriptor = match device.descriptor() {
                Ok(d) => d,
                Err(e) => {
                    debug!("Skipping device without readable descriptor: {}", e);
                    continue;
                }
            };

            if descriptor.vendor_id() == vendor_id && descriptor.product_id() == product_id {
                device.open()?;
                return Ok(Some(device));
            }
        }

        Ok(None)
    }

    pub(crate) fn native(&self) -> &rusb::Context {
        &self.inner
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}
