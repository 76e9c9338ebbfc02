//! USB device wrapper
//!
//! A [`Device`] holds a counted reference to a native device. Cloning it takes
//! another reference, dropping it releases one. The device can be opened
//! once; after that the open handle is shared by every clone made from it
//! and closed when the last of them is dropped.
//!
//! Descriptor queries work on an unopened device. Transfers and interface
//! claims need the handle and fail with [`Error::NotOpen`] without it.

use crate::config_descriptor::ConfigDescriptor;
use crate::error::{Error, Result};
use crate::handle::SharedHandle;
use crate::request_options::{DataDirection, RecipientType, RequestOptions, RequestType};
use rusb::{DeviceDescriptor, DeviceHandle, Interface, Speed};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Standard GET_STATUS request code
pub const REQUEST_GET_STATUS: u8 = 0x00;

/// Bit 7 of an endpoint address: set for IN endpoints
const ENDPOINT_DIR_IN: u8 = 0x80;

/// A USB device, opened or not
#[derive(Clone)]
pub struct Device {
    inner: rusb::Device<rusb::Context>,
    handle: SharedHandle<DeviceHandle<rusb::Context>>,
}

impl Device {
    pub(crate) fn new(inner: rusb::Device<rusb::Context>) -> Self {
        Self {
            inner,
            handle: SharedHandle::new(),
        }
    }

    /// Read the device descriptor. Does not need an open handle.
    pub fn descriptor(&self) -> Result<DeviceDescriptor> {
        Ok(self.inner.device_descriptor()?)
    }

    pub fn bus_number(&self) -> u8 {
        self.inner.bus_number()
    }

    pub fn address(&self) -> u8 {
        self.inner.address()
    }

    pub fn port_number(&self) -> u8 {
        self.inner.port_number()
    }

    pub fn speed(&self) -> Speed {
        self.inner.speed()
    }

    /// Open the device.
    ///
    /// Opening an already open device does nothing.
    pub fn open(&mut self) -> Result<()> {
        if self.handle.is_open() {
            debug!(
                "Device {:03}/{:03} already open",
                self.bus_number(),
                self.address()
            );
            return Ok(());
        }

        let device = &self.inner;
        self.handle.open_with(|| {
            device.open().map_err(|e| {
                warn!(
                    "Failed to open device {:03}/{:03}: {}",
                    device.bus_number(),
                    device.address(),
                    e
                );
                Error::from(e)
            })
        })?;

        debug!(
            "Opened device {:03}/{:03}",
            self.bus_number(),
            self.address()
        );
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_open()
    }

    /// Number of device values sharing the open handle (0 if unopened)
    pub fn handle_holders(&self) -> usize {
        self.handle.holders()
    }

    /// Perform a control transfer. Needs an open device.
    ///
    /// The direction bit of `options` decides the data phase: for
    /// device-to-host requests `data` receives the response, otherwise its
    /// contents are sent. A zero `timeout` waits forever.
    ///
    /// Returns the number of bytes actually transferred.
    pub fn control_transfer(
        &self,
        options: RequestOptions,
        request: u8,
        value: u16,
        index: u16,
        data: &mut [u8],
        timeout: Duration,
    ) -> Result<usize> {
        let handle = self.handle.get()?;
        let request_type = options.bits();

        debug!(
            "Control transfer: request_type={:#x}, request={:#x}, value={:#x}, index={:#x}, data_len={}",
            request_type,
            request,
            value,
            index,
            data.len()
        );

        let result = match options.direction() {
            DataDirection::DeviceToHost => {
                handle.read_control(request_type, request, value, index, data, timeout)
            }
            DataDirection::HostToDevice => {
                handle.write_control(request_type, request, value, index, data, timeout)
            }
        };

        match result {
            Ok(len) => {
                debug!("Control transfer succeeded: {} bytes", len);
                Ok(len)
            }
            Err(e) => {
                warn!("Control transfer failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Issue a standard GET_STATUS request to the device, waiting forever.
    ///
    /// The two status bytes are combined little-endian.
    pub fn get_status(&self) -> Result<u16> {
        self.get_status_with_timeout(Duration::ZERO)
    }

    pub fn get_status_with_timeout(&self, timeout: Duration) -> Result<u16> {
        let options = RequestOptions::new(
            DataDirection::DeviceToHost,
            RequestType::Standard,
            RecipientType::Device,
        );

        let mut status = [0u8; 2];
        let len = self.control_transfer(
            options,
            REQUEST_GET_STATUS,
            0,
            0,
            &mut status,
            timeout,
        )?;

        if len != status.len() {
            return Err(Error::ShortTransfer {
                expected: status.len(),
                actual: len,
            });
        }

        Ok(u16::from_le_bytes(status))
    }

    /// Perform a bulk transfer. Needs an open device.
    ///
    /// Bit 7 of `endpoint` selects the direction: set reads into `data`,
    /// clear writes `data` out. A zero `timeout` waits forever.
    ///
    /// Returns the number of bytes actually transferred.
    pub fn bulk_transfer(&self, endpoint: u8, data: &mut [u8], timeout: Duration) -> Result<usize> {
        let handle = self.handle.get()?;
        let is_in = endpoint & ENDPOINT_DIR_IN != 0;

        debug!(
            "Bulk transfer: endpoint={:#x}, data_len={}, timeout={}ms, is_in={}",
            endpoint,
            data.len(),
            timeout.as_millis(),
            is_in
        );

        let result = if is_in {
            handle.read_bulk(endpoint, data, timeout)
        } else {
            handle.write_bulk(endpoint, data, timeout)
        };

        match result {
            Ok(len) => {
                debug!("Bulk transfer succeeded: {} bytes", len);
                Ok(len)
            }
            Err(e) => {
                warn!("Bulk transfer failed on endpoint {:#x}: {}", endpoint, e);
                Err(e.into())
            }
        }
    }

    /// Fetch every configuration descriptor of the device.
    ///
    /// A configuration that cannot be read is logged and skipped.
    pub fn config_descriptors(&self) -> Result<Vec<ConfigDescriptor>> {
        let descriptor = self.descriptor()?;
        let mut configs = Vec::with_capacity(descriptor.num_configurations() as usize);

        for index in 0..descriptor.num_configurations() {
            match self.inner.config_descriptor(index) {
                Ok(config) => configs.push(ConfigDescriptor::new(config)),
                Err(e) => {
                    warn!(
                        "Skipping config descriptor {} of device {:03}/{:03}: {}",
                        index,
                        self.bus_number(),
                        self.address(),
                        Error::from(e)
                    );
                }
            }
        }

        Ok(configs)
    }

    pub fn active_config_descriptor(&self) -> Result<ConfigDescriptor> {
        Ok(ConfigDescriptor::new(
            self.inner.active_config_descriptor()?,
        ))
    }

    /// Claim every interface of every configuration.
    pub fn claim_all_interfaces(&self) -> Result<()> {
        for config in self.config_descriptors()? {
            self.claim_config_interfaces(&config)?;
        }
        Ok(())
    }

    /// Claim every interface of one configuration.
    pub fn claim_config_interfaces(&self, config: &ConfigDescriptor) -> Result<()> {
        for interface in config.interfaces() {
            self.claim_interface_group(&interface)?;
        }
        Ok(())
    }

    /// Claim the interface number of each alternate setting in `interface`.
    pub fn claim_interface_group(&self, interface: &Interface<'_>) -> Result<()> {
        for alt in interface.descriptors() {
            self.claim_interface(alt.interface_number())?;
        }
        Ok(())
    }

    pub fn claim_interface(&self, number: u8) -> Result<()> {
        let mut handle = self.handle.get_mut()?;
        handle.claim_interface(number).map_err(|e| {
            let err = Error::from(e);
            error!("Failed to claim interface {}: {}", number, err);
            err
        })?;

        debug!(
            "Claimed interface {} on device {:03}/{:03}",
            number,
            self.bus_number(),
            self.address()
        );
        Ok(())
    }

    pub fn release_interface(&self, number: u8) -> Result<()> {
        let mut handle = self.handle.get_mut()?;
        handle.release_interface(number)?;

        debug!(
            "Released interface {} on device {:03}/{:03}",
            number,
            self.bus_number(),
            self.address()
        );
        Ok(())
    }

    /// Let libusb detach and reattach kernel drivers around interface claims.
    ///
    /// Not supported on every platform.
    pub fn set_auto_detach_kernel_driver(&self, enable: bool) -> Result<()> {
        let mut handle = self.handle.get_mut()?;
        handle.set_auto_detach_kernel_driver(enable)?;
        Ok(())
    }

    /// Read an ASCII string descriptor. Needs an open device.
    pub fn read_string_descriptor(&self, index: u8) -> Result<String> {
        let handle = self.handle.get()?;
        Ok(handle.read_string_descriptor_ascii(index)?)
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("bus_number", &self.bus_number())
            .field("address", &self.address())
            .field("open", &self.is_open())
            .finish()
    }
}
