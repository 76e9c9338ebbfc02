//! Configuration descriptor tree
//!
//! A [`ConfigDescriptor`] owns the descriptor block fetched from libusb and
//! frees it when dropped. Interfaces and their alternate settings borrow
//! from it.

use crate::error::{Error, Result};
use rusb::{Interface, Interfaces};

/// One configuration of a device
pub struct ConfigDescriptor {
    inner: rusb::ConfigDescriptor,
}

impl ConfigDescriptor {
    pub(crate) fn new(inner: rusb::ConfigDescriptor) -> Self {
        Self { inner }
    }

    /// `bConfigurationValue`, the value passed to SET_CONFIGURATION
    pub fn number(&self) -> u8 {
        self.inner.number()
    }

    /// Maximum bus power draw in milliamps
    pub fn max_power(&self) -> u16 {
        self.inner.max_power()
    }

    pub fn self_powered(&self) -> bool {
        self.inner.self_powered()
    }

    pub fn remote_wakeup(&self) -> bool {
        self.inner.remote_wakeup()
    }

    pub fn description_string_index(&self) -> Option<u8> {
        self.inner.description_string_index()
    }

    pub fn interface_count(&self) -> u8 {
        self.inner.num_interfaces()
    }

    /// Interface at position `index` in the descriptor.
    pub fn interface(&self, index: u8) -> Result<Interface<'_>> {
        let count = self.interface_count();
        self.inner
            .interfaces()
            .nth(index as usize)
            .ok_or(Error::InterfaceOutOfRange { index, count })
    }

    pub fn interfaces(&self) -> Interfaces<'_> {
        self.inner.interfaces()
    }

    /// Interface numbers in claim order: one entry per alternate setting.
    pub fn interface_numbers(&self) -> Vec<u8> {
        self.interfaces()
            .flat_map(|interface| interface.descriptors().map(|alt| alt.interface_number()))
            .collect()
    }
}

impl std::fmt::Debug for ConfigDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigDescriptor")
            .field("number", &self.number())
            .field("interfaces", &self.interface_count())
            .field("max_power", &self.max_power())
            .finish()
    }
}
