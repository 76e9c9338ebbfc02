//! Snapshot of attached devices

use crate::context::Context;
use crate::device::Device;
use crate::error::Result;
use rusb::UsbContext;
use tracing::debug;

/// Devices found by the last call to [`DeviceList::find_devices`]
///
/// The snapshot is never refreshed on its own; call `find_devices` again to
/// re-enumerate.
#[derive(Default)]
pub struct DeviceList {
    native: Option<rusb::DeviceList<rusb::Context>>,
}

impl DeviceList {
    /// An empty list. Nothing is enumerated until [`find_devices`](Self::find_devices).
    pub fn new() -> Self {
        Self { native: None }
    }

    /// Enumerate devices through `context`, replacing any previous snapshot.
    pub fn find_devices(&mut self, context: &Context) -> Result<()> {
        let list = context.native().devices()?;
        debug!("Enumerated {} devices", list.len());
        self.native = Some(list);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.native.as_ref().map(|list| list.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Device> {
        self.iter().nth(index)
    }

    /// Iterate over the snapshot. Each item holds its own device reference.
    pub fn iter(&self) -> Devices<'_> {
        Devices {
            inner: self.native.as_ref().map(|list| list.iter()),
        }
    }
}

impl<'a> IntoIterator for &'a DeviceList {
    type Item = Device;
    type IntoIter = Devices<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`DeviceList`]
pub struct Devices<'a> {
    inner: Option<rusb::Devices<'a, rusb::Context>>,
}

impl Iterator for Devices<'_> {
    type Item = Device;

    fn next(&mut self) -> Option<Device> {
        self.inner.as_mut()?.next().map(Device::new)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Some(devices) => devices.size_hint(),
            None => (0, Some(0)),
        }
    }
}
