//! Shared open-handle slot
//!
//! A [`Device`](crate::Device) starts without a handle. After it is opened,
//! every clone made from it shares the same handle; the handle is dropped
//! (and the native device closed) when the last holder goes away.

use crate::error::{Error, Result};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

pub(crate) struct SharedHandle<H> {
    slot: Option<Rc<RefCell<H>>>,
}

impl<H> SharedHandle<H> {
    pub(crate) fn new() -> Self {
        Self { slot: None }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.slot.is_some()
    }

    /// Fill the slot with the result of `open`, unless it is already filled.
    ///
    /// Returns `true` if `open` ran.
    pub(crate) fn open_with<F>(&mut self, open: F) -> Result<bool>
    where
        F: FnOnce() -> Result<H>,
    {
        if self.slot.is_some() {
            return Ok(false);
        }

        let handle = open()?;
        self.slot = Some(Rc::new(RefCell::new(handle)));
        Ok(true)
    }

    pub(crate) fn get(&self) -> Result<Ref<'_, H>> {
        self.slot
            .as_ref()
            .map(|handle| handle.borrow())
            .ok_or(Error::NotOpen)
    }

    pub(crate) fn get_mut(&self) -> Result<RefMut<'_, H>> {
        self.slot
            .as_ref()
            .map(|handle| handle.borrow_mut())
            .ok_or(Error::NotOpen)
    }

    /// Number of device values currently sharing the handle (0 if unopened).
    pub(crate) fn holders(&self) -> usize {
        self.slot.as_ref().map(Rc::strong_count).unwrap_or(0)
    }
}

impl<H> Clone for SharedHandle<H> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<H> Default for SharedHandle<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Stand-in for a native handle that counts how often it was closed
    struct FakeHandle<'a> {
        closed: &'a Cell<u32>,
        claimed: Vec<u8>,
    }

    impl Drop for FakeHandle<'_> {
        fn drop(&mut self) {
            self.closed.set(self.closed.get() + 1);
        }
    }

    #[test]
    fn test_unopened_slot_fails() {
        let slot: SharedHandle<u32> = SharedHandle::new();
        assert!(!slot.is_open());
        assert!(matches!(slot.get(), Err(Error::NotOpen)));
        assert!(matches!(slot.get_mut(), Err(Error::NotOpen)));
        assert_eq!(slot.holders(), 0);
    }

    #[test]
    fn test_open_is_idempotent() {
        let mut slot = SharedHandle::new();
        let mut opens = 0;

        let ran = slot
            .open_with(|| {
                opens += 1;
                Ok(7u32)
            })
            .unwrap();
        assert!(ran);

        let ran = slot
            .open_with(|| {
                opens += 1;
                Ok(8u32)
            })
            .unwrap();
        assert!(!ran);

        assert_eq!(opens, 1);
        assert_eq!(*slot.get().unwrap(), 7);
    }

    #[test]
    fn test_failed_open_leaves_slot_empty() {
        let mut slot: SharedHandle<u32> = SharedHandle::new();
        let result = slot.open_with(|| Err(Error::from(rusb::Error::Access)));
        assert!(matches!(result, Err(Error::Usb { code: -3, .. })));
        assert!(!slot.is_open());
    }

    #[test]
    fn test_clones_share_handle() {
        let closed = Cell::new(0);
        let mut slot = SharedHandle::new();
        slot.open_with(|| {
            Ok(FakeHandle {
                closed: &closed,
                claimed: Vec::new(),
            })
        })
        .unwrap();

        let copy = slot.clone();
        assert_eq!(slot.holders(), 2);

        copy.get_mut().unwrap().claimed.push(1);
        assert_eq!(slot.get().unwrap().claimed, vec![1]);

        drop(slot);
        assert_eq!(closed.get(), 0);
        assert_eq!(copy.holders(), 1);

        drop(copy);
        assert_eq!(closed.get(), 1);
    }

    #[test]
    fn test_clone_before_open_is_independent() {
        let mut slot = SharedHandle::new();
        let early_copy = slot.clone();

        slot.open_with(|| Ok(1u8)).unwrap();
        assert!(slot.is_open());
        assert!(!early_copy.is_open());
    }
}
