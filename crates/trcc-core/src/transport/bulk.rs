//! Raw-bulk vendor transport: identical lifecycle to [`super::hid::HidTransport`]
//! (open, claim, bulk endpoint pair), used for devices whose handshake is a
//! 64-byte probe and whose frames are delimited by zero-length packets.

use crate::error::Result;
use std::ops::{Deref, DerefMut};

use super::hid::HidTransport;

/// Newtype over [`HidTransport`] so protocol handlers can't accidentally mix
/// up a bulk-vendor device with an HID-LCD device at the type level, even
/// though the underlying transport mechanics are the same.
pub struct BulkTransport(HidTransport);

impl BulkTransport {
    pub fn open(vid: u16, pid: u16, bus_path: &str) -> Result<Self> {
        Ok(Self(HidTransport::open(vid, pid, bus_path)?))
    }
}

impl Deref for BulkTransport {
    type Target = HidTransport;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for BulkTransport {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
