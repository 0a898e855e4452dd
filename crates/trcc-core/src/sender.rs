//! Sender Cache & Factory (L4): given a device descriptor, returns a cached
//! sender bound to the protocol handler its transport dictates. Owns
//! transport lifetime; senders are never shared concurrently — serial use
//! per key is this module's contract.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{CoreError, DeviceContext, Result};
use crate::models::{DeviceDescriptor, FrameJob, HandshakeResult, PixelTransport};
use crate::protocol::bulk_lcd::BulkLcdHandler;
use crate::protocol::hid_lcd::HidLcdHandler;
use crate::protocol::led::LedHidHandler;
use crate::protocol::scsi_lcd::ScsiLcdHandler;
use crate::transport::bulk::BulkTransport;
use crate::transport::hid::HidTransport;
use crate::transport::led_hid::LedHidTransport;
use crate::transport::scsi::{ScsiExecutor, ScsiTransport, SgRawExecutor};

/// One durable sender, tagged by which protocol handler backs it. A tagged
/// variant rather than a trait object, per the design's "avoid a deep class
/// hierarchy" guidance.
pub enum Sender {
    Scsi(ScsiLcdHandler<SgRawExecutor>),
    Hid(HidLcdHandler),
    Bulk(BulkLcdHandler),
    Led(LedHidHandler),
}

impl Sender {
    fn open(descriptor: &DeviceDescriptor) -> Result<Self> {
        let ctx = DeviceContext::new(descriptor.vid, descriptor.pid, descriptor.bus_path.clone());
        match descriptor.pixel_transport {
            PixelTransport::Scsi => {
                let node = descriptor.scsi_pass_through_node.clone().ok_or_else(|| {
                    CoreError::TransportOpenFailed(
                        ctx.clone(),
                        "no SCSI pass-through node for this device".into(),
                    )
                })?;
                let transport = ScsiTransport::new(node, SgRawExecutor::default());
                Ok(Sender::Scsi(ScsiLcdHandler::new(transport, ctx)))
            }
            PixelTransport::Hid => {
                let transport =
                    HidTransport::open(descriptor.vid, descriptor.pid, &descriptor.bus_path)?;
                Ok(Sender::Hid(HidLcdHandler::new(transport, ctx)))
            }
            PixelTransport::Bulk => {
                let transport =
                    BulkTransport::open(descriptor.vid, descriptor.pid, &descriptor.bus_path)?;
                Ok(Sender::Bulk(BulkLcdHandler::new(transport, ctx)))
            }
            PixelTransport::LedHid => {
                let transport =
                    LedHidTransport::open(descriptor.vid, descriptor.pid, &descriptor.bus_path)?;
                Ok(Sender::Led(LedHidHandler::new(transport, ctx)))
            }
        }
    }

    pub fn handshake(&mut self) -> Result<HandshakeResult> {
        match self {
            Sender::Scsi(h) => h.handshake(),
            Sender::Hid(h) => h.handshake(),
            Sender::Bulk(h) => h.handshake(),
            Sender::Led(h) => h.handshake(),
        }
    }

    pub fn send_frame(&mut self, job: &FrameJob) -> Result<()> {
        match self {
            Sender::Scsi(h) => h.send_frame(job),
            Sender::Hid(h) => h.send_frame(job),
            Sender::Bulk(h) => h.send_frame(job),
            Sender::Led(h) => h.send_frame(job),
        }
    }

    pub fn close(&mut self) -> Result<()> {
        match self {
            Sender::Scsi(h) => h.close(),
            Sender::Hid(h) => h.close(),
            Sender::Bulk(h) => h.close(),
            Sender::Led(h) => h.close(),
        }
    }

    /// The panel profile a frame must be encoded against, once known (after
    /// a successful handshake for HID/Bulk; immediately for SCSI, which uses
    /// a fixed default profile). `None` for LED HID senders, which have no
    /// pixel geometry — see [`Self::led_style`] instead.
    pub fn panel_profile(&self) -> Option<crate::models::PanelProfile> {
        match self {
            Sender::Scsi(h) => Some(h.profile().clone()),
            Sender::Hid(h) => h.profile().cloned(),
            Sender::Bulk(h) => h.profile().cloned(),
            Sender::Led(_) => None,
        }
    }

    /// The LED form factor a frame must be encoded against, once known (after
    /// a successful handshake). `None` for LCD senders.
    pub fn led_style(&self) -> Option<&'static crate::models::LedDeviceStyle> {
        match self {
            Sender::Led(h) => h.style(),
            _ => None,
        }
    }
}

/// Mutex-guarded cache keyed by `descriptor.cache_key()`. Cache mutation is
/// serialised by the cache-level mutex; that lock is never held while a
/// sender performs I/O — each entry holds its own mutex for that.
#[derive(Default)]
pub struct SenderCache {
    entries: Mutex<HashMap<String, Arc<Mutex<Sender>>>>,
}

impl SenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sender for `descriptor`, creating and caching it on first
    /// use. A second call with an equal key returns the same instance.
    pub fn get_sender(&self, descriptor: &DeviceDescriptor) -> Result<Arc<Mutex<Sender>>> {
        let key = descriptor.cache_key();
        let mut entries = self.entries.lock().expect("sender cache poisoned");
        if let Some(existing) = entries.get(&key) {
            return Ok(Arc::clone(existing));
        }
        let sender = Sender::open(descriptor)?;
        let handle = Arc::new(Mutex::new(sender));
        entries.insert(key, Arc::clone(&handle));
        Ok(handle)
    }

    /// Evict and close a cached sender. Close errors are swallowed (per the
    /// design's eviction contract) but logged.
    pub fn remove_sender(&self, descriptor: &DeviceDescriptor) {
        let key = descriptor.cache_key();
        let removed = self.entries.lock().expect("sender cache poisoned").remove(&key);
        if let Some(sender) = removed {
            if let Ok(mut s) = sender.lock() {
                if let Err(e) = s.close() {
                    log::warn!("error closing evicted sender {key}: {e}");
                }
            }
        }
    }

    /// Drain the cache, closing every sender. Close errors are swallowed but
    /// never mask earlier caller errors.
    pub fn close_all(&self) {
        let drained: Vec<_> = self
            .entries
            .lock()
            .expect("sender cache poisoned")
            .drain()
            .collect();
        for (key, sender) in drained {
            if let Ok(mut s) = sender.lock() {
                if let Err(e) = s.close() {
                    log::warn!("error closing sender {key} during close_all: {e}");
                }
            }
        }
    }

    pub fn cached_count(&self) -> usize {
        self.entries.lock().expect("sender cache poisoned").len()
    }
}

/// Evict `descriptor`'s sender from `cache` when `err` demands it, per the
/// error taxonomy's propagation policy (transient failures keep the sender
/// alive; open/handshake failures evict it).
pub fn apply_failure_policy(cache: &SenderCache, descriptor: &DeviceDescriptor, err: &CoreError) {
    if err.failure_class() == crate::error::FailureClass::EvictSender {
        cache.remove_sender(descriptor);
    }
}
