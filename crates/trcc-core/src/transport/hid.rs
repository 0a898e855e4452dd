//! HID transport: opens the device, claims the vendor-specific (or first)
//! interface, detaches any kernel driver idempotently, and talks over one
//! bulk IN / bulk OUT endpoint pair. Despite the name, framing here is the
//! raw vendor protocol, not a USB-HID report descriptor.

use crate::error::{CoreError, DeviceContext, Result};
use std::time::Duration;

use super::{FRAME_IO_TIMEOUT_MS, HANDSHAKE_TIMEOUT_MS};

pub struct HidTransport {
    interface: nusb::Interface,
    ep_in: u8,
    ep_out: u8,
    ctx: DeviceContext,
}

// nusb::Interface is Send-safe once claimed.
unsafe impl Send for HidTransport {}

impl HidTransport {
    pub fn open(vid: u16, pid: u16, bus_path: &str) -> Result<Self> {
        let ctx = DeviceContext::new(vid, pid, bus_path.to_string());

        let device_info = nusb::list_devices()
            .map_err(|e| {
                CoreError::TransportOpenFailed(ctx.clone(), format!("usb enumeration: {e}"))
            })?
            .find(|d| d.vendor_id() == vid && d.product_id() == pid)
            .ok_or_else(|| {
                CoreError::TransportOpenFailed(ctx.clone(), "device vanished".to_string())
            })?;

        let iface_num = device_info
            .interfaces()
            .find(|i| i.class() == 255)
            .or_else(|| device_info.interfaces().next())
            .map(|i| i.interface_number())
            .ok_or_else(|| {
                CoreError::TransportOpenFailed(ctx.clone(), "no usable interface".to_string())
            })?;

        let usb_device = device_info
            .open()
            .map_err(|e| CoreError::TransportOpenFailed(ctx.clone(), format!("open: {e}")))?;

        // nusb detaches any attached kernel driver automatically and
        // idempotently when claiming; a busy driver is retried once.
        let interface = match usb_device.claim_interface(iface_num) {
            Ok(i) => i,
            Err(e) => {
                log::warn!("claim interface {iface_num} failed once ({e}); retrying");
                usb_device.claim_interface(iface_num).map_err(|e| {
                    CoreError::TransportOpenFailed(ctx.clone(), format!("claim interface: {e}"))
                })?
            }
        };

        let config = device_info
            .active_configuration()
            .map_err(|e| CoreError::TransportOpenFailed(ctx.clone(), format!("config: {e}")))?;
        let (ep_in, ep_out) = find_bulk_endpoints(&config, iface_num).ok_or_else(|| {
            CoreError::TransportOpenFailed(ctx.clone(), "no bulk IN/OUT endpoint pair".into())
        })?;

        Ok(Self {
            interface,
            ep_in,
            ep_out,
            ctx,
        })
    }

    pub fn write_handshake(&mut self, data: &[u8]) -> Result<()> {
        self.bulk_write(data, HANDSHAKE_TIMEOUT_MS)
    }

    pub fn read_handshake(&mut self, len: usize) -> Result<Vec<u8>> {
        self.bulk_read(len, HANDSHAKE_TIMEOUT_MS)
    }

    fn bulk_write(&mut self, data: &[u8], timeout_ms: u64) -> Result<()> {
        self.interface
            .bulk_out_blocking(self.ep_out, data, Duration::from_millis(timeout_ms))
            .map_err(|e| CoreError::WireIoTimeout(self.ctx.clone(), format!("bulk write: {e}")))?;
        Ok(())
    }

    fn bulk_read(&mut self, len: usize, timeout_ms: u64) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        let n = self
            .interface
            .bulk_in_blocking(self.ep_in, &mut buf, Duration::from_millis(timeout_ms))
            .map_err(|e| CoreError::WireIoTimeout(self.ctx.clone(), format!("bulk read: {e}")))?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Send a zero-length packet to delimit a frame.
    pub fn write_zlp(&mut self) -> Result<()> {
        self.bulk_write(&[], FRAME_IO_TIMEOUT_MS)
    }

    pub fn write_frame_chunk(&mut self, data: &[u8]) -> Result<()> {
        self.bulk_write(data, FRAME_IO_TIMEOUT_MS)
    }

    pub fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

pub(crate) fn find_bulk_endpoints(
    config: &nusb::descriptors::Configuration,
    interface_number: u8,
) -> Option<(u8, u8)> {
    let iface = config
        .interface_alt_settings()
        .find(|a| a.interface_number() == interface_number)?;
    let mut ep_in = None;
    let mut ep_out = None;
    for ep in iface.endpoints() {
        if ep.transfer_type() != nusb::descriptors::TransferType::Bulk {
            continue;
        }
        if ep.direction() == nusb::transfer::Direction::In {
            ep_in.get_or_insert(ep.address());
        } else {
            ep_out.get_or_insert(ep.address());
        }
    }
    Some((ep_in?, ep_out?))
}

/// Handshake probe byte layout shared by HID and Bulk protocols:
/// `{0x12,0x34,0x56,0x78, 0,...,byte[56]=0x01, ...}` padded to 64 bytes.
pub fn handshake_probe_payload() -> [u8; 64] {
    let mut p = [0u8; 64];
    p[0..4].copy_from_slice(&[0x12, 0x34, 0x56, 0x78]);
    p[56] = 0x01;
    p
}
