//! LED HID transport: sends fixed-length HID reports over a control
//! transfer. No framing state — each report is a complete, independent
//! command.

use crate::error::{CoreError, DeviceContext, Result};
use nusb::transfer::{Control, ControlType, Recipient};
use std::time::Duration;

use super::HANDSHAKE_TIMEOUT_MS;

/// HID class request codes used for Set_Report / Get_Report.
const HID_SET_REPORT: u8 = 0x09;
const HID_GET_REPORT: u8 = 0x01;

pub struct LedHidTransport {
    interface: nusb::Interface,
    interface_number: u16,
    ctx: DeviceContext,
}

unsafe impl Send for LedHidTransport {}

impl LedHidTransport {
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
            .find(|i| i.class() == 3 || i.class() == 255)
            .or_else(|| device_info.interfaces().next())
            .map(|i| i.interface_number())
            .ok_or_else(|| {
                CoreError::TransportOpenFailed(ctx.clone(), "no usable interface".to_string())
            })?;

        let usb_device = device_info
            .open()
            .map_err(|e| CoreError::TransportOpenFailed(ctx.clone(), format!("open: {e}")))?;
        let interface = usb_device.claim_interface(iface_num).map_err(|e| {
            CoreError::TransportOpenFailed(ctx.clone(), format!("claim interface: {e}"))
        })?;

        Ok(Self {
            interface,
            interface_number: iface_num as u16,
            ctx,
        })
    }

    /// Send one fixed-length HID report via a Set_Report control transfer.
    pub fn send_report(&mut self, report: &[u8]) -> Result<()> {
        let control = Control {
            control_type: ControlType::Class,
            recipient: Recipient::Interface,
            request: HID_SET_REPORT,
            value: 0x0200, // report type = Output (2) << 8 | report id 0
            index: self.interface_number,
        };
        self.interface
            .control_out_blocking(control, report, Duration::from_millis(HANDSHAKE_TIMEOUT_MS))
            .map_err(|e| CoreError::WireIoTimeout(self.ctx.clone(), format!("set_report: {e}")))?;
        Ok(())
    }

    pub fn read_report(&mut self, len: usize) -> Result<Vec<u8>> {
        let control = Control {
            control_type: ControlType::Class,
            recipient: Recipient::Interface,
            request: HID_GET_REPORT,
            value: 0x0100, // report type = Input (1) << 8 | report id 0
            index: self.interface_number,
        };
        let mut buf = vec![0u8; len];
        let n = self
            .interface
            .control_in_blocking(control, &mut buf, Duration::from_millis(HANDSHAKE_TIMEOUT_MS))
            .map_err(|e| CoreError::WireIoTimeout(self.ctx.clone(), format!("get_report: {e}")))?;
        buf.truncate(n);
        Ok(buf)
    }

    pub fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
