//! LED HID protocol handler (§4.3.4): non-raster frames — a per-segment
//! colour vector packed into one or more fixed-length HID reports.

use crate::error::{CoreError, DeviceContext, Result};
use crate::models::{FrameJob, HandshakeResult, LedDeviceStyle};
use crate::registry::led_style_for_pm;
use crate::transport::led_hid::LedHidTransport;

const STATUS_REPORT_LEN: usize = 64;
const LED_REPORT_LEN: usize = 64;

pub struct LedHidHandler {
    transport: LedHidTransport,
    ctx: DeviceContext,
    style: Option<&'static LedDeviceStyle>,
}

impl LedHidHandler {
    pub fn new(transport: LedHidTransport, ctx: DeviceContext) -> Self {
        Self {
            transport,
            ctx,
            style: None,
        }
    }

    pub fn handshake(&mut self) -> Result<HandshakeResult> {
        let resp = self.transport.read_report(STATUS_REPORT_LEN)?;
        if resp.len() < STATUS_REPORT_LEN {
            return Err(super::handshake_too_short(&self.ctx, resp.len(), STATUS_REPORT_LEN));
        }
        let pm = resp[0];
        let sub = resp[1];
        let style = led_style_for_pm(pm).ok_or_else(|| {
            CoreError::HandshakeFailed(
                self.ctx.clone(),
                format!("no LED style registered for pm={pm}"),
            )
        })?;
        self.style = Some(style);

        Ok(HandshakeResult {
            resolution: None,
            model_id: pm as u32,
            serial: String::new(),
            raw_response: resp,
            sub_type: sub,
            use_jpeg: false,
            led_style: Some(style),
        })
    }

    pub fn style(&self) -> Option<&'static LedDeviceStyle> {
        self.style
    }

    /// Packs `job.bytes` (4 bytes per LED, little-endian 0x00RRGGBB) into
    /// fixed-length HID reports.
    pub fn send_frame(&mut self, job: &FrameJob) -> Result<()> {
        let style = self.style.ok_or_else(|| {
            CoreError::ProtocolError(self.ctx.clone(), "handshake not completed".into())
        })?;
        let expected = style.led_count as usize * 4;
        if job.bytes.len() != expected {
            return Err(CoreError::ProtocolError(
                self.ctx.clone(),
                format!("expected {expected} bytes for {}, got {}", style.name, job.bytes.len()),
            ));
        }
        for chunk in job.bytes.chunks(LED_REPORT_LEN) {
            let mut report = vec![0u8; LED_REPORT_LEN];
            report[..chunk.len()].copy_from_slice(chunk);
            self.transport.send_report(&report)?;
        }
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        self.transport.close()
    }
}
