//! Bulk vendor LCD protocol handler (§4.3.3): identical framing to the HID
//! LCD protocol, but carried over the raw-bulk transport.

use crate::error::{CoreError, DeviceContext, Result};
use crate::models::{ChunkPlan, FrameJob, HandshakeResult, PanelProfile, PixelFormat};
use crate::protocol::hid_lcd::HidLcdHandler;
use crate::protocol::{fbl_to_resolution, pm_to_fbl};
use crate::transport::bulk::BulkTransport;
use crate::transport::hid::handshake_probe_payload;

const HANDSHAKE_READ_SIZE: usize = 1024;
/// Minimum response length to safely read PM@24, SUB@36 and serial@40..56.
const MIN_HANDSHAKE_LEN: usize = 56;
const FRAME_WRITE_CHUNK: usize = 16 * 1024;
const PM_RAW_RGB565: u8 = 32;

pub struct BulkLcdHandler {
    transport: BulkTransport,
    ctx: DeviceContext,
    profile: Option<PanelProfile>,
    use_jpeg: bool,
}

impl BulkLcdHandler {
    pub fn new(transport: BulkTransport, ctx: DeviceContext) -> Self {
        Self {
            transport,
            ctx,
            profile: None,
            use_jpeg: true,
        }
    }

    pub fn handshake(&mut self) -> Result<HandshakeResult> {
        self.transport.write_handshake(&handshake_probe_payload())?;
        let resp = self.transport.read_handshake(HANDSHAKE_READ_SIZE)?;
        if resp.len() < MIN_HANDSHAKE_LEN {
            return Err(super::handshake_too_short(&self.ctx, resp.len(), MIN_HANDSHAKE_LEN));
        }
        let pm = resp[24];
        if pm == 0 {
            return Err(CoreError::HandshakeFailed(
                self.ctx.clone(),
                "PM byte is zero".into(),
            ));
        }
        let sub = resp[36];
        let serial = String::from_utf8_lossy(&resp[40..56])
            .trim_end_matches('\0')
            .to_string();

        let fbl = pm_to_fbl(pm, sub);
        let (w, h) = fbl_to_resolution(fbl, pm);
        self.use_jpeg = pm != PM_RAW_RGB565;
        let pixel_format = if self.use_jpeg {
            PixelFormat::Jpeg
        } else if crate::pixel::is_big_endian(w, h, fbl) {
            PixelFormat::Rgb565Be
        } else {
            PixelFormat::Rgb565Le
        };
        self.profile = Some(PanelProfile {
            width: w,
            height: h,
            pixel_format,
            bytes_per_pixel: if self.use_jpeg { 0 } else { 2 },
            chunk_plan: ChunkPlan::default(),
        });

        Ok(HandshakeResult {
            resolution: Some((w, h)),
            model_id: pm as u32,
            serial,
            raw_response: resp,
            sub_type: sub,
            use_jpeg: self.use_jpeg,
            led_style: None,
        })
    }

    pub fn profile(&self) -> Option<&PanelProfile> {
        self.profile.as_ref()
    }

    pub fn send_frame(&mut self, job: &FrameJob) -> Result<()> {
        let header =
            HidLcdHandler::build_frame_header(job.width, job.height, self.use_jpeg, job.bytes.len() as u32);
        self.transport.write_frame_chunk(&header)?;
        for chunk in job.bytes.chunks(FRAME_WRITE_CHUNK) {
            self.transport.write_frame_chunk(chunk)?;
        }
        self.transport.write_zlp()
    }

    pub fn close(&mut self) -> Result<()> {
        self.transport.close()
    }
}
