//! SCSI LCD protocol handler (§4.3.1): poll/init handshake plus a chunked
//! frame write over the stateless SCSI transport.

use crate::error::{CoreError, DeviceContext, Result};
use crate::models::{ChunkPlan, ChunkSegment, FrameJob, HandshakeResult, PanelProfile, PixelFormat};
use crate::transport::scsi::ScsiExecutor;
use crate::transport::{MAX_CHUNK_LEN, ScsiTransport};

/// Poll command: read-size 0xE100.
const POLL_CMD: u32 = 0x0000_00F5;
const POLL_READ_SIZE: u32 = 0xE100;
/// Init command: write-size 0xE100.
const INIT_CMD: u32 = 0x0000_01F5;

/// Base command for frame-data chunk writes; the per-chunk index is folded
/// into the byte above it (cmd = ((0x10 + i) << 8) | FRAME_CMD_BASE).
const FRAME_CMD_BASE: u32 = 0x15;

/// Default panel used before a real FBL probe has run: 320x320, RGB565,
/// big-endian (SPI mode 2), 4-segment chunk plan.
pub fn profile_for(width: u32, height: u32) -> PanelProfile {
    let bytes_per_pixel = 2;
    let total = (width * height * bytes_per_pixel) as usize;
    PanelProfile {
        width,
        height,
        pixel_format: if crate::pixel::is_big_endian(width, height, 51) {
            PixelFormat::Rgb565Be
        } else {
            PixelFormat::Rgb565Le
        },
        bytes_per_pixel,
        chunk_plan: build_chunk_plan(total),
    }
}

/// Partition `total_bytes` into <=64KiB segments; chunk `i` gets command
/// `((0x10 + i) << 8) | FRAME_CMD_BASE`.
pub fn build_chunk_plan(total_bytes: usize) -> ChunkPlan {
    let mut segments = Vec::new();
    let mut remaining = total_bytes;
    let mut i: u32 = 0;
    while remaining > 0 {
        let len = remaining.min(MAX_CHUNK_LEN);
        segments.push(ChunkSegment {
            chunk_cmd: ((0x10 + i) << 8) | FRAME_CMD_BASE,
            byte_length: len,
        });
        remaining -= len;
        i += 1;
    }
    if segments.is_empty() {
        segments.push(ChunkSegment {
            chunk_cmd: (0x10 << 8) | FRAME_CMD_BASE,
            byte_length: 0,
        });
    }
    ChunkPlan(segments)
}

pub struct ScsiLcdHandler<E: ScsiExecutor> {
    transport: ScsiTransport<E>,
    ctx: DeviceContext,
    profile: PanelProfile,
}

impl<E: ScsiExecutor> ScsiLcdHandler<E> {
    pub fn new(transport: ScsiTransport<E>, ctx: DeviceContext) -> Self {
        let profile = profile_for(320, 320);
        Self {
            transport,
            ctx,
            profile,
        }
    }

    pub fn profile(&self) -> &PanelProfile {
        &self.profile
    }

    pub fn handshake(&mut self) -> Result<HandshakeResult> {
        let poll_resp = self
            .transport
            .read_command(POLL_CMD, POLL_READ_SIZE as usize)?;
        if poll_resp.is_empty() {
            return Err(CoreError::HandshakeFailed(
                self.ctx.clone(),
                "empty poll response".into(),
            ));
        }
        self.transport.send_command(INIT_CMD, &[], INIT_READ_SIZE)?;
        Ok(HandshakeResult {
            resolution: Some((self.profile.width, self.profile.height)),
            model_id: 0,
            serial: String::new(),
            raw_response: poll_resp,
            sub_type: 0,
            use_jpeg: false,
            led_style: None,
        })
    }

    /// Pad frame bytes to the chunk plan's total length, then submit
    /// chunk-by-chunk. Aborts on the first chunk write failure (REDESIGN:
    /// the source silently ignores per-chunk failures and continues).
    pub fn send_frame(&mut self, job: &FrameJob) -> Result<()> {
        let total = self.profile.chunk_plan.total_len();
        let mut padded = job.bytes.clone();
        if padded.len() > total {
            return Err(CoreError::ProtocolError(
                self.ctx.clone(),
                format!("frame of {} bytes exceeds chunk plan of {total}", padded.len()),
            ));
        }
        padded.resize(total, 0);

        let mut offset = 0;
        for segment in &self.profile.chunk_plan.0 {
            let chunk = &padded[offset..offset + segment.byte_length];
            self.transport
                .send_command(segment.chunk_cmd, chunk, segment.byte_length as u32)
                .map_err(|e| {
                    log::warn!("scsi chunk write failed at offset {offset}: {e}");
                    CoreError::ProtocolError(self.ctx.clone(), format!("chunk write: {e}"))
                })?;
            offset += segment.byte_length;
        }
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        self.transport.close()
    }
}

const INIT_READ_SIZE: u32 = POLL_READ_SIZE;
