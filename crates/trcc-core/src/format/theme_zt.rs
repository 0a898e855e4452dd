//! `Theme.zt` animation container (§4.6.1): magic byte, frame count,
//! per-frame timestamps, then size-prefixed JPEG frames.

use crate::error::{CoreError, Result};
use std::io::{Cursor, Read, Write};

pub const MAGIC: u8 = 0xDC;
/// Fallback delay for a single-frame animation, in milliseconds.
pub const SINGLE_FRAME_DELAY_MS: i32 = 42;

/// One decoded frame: its timestamp (milliseconds from animation start) and
/// JPEG-encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeFrame {
    pub timestamp_ms: i32,
    pub jpeg: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeZt {
    pub frames: Vec<ThemeFrame>,
}

impl ThemeZt {
    /// Per-frame display delay: forward difference of timestamps, clamped
    /// to >= 1ms; the final frame reuses the previous delay (or
    /// [`SINGLE_FRAME_DELAY_MS`] if there is only one frame).
    pub fn delays(&self) -> Vec<i32> {
        let n = self.frames.len();
        if n == 0 {
            return Vec::new();
        }
        if n == 1 {
            return vec![SINGLE_FRAME_DELAY_MS];
        }
        let mut delays = Vec::with_capacity(n);
        for i in 0..n - 1 {
            let d = self.frames[i + 1].timestamp_ms - self.frames[i].timestamp_ms;
            delays.push(d.max(1));
        }
        let last = *delays.last().unwrap();
        delays.push(last);
        delays
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> Result<()> {
        w.write_all(&[MAGIC])?;
        w.write_all(&(self.frames.len() as i32).to_le_bytes())?;
        for frame in &self.frames {
            w.write_all(&frame.timestamp_ms.to_le_bytes())?;
        }
        for frame in &self.frames {
            w.write_all(&(frame.jpeg.len() as i32).to_le_bytes())?;
            w.write_all(&frame.jpeg)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(mut r: R) -> Result<Self> {
        let mut magic = [0u8; 1];
        r.read_exact(&mut magic)
            .map_err(|e| CoreError::FormatError(format!("reading magic: {e}")))?;
        if magic[0] != MAGIC {
            return Err(CoreError::FormatError(format!(
                "bad Theme.zt magic: 0x{:02X}, expected 0x{MAGIC:02X}",
                magic[0]
            )));
        }

        let frame_count = read_i32(&mut r)?;
        if frame_count < 0 {
            return Err(CoreError::FormatError(format!(
                "negative frame count: {frame_count}"
            )));
        }
        let frame_count = frame_count as usize;

        let mut timestamps = Vec::with_capacity(frame_count);
        for _ in 0..frame_count {
            timestamps.push(read_i32(&mut r)?);
        }

        let mut frames = Vec::with_capacity(frame_count);
        for timestamp_ms in timestamps {
            let size = read_i32(&mut r)?;
            if size < 0 {
                return Err(CoreError::FormatError(format!("negative frame size: {size}")));
            }
            let mut jpeg = vec![0u8; size as usize];
            r.read_exact(&mut jpeg)
                .map_err(|e| CoreError::FormatError(format!("reading frame body: {e}")))?;
            frames.push(ThemeFrame { timestamp_ms, jpeg });
        }

        let result = ThemeZt { frames };
        if result.frames.len() != frame_count {
            return Err(CoreError::FormatError(
                "frame_count does not match decoded frame list length".into(),
            ));
        }
        Ok(result)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read_from(Cursor::new(bytes))
    }
}

fn read_i32<R: Read>(r: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)
        .map_err(|e| CoreError::FormatError(format!("reading i32: {e}")))?;
    Ok(i32::from_le_bytes(buf))
}
