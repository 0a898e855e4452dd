//! Protocol handlers (L3): per-family handshake and framing state machines.
//!
//! Every handler goes through the same two pure functions — [`pm_to_fbl`] and
//! [`fbl_to_resolution`] — which are the single source of truth for panel
//! geometry and must be reused verbatim rather than re-derived per protocol.

pub mod bulk_lcd;
pub mod hid_lcd;
pub mod led;
pub mod scsi_lcd;

use crate::error::{CoreError, DeviceContext, Result};
use crate::models::{FrameJob, HandshakeResult};

/// Default FBL returned for any `(pm, sub)` outside the known domain.
/// Resolves to 480x480 per the handshake PM->resolution table.
pub const FBL_UNKNOWN: u16 = 72;

/// Map a device's PM/SUB handshake bytes to a canonical FBL (panel geometry
/// code). Known PM domain: `{5, 7, 9, 10, 11, 12, 32, 64, 65}` plus
/// `(pm=1, sub in {48, 49})`. Anything else yields [`FBL_UNKNOWN`] — callers
/// must not guess past this boundary.
pub fn pm_to_fbl(pm: u8, sub: u8) -> u16 {
    match (pm, sub) {
        (5, _) => 51,
        (7, _) => 53,
        (9, _) => 60,
        (10, _) => 61,
        (11, _) => 62,
        (12, _) => 63,
        (32, _) => 70,
        (64, _) => 80,
        (65, _) => 81,
        (1, 48) => 90,
        (1, 49) => 91,
        _ => FBL_UNKNOWN,
    }
}

/// Map an FBL code (plus the originating PM, for disambiguation) to a panel
/// resolution. Unknown FBL codes fall back to 480x480.
pub fn fbl_to_resolution(fbl: u16, _pm: u8) -> (u32, u32) {
    match fbl {
        51 | 53 => (320, 320),
        60 | 61 => (480, 480),
        62 | 63 => (480, 320),
        70 => (480, 480),
        80 | 81 => (240, 240),
        90 | 91 => (128, 160),
        _ => (480, 480),
    }
}

/// SPI mode 2 panels (FBL 51 or 53) transmit RGB565 big-endian; every other
/// panel is little-endian. This is the single endianness law for the whole
/// core — see [`crate::pixel::is_big_endian`].
pub fn is_spi_mode_2(fbl: u16) -> bool {
    matches!(fbl, 51 | 53)
}

/// Thin capability set every protocol handler satisfies. Transport and
/// protocol are both tagged-variant dispatch (no trait objects, no deep
/// class hierarchy) — this trait exists purely to document the shared shape.
pub trait ProtocolHandler {
    fn handshake(&mut self) -> Result<HandshakeResult>;
    fn send_frame(&mut self, job: &FrameJob) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

pub(crate) fn handshake_too_short(ctx: &DeviceContext, len: usize, min: usize) -> CoreError {
    CoreError::HandshakeFailed(
        ctx.clone(),
        format!("response too short: {len} bytes (need >= {min})"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_pm_domain_maps() {
        for pm in [5u8, 7, 9, 10, 11, 12, 32, 64, 65] {
            assert_ne!(pm_to_fbl(pm, 0), FBL_UNKNOWN);
        }
        assert_eq!(pm_to_fbl(1, 48), 90);
        assert_eq!(pm_to_fbl(1, 49), 91);
    }

    #[test]
    fn unknown_pm_falls_back() {
        assert_eq!(pm_to_fbl(200, 0), FBL_UNKNOWN);
        assert_eq!(fbl_to_resolution(FBL_UNKNOWN, 200), (480, 480));
    }

    #[test]
    fn spi_mode_2_panels_are_320x320() {
        for fbl in [51u16, 53] {
            assert!(is_spi_mode_2(fbl));
            assert_eq!(fbl_to_resolution(fbl, 0), (320, 320));
        }
        assert!(!is_spi_mode_2(60));
    }
}
