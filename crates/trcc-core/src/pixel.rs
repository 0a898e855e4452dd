//! Pixel & Frame Pipeline (L5): converts an input RGB image into the wire
//! format a chosen protocol needs, sized to the device's panel.
//!
//! Callers are responsible for resizing/rotating the image to the panel
//! geometry before encoding; this pipeline does not resample.

use crate::error::{CoreError, Result};
use crate::models::{FrameJob, LedDeviceStyle, PanelProfile, PixelFormat};

/// Big-endian iff the panel is 320x320 and the device reports SPI mode 2
/// (FBL 51 or 53); little-endian otherwise. This is the one endianness law
/// for the whole core.
pub fn is_big_endian(width: u32, height: u32, fbl: u16) -> bool {
    (width, height) == (320, 320) && crate::protocol::is_spi_mode_2(fbl)
}

/// Pack one RGB565 pixel: `((r & 0xF8) << 8) | ((g & 0xFC) << 3) | (b >> 3)`.
pub fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

/// An RGB888 image buffer (row-major, 3 bytes per pixel) handed in by a
/// caller. `rgb.len()` must equal `width * height * 3`.
pub struct RgbImage<'a> {
    pub width: u32,
    pub height: u32,
    pub rgb: &'a [u8],
}

fn encode_rgb565(image: &RgbImage<'_>, big_endian: bool) -> Vec<u8> {
    let n = (image.width * image.height) as usize;
    let mut out = Vec::with_capacity(n * 2);
    for px in image.rgb.chunks_exact(3) {
        let v = pack_rgb565(px[0], px[1], px[2]);
        if big_endian {
            out.extend_from_slice(&v.to_be_bytes());
        } else {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
    out
}

fn encode_jpeg(image: &RgbImage<'_>) -> Result<Vec<u8>> {
    let buf: image::RgbImage =
        image::ImageBuffer::from_raw(image.width, image.height, image.rgb.to_vec()).ok_or_else(
            || CoreError::ProtocolError(Default::default(), "image buffer size mismatch".into()),
        )?;
    let mut out = Vec::new();
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 75);
    encoder
        .encode_image(&buf)
        .map_err(|e| CoreError::ProtocolError(Default::default(), format!("jpeg encode: {e}")))?;
    Ok(out)
}

/// Encode a caller-supplied RGB image into the wire form the panel profile
/// requires. `fbl` is needed only to resolve RGB565 endianness.
pub fn encode(image: &RgbImage<'_>, profile: &PanelProfile, fbl: u16) -> Result<FrameJob> {
    if image.width != profile.width || image.height != profile.height {
        return Err(CoreError::ProtocolError(
            Default::default(),
            format!(
                "image {}x{} does not match panel profile {}x{}",
                image.width, image.height, profile.width, profile.height
            ),
        ));
    }
    let bytes = match profile.pixel_format {
        PixelFormat::Rgb565Be => encode_rgb565(image, true),
        PixelFormat::Rgb565Le => encode_rgb565(image, false),
        PixelFormat::Jpeg => encode_jpeg(image)?,
        PixelFormat::LedSegments => {
            return Err(CoreError::ProtocolError(
                Default::default(),
                "use led_segments() for LED_SEGMENTS profiles".into(),
            ));
        }
    };
    let _ = fbl; // endianness already baked into profile.pixel_format by the caller
    Ok(FrameJob {
        bytes,
        width: image.width,
        height: image.height,
        pixel_format: profile.pixel_format,
    })
}

/// Build a solid-colour frame without requiring a caller-supplied image.
pub fn solid_colour(r: u8, g: u8, b: u8, profile: &PanelProfile) -> Result<FrameJob> {
    let rgb: Vec<u8> = std::iter::repeat([r, g, b])
        .take((profile.width * profile.height) as usize)
        .flatten()
        .collect();
    let image = RgbImage {
        width: profile.width,
        height: profile.height,
        rgb: &rgb,
    };
    let big_endian = matches!(profile.pixel_format, PixelFormat::Rgb565Be);
    let fbl = if big_endian { 51 } else { 0 };
    encode(&image, profile, fbl)
}

/// Map a temperature reading or animation frame to the per-segment colour
/// vector for a chosen LED style. `colours.len()` must equal
/// `style.led_count`.
pub fn led_segments(colours: &[u32], style: &LedDeviceStyle) -> Result<FrameJob> {
    if colours.len() != style.led_count as usize {
        return Err(CoreError::ProtocolError(
            Default::default(),
            format!(
                "expected {} led colours for {}, got {}",
                style.led_count,
                style.name,
                colours.len()
            ),
        ));
    }
    let mut bytes = Vec::with_capacity(colours.len() * 4);
    for c in colours {
        bytes.extend_from_slice(&c.to_le_bytes());
    }
    Ok(FrameJob {
        bytes,
        width: 0,
        height: 0,
        pixel_format: PixelFormat::LedSegments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_colours_pack_to_documented_values() {
        assert_eq!(pack_rgb565(0xFF, 0x00, 0x00), 0xF800);
        assert_eq!(pack_rgb565(0x00, 0xFF, 0x00), 0x07E0);
        assert_eq!(pack_rgb565(0x00, 0x00, 0xFF), 0x001F);
    }

    #[test]
    fn endianness_law() {
        assert!(is_big_endian(320, 320, 51));
        assert!(is_big_endian(320, 320, 53));
        assert!(!is_big_endian(320, 320, 60));
        assert!(!is_big_endian(480, 480, 51));
    }

    #[test]
    fn solid_red_scsi_profile_is_big_endian() {
        let profile = crate::protocol::scsi_lcd::profile_for(320, 320);
        let job = solid_colour(0xFF, 0, 0, &profile).unwrap();
        assert_eq!(job.bytes.len(), 320 * 320 * 2);
        assert_eq!(&job.bytes[0..2], &[0xF8, 0x00]);
    }

    #[test]
    fn led_segments_length_mismatch_errors() {
        let style = &crate::registry::LED_STYLES[0];
        let colours = vec![0u32; style.led_count as usize - 1];
        assert!(led_segments(&colours, style).is_err());
    }

    #[test]
    fn led_segments_ok_length() {
        let style = &crate::registry::LED_STYLES[0];
        let colours = vec![0xFF0000u32; style.led_count as usize];
        let job = led_segments(&colours, style).unwrap();
        assert_eq!(job.bytes.len(), style.led_count as usize * 4);
    }
}
