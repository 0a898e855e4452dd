//! `send` subcommand — push a solid colour or a raw RGB888 image to a
//! device's panel.

use trcc_core::error::CoreError;
use trcc_core::models::PixelFormat;
use trcc_core::pixel::{self, RgbImage};
use trcc_core::sender::SenderCache;

use super::{Result, select_device};

fn read_rgb888(path: &str, width: u32, height: u32) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path)?;
    let expected = (width * height * 3) as usize;
    if bytes.len() != expected {
        return Err(CoreError::ProtocolError(
            Default::default(),
            format!(
                "{path} is {} bytes, expected {expected} for a {width}x{height} RGB888 image",
                bytes.len()
            ),
        ));
    }
    Ok(bytes)
}

pub(super) fn cmd_send(device: Option<&str>, color: Option<&str>, image: Option<&str>) -> Result<()> {
    let descriptor = select_device(device)?;
    let cache = SenderCache::new();
    let sender_handle = cache.get_sender(&descriptor)?;

    let handshake = {
        let mut guard = sender_handle.lock().expect("sender mutex poisoned");
        let result = guard.handshake();
        if let Err(e) = &result {
            trcc_core::sender::apply_failure_policy(&cache, &descriptor, e);
        }
        result
    }?;

    let mut guard = sender_handle.lock().expect("sender mutex poisoned");

    if let Some(style) = guard.led_style() {
        let value = trcc_core::color::parse_color(color.unwrap_or("white"))?;
        let colours = vec![value; style.led_count as usize];
        let job = pixel::led_segments(&colours, style)?;
        let result = guard.send_frame(&job);
        if let Err(e) = &result {
            trcc_core::sender::apply_failure_policy(&cache, &descriptor, e);
        }
        result?;
        println!("Sent {} to {} ({} LEDs)", trcc_core::color::format_color(value), style.name, style.led_count);
        return Ok(());
    }

    let profile = guard.panel_profile().ok_or_else(|| {
        CoreError::ProtocolError(Default::default(), "panel profile unknown after handshake".into())
    })?;

    let job = match (color, image) {
        (Some(c), None) => {
            let value = trcc_core::color::parse_color(c)?;
            let r = ((value >> 16) & 0xFF) as u8;
            let g = ((value >> 8) & 0xFF) as u8;
            let b = (value & 0xFF) as u8;
            pixel::solid_colour(r, g, b, &profile)?
        }
        (None, Some(path)) => {
            let rgb = read_rgb888(path, profile.width, profile.height)?;
            let image = RgbImage {
                width: profile.width,
                height: profile.height,
                rgb: &rgb,
            };
            let fbl = if matches!(profile.pixel_format, PixelFormat::Rgb565Be) { 51 } else { 0 };
            pixel::encode(&image, &profile, fbl)?
        }
        (None, None) => {
            return Err(CoreError::ProtocolError(
                Default::default(),
                "pass either --color or --image".into(),
            ));
        }
        (Some(_), Some(_)) => unreachable!("clap enforces conflicts_with"),
    };

    let result = guard.send_frame(&job);
    if let Err(e) = &result {
        trcc_core::sender::apply_failure_policy(&cache, &descriptor, e);
    }
    result?;

    println!(
        "Sent {}x{} frame to {:04x}:{:04x} (model {})",
        profile.width, profile.height, descriptor.vid, descriptor.pid, handshake.model_id
    );
    Ok(())
}
