//! LED colour parsing and formatting.
//!
//! Colours are represented in the standard `0x00RRGGBB` packing used by
//! [`crate::pixel::led_segments`] (little-endian on the wire: blue, green,
//! red, zero).

use crate::error::CoreError;

/// Parse a colour string into `0x00RRGGBB`.
///
/// Accepts named colours (`red`, `green`, `blue`, `white`, `orange`,
/// `yellow`, `purple`, `cyan`, `off`/`black`) or `#RRGGBB` / `RRGGBB` hex.
pub fn parse_color(s: &str) -> crate::error::Result<u32> {
    let s = s.trim();

    match s.to_lowercase().as_str() {
        "red" => return Ok(0x00FF_0000),
        "green" => return Ok(0x0000_FF00),
        "blue" => return Ok(0x0000_00FF),
        "white" => return Ok(0x00FF_FFFF),
        "orange" => return Ok(0x00FF_8000),
        "yellow" => return Ok(0x00FF_FF00),
        "purple" => return Ok(0x0080_00FF),
        "cyan" => return Ok(0x0000_FFFF),
        "off" | "black" => return Ok(0x0000_0000),
        _ => {}
    }

    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 {
        return Err(CoreError::ProtocolError(
            Default::default(),
            format!("invalid colour: {s} (use #RRGGBB or a colour name)"),
        ));
    }
    let val = u32::from_str_radix(hex, 16).map_err(|_| {
        CoreError::ProtocolError(Default::default(), format!("invalid hex colour: {s}"))
    })?;
    Ok(val)
}

/// Format a `0x00RRGGBB` colour as `#RRGGBB`.
pub fn format_color(val: u32) -> String {
    format!("#{:06X}", val & 0x00FF_FFFF)
}
