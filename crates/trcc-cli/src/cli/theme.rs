//! `theme` subcommand — inspect `Theme.zt` animation containers and `.tr`
//! theme archives without touching hardware.

use clap::Subcommand;
use serde::Serialize;

use trcc_core::format::theme_zt::ThemeZt;
use trcc_core::format::tr_archive::{Background, TrArchive};

use super::Result;

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print Theme.zt frame count, sizes and derived per-frame delays
    InfoZt { path: String },
    /// Print .tr archive overlay/display-state summary
    InfoTr { path: String },
    /// Extract a .tr archive's background (static PNG or embedded Theme.zt) to a file
    ExtractBackground {
        path: String,
        /// Output path; for an animated background this writes a Theme.zt file
        out: String,
    },
}

#[derive(Serialize)]
struct ZtInfoJson {
    frame_count: usize,
    total_jpeg_bytes: usize,
    delays_ms: Vec<i32>,
}

#[derive(Serialize)]
struct TrInfoJson {
    show_system_info: bool,
    overlay_count: usize,
    has_mask: bool,
    background: &'static str,
    display_direction: i32,
    display_mode: i32,
}

fn cmd_info_zt(path: &str, json: bool) -> Result<()> {
    let bytes = std::fs::read(path)?;
    let theme = ThemeZt::from_bytes(&bytes)?;
    let delays = theme.delays();
    let total_jpeg_bytes: usize = theme.frames.iter().map(|f| f.jpeg.len()).sum();

    if json {
        let info = ZtInfoJson {
            frame_count: theme.frames.len(),
            total_jpeg_bytes,
            delays_ms: delays,
        };
        println!("{}", serde_json::to_string_pretty(&info).expect("serializable"));
        return Ok(());
    }

    println!("Frames:        {}", theme.frames.len());
    println!("Total JPEG:    {total_jpeg_bytes} bytes");
    println!("Delays (ms):   {delays:?}");
    Ok(())
}

fn cmd_info_tr(path: &str, json: bool) -> Result<()> {
    let bytes = std::fs::read(path)?;
    let archive = TrArchive::from_bytes(&bytes)?;
    let background_kind = match &archive.background {
        Background::None => "none",
        Background::Static(_) => "static",
        Background::Animated(_) => "animated",
    };

    if json {
        let info = TrInfoJson {
            show_system_info: archive.show_system_info,
            overlay_count: archive.overlays.len(),
            has_mask: archive.mask_image.is_some(),
            background: background_kind,
            display_direction: archive.display_state.direction,
            display_mode: archive.display_state.mode,
        };
        println!("{}", serde_json::to_string_pretty(&info).expect("serializable"));
        return Ok(());
    }

    println!("Show system info: {}", archive.show_system_info);
    println!("Overlays:         {}", archive.overlays.len());
    println!("Mask image:       {}", if archive.mask_image.is_some() { "present" } else { "none" });
    println!("Background:       {background_kind}");
    println!("Direction:        {}", archive.display_state.direction);
    println!("Mode:             {}", archive.display_state.mode);
    Ok(())
}

fn cmd_extract_background(path: &str, out: &str) -> Result<()> {
    let bytes = std::fs::read(path)?;
    let archive = TrArchive::from_bytes(&bytes)?;
    match archive.background {
        Background::None => {
            println!("Archive has no background.");
        }
        Background::Static(png) => {
            std::fs::write(out, png)?;
            println!("Wrote static background PNG to {out}");
        }
        Background::Animated(theme) => {
            let bytes = theme.to_bytes()?;
            std::fs::write(out, bytes)?;
            println!("Wrote embedded animation ({} frames) to {out}", theme.frames.len());
        }
    }
    Ok(())
}

pub(super) fn run(action: ThemeAction, json: bool) -> Result<()> {
    match action {
        ThemeAction::InfoZt { path } => cmd_info_zt(&path, json),
        ThemeAction::InfoTr { path } => cmd_info_tr(&path, json),
        ThemeAction::ExtractBackground { path, out } => cmd_extract_background(&path, &out),
    }
}
