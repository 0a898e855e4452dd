//! CLI subcommands — discovery, capability probing, frame sending, theme
//! archive inspection, and the HR10 daemon loop.

mod discover;
mod hr10;
mod probe;
mod send;
mod theme;

use clap::Subcommand;
use serde::Serialize;

pub(super) use crate::config::TrccConfig;
pub(super) use trcc_core::error::Result;
pub(super) use trcc_core::models::DeviceDescriptor;

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output. Ensures at
/// least PADDING spaces after the longest key in either level, with
/// top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{key:<width$}{value}", width = w);
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

/// Parse a `vid:pid` selector, e.g. `87cd:70db`.
pub(super) fn parse_vid_pid(s: &str) -> std::result::Result<(u16, u16), String> {
    let (v, p) = s
        .split_once(':')
        .ok_or_else(|| format!("expected vid:pid, got {s}"))?;
    let vid = u16::from_str_radix(v.trim_start_matches("0x"), 16)
        .map_err(|e| format!("bad vid {v}: {e}"))?;
    let pid = u16::from_str_radix(p.trim_start_matches("0x"), 16)
        .map_err(|e| format!("bad pid {p}: {e}"))?;
    Ok((vid, pid))
}

/// Find a discovered device matching an optional `vid:pid` selector. When no
/// selector is given and exactly one device is attached, that device is
/// used; otherwise the caller must disambiguate.
pub(super) fn select_device(selector: Option<&str>) -> Result<DeviceDescriptor> {
    let devices = trcc_core::discover::discover();
    let matches: Vec<_> = match selector {
        Some(s) => {
            let (vid, pid) = parse_vid_pid(s)
                .map_err(|e| trcc_core::error::CoreError::DeviceNotFound(e))?;
            devices.into_iter().filter(|d| d.vid == vid && d.pid == pid).collect()
        }
        None => devices,
    };
    match matches.len() {
        0 => Err(trcc_core::error::CoreError::DeviceNotFound(
            selector.unwrap_or("<any>").to_string(),
        )),
        1 => Ok(matches.into_iter().next().unwrap()),
        n => Err(trcc_core::error::CoreError::DeviceNotFound(format!(
            "{n} devices matched {}; pass --device vid:pid to disambiguate",
            selector.unwrap_or("<any>")
        ))),
    }
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct DiscoverOutput {
    pub count: usize,
    pub devices: Vec<DiscoveredJson>,
}

#[derive(Serialize)]
pub(super) struct DiscoveredJson {
    pub vid: String,
    pub pid: String,
    pub vendor: String,
    pub product: String,
    pub bus_path: String,
    pub transport: trcc_core::models::PixelTransport,
    pub family: trcc_core::models::ImplementationKey,
    pub scsi_node: Option<String>,
}

impl From<&DeviceDescriptor> for DiscoveredJson {
    fn from(d: &DeviceDescriptor) -> Self {
        Self {
            vid: format!("{:04x}", d.vid),
            pid: format!("{:04x}", d.pid),
            vendor: d.vendor_name.clone(),
            product: d.product_name.clone(),
            bus_path: d.bus_path.clone(),
            transport: d.pixel_transport,
            family: d.implementation_key,
            scsi_node: d.scsi_pass_through_node.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List USB devices physically attached and recognised by the registry
    Discover,

    /// List the static device registry (what the program could talk to)
    Devices,

    /// Open a device, run its handshake, and report capabilities
    Probe {
        /// vid:pid of the device to probe (omit if exactly one is attached)
        #[arg(long = "device")]
        device: Option<String>,
    },

    /// Send a solid colour or image frame to a device
    Send {
        #[arg(long = "device")]
        device: Option<String>,
        /// Solid colour to send (name or #RRGGBB), mutually exclusive with --image
        #[arg(long, conflicts_with = "image")]
        color: Option<String>,
        /// Path to an RGB888 raw file matching the panel's resolution exactly
        #[arg(long)]
        image: Option<String>,
    },

    /// Inspect or convert `Theme.zt` / `.tr` theme archive files
    Theme {
        #[command(subcommand)]
        action: theme::ThemeAction,
    },

    /// Run the HR10 LED temperature daemon
    Hr10 {
        #[command(subcommand)]
        action: hr10::Hr10Action,
    },
}

pub fn run(cmd: Command, json: bool) -> Result<()> {
    match cmd {
        Command::Discover => discover::cmd_discover(json),
        Command::Devices => discover::cmd_devices(json),
        Command::Probe { device } => probe::cmd_probe(device.as_deref(), json),
        Command::Send { device, color, image } => {
            send::cmd_send(device.as_deref(), color.as_deref(), image.as_deref())
        }
        Command::Theme { action } => theme::run(action, json),
        Command::Hr10 { action } => hr10::run(action),
    }
}
