//! USB Topology Scanner (L1): walks the system's USB bus and matches
//! devices against the static registry.

use crate::models::DeviceDescriptor;
use crate::registry;

/// Enumerate all USB devices on the host and match them against the static
/// registry. Unknown `(vid, pid)` pairs are discarded. Per-device errors are
/// logged and skipped — this never fails as a whole.
///
/// Ordering is stable and deterministic: sorted by `(bus_path, vid, pid)`.
pub fn discover() -> Vec<DeviceDescriptor> {
    let mut found = Vec::new();
    let devices = match nusb::list_devices() {
        Ok(iter) => iter,
        Err(e) => {
            log::warn!("usb enumeration failed: {e}");
            return found;
        }
    };

    for info in devices {
        let vid = info.vendor_id();
        let pid = info.product_id();
        let Some(entry) = registry::lookup(vid, pid) else {
            continue;
        };
        let bus_path = format!("usb:{:03}/{:03}", info.bus_number(), info.device_address());
        let scsi_pass_through_node = if entry.pixel_transport == crate::models::PixelTransport::Scsi
        {
            find_scsi_node(&bus_path)
        } else {
            None
        };
        found.push(DeviceDescriptor {
            vid,
            pid,
            bus_path,
            vendor_name: info
                .manufacturer_string()
                .unwrap_or(entry.vendor_name)
                .to_string(),
            product_name: info
                .product_string()
                .unwrap_or(entry.product_name)
                .to_string(),
            implementation_key: entry.implementation_key,
            pixel_transport: entry.pixel_transport,
            device_family_id: entry.device_family_id,
            scsi_pass_through_node,
        });
    }

    found.sort_by(|a, b| (&a.bus_path, a.vid, a.pid).cmp(&(&b.bus_path, b.vid, b.pid)));
    found
}

/// Best-effort lookup of the OS-level raw-SCSI pass-through node (e.g.
/// `/dev/sgN` on Linux) associated with a physical USB port. A device whose
/// family requires this node but lacks one is filtered out by the sender
/// factory, not here.
fn find_scsi_node(bus_path: &str) -> Option<String> {
    let sys_root = std::path::Path::new("/sys/class/scsi_generic");
    let entries = std::fs::read_dir(sys_root).ok()?;
    for entry in entries.flatten() {
        let link = std::fs::read_link(entry.path()).ok()?;
        let link_str = link.to_string_lossy();
        if bus_device_matches(&link_str, bus_path) {
            return Some(format!("/dev/{}", entry.file_name().to_string_lossy()));
        }
    }
    None
}

fn bus_device_matches(sysfs_link: &str, bus_path: &str) -> bool {
    // bus_path is "usb:BBB/DDD"; sysfs links embed "B-D" style topology
    // segments. A loose substring match is sufficient here: exact udev
    // topology parsing is an OS-specific concern this function isolates.
    let Some((bus, dev)) = bus_path.strip_prefix("usb:").and_then(|s| s.split_once('/')) else {
        return false;
    };
    sysfs_link.contains(&format!("usb{}", bus.trim_start_matches('0').to_string()))
        || sysfs_link.contains(dev)
}
