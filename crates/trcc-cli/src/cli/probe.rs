//! `probe` subcommand — open a device, run its handshake, report capabilities.

use trcc_core::diagnostics::CapabilityReport;
use trcc_core::sender::SenderCache;

use super::{Result, kv, kv_indent, kv_width, select_device};

pub(super) fn cmd_probe(device: Option<&str>, json: bool) -> Result<()> {
    let descriptor = select_device(device)?;
    let cache = SenderCache::new();
    let sender = cache.get_sender(&descriptor)?;

    let mut report = CapabilityReport::from_descriptor(&descriptor);
    let handshake_result = {
        let mut guard = sender.lock().expect("sender mutex poisoned");
        let result = guard.handshake();
        if let Err(e) = &result {
            trcc_core::sender::apply_failure_policy(&cache, &descriptor, e);
        }
        result
    };

    match handshake_result {
        Ok(h) => report = report.with_handshake(&h),
        Err(e) => {
            log::warn!("handshake failed for {:04x}:{:04x}: {e}", descriptor.vid, descriptor.pid);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report).expect("serializable"));
        return Ok(());
    }

    let w = kv_width(
        &["Device:"],
        &["Vendor:", "Product:", "Transport:", "Handshake:", "Resolution:", "Model:", "Serial:"],
    );
    kv("Device:", format!("{:04x}:{:04x}", report.vid, report.pid), w);
    kv_indent("Vendor:", &report.vendor, w);
    kv_indent("Product:", &report.product, w);
    kv_indent("Transport:", format!("{:?}", report.transport), w);
    kv_indent("Handshake:", if report.handshake_ok { "OK" } else { "FAILED" }, w);
    if report.handshake_ok {
        match report.resolution {
            Some((w_, h_)) => kv_indent("Resolution:", format!("{w_}x{h_}"), w),
            None => kv_indent("Resolution:", "unknown", w),
        }
        kv_indent("Model:", report.model_id, w);
        kv_indent("Serial:", &report.serial_prefix_16, w);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_unknown_device_is_not_found() {
        let result = cmd_probe(Some("ffff:ffff"), false);
        assert!(result.is_err());
    }
}
