//! Capability-probe diagnostics surface (§6): a per-device report combining
//! discovery output with handshake results, suitable for JSON rendering.

use serde::{Deserialize, Serialize};

use crate::models::{DeviceDescriptor, HandshakeResult, ImplementationKey, PixelTransport};

/// One discovered device's capability report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityReport {
    pub vid: u16,
    pub pid: u16,
    pub vendor: String,
    pub product: String,
    pub bus_path: String,
    pub transport: PixelTransport,
    pub family: ImplementationKey,
    pub handshake_ok: bool,
    pub resolution: Option<(u32, u32)>,
    pub model_id: u32,
    /// First 16 characters of the handshake serial, never the full value.
    pub serial_prefix_16: String,
}

impl CapabilityReport {
    pub fn from_descriptor(descriptor: &DeviceDescriptor) -> Self {
        Self {
            vid: descriptor.vid,
            pid: descriptor.pid,
            vendor: descriptor.vendor_name.clone(),
            product: descriptor.product_name.clone(),
            bus_path: descriptor.bus_path.clone(),
            transport: descriptor.pixel_transport,
            family: descriptor.implementation_key,
            handshake_ok: false,
            resolution: None,
            model_id: 0,
            serial_prefix_16: String::new(),
        }
    }

    pub fn with_handshake(mut self, result: &HandshakeResult) -> Self {
        self.handshake_ok = true;
        self.resolution = result.resolution;
        self.model_id = result.model_id;
        self.serial_prefix_16 = result.serial.chars().take(16).collect();
        self
    }
}

/// One entry in the static registry, for `devices --known` style
/// introspection (what the program *could* talk to, vs. `discover()`'s
/// "what is physically attached").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownDeviceEntry {
    pub vid: u16,
    pub pid: u16,
    pub vendor: String,
    pub product: String,
    pub transport: PixelTransport,
    pub family: ImplementationKey,
}

pub fn list_known_devices() -> Vec<KnownDeviceEntry> {
    crate::registry::KNOWN_DEVICES
        .iter()
        .map(|e| KnownDeviceEntry {
            vid: e.vid,
            pid: e.pid,
            vendor: e.vendor_name.to_string(),
            product: e.product_name.to_string(),
            transport: e.pixel_transport,
            family: e.implementation_key,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeviceDescriptor;

    #[test]
    fn serial_prefix_truncates_to_16() {
        let descriptor = DeviceDescriptor {
            vid: 0x87CD,
            pid: 0x70DB,
            bus_path: "1-1".into(),
            vendor_name: "v".into(),
            product_name: "p".into(),
            implementation_key: ImplementationKey::ScsiLcd,
            pixel_transport: PixelTransport::Scsi,
            device_family_id: 1,
            scsi_pass_through_node: None,
        };
        let result = HandshakeResult {
            resolution: Some((320, 320)),
            model_id: 5,
            serial: "ABCDEFGHIJKLMNOPQRSTUVWXYZ".into(),
            raw_response: vec![],
            sub_type: 0,
            use_jpeg: false,
            led_style: None,
        };
        let report = CapabilityReport::from_descriptor(&descriptor).with_handshake(&result);
        assert_eq!(report.serial_prefix_16.len(), 16);
        assert_eq!(report.serial_prefix_16, "ABCDEFGHIJKLMNOP");
    }

    #[test]
    fn known_devices_list_matches_registry_len() {
        assert_eq!(list_known_devices().len(), crate::registry::KNOWN_DEVICES.len());
    }
}
