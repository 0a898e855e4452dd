//! Process-wide immutable device and LED-style tables.
//!
//! `KNOWN_DEVICES` is the contract between discovery and every later layer:
//! a rewrite of this table must preserve every recognised `(vid, pid)` pair
//! and its `(implementation_key, pixel_transport, device_family_id)` triple.

use crate::models::{ImplementationKey, LedDeviceStyle, PixelTransport};

/// One static registry entry.
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    pub vid: u16,
    pub pid: u16,
    pub vendor_name: &'static str,
    pub product_name: &'static str,
    pub implementation_key: ImplementationKey,
    pub pixel_transport: PixelTransport,
    pub device_family_id: u8,
}

/// The static `(vid, pid) -> {...}` registry. Unknown pairs are dropped by
/// discovery; known pairs fully determine transport and protocol.
pub static KNOWN_DEVICES: &[RegistryEntry] = &[
    RegistryEntry {
        vid: 0x87CD,
        pid: 0x70DB,
        vendor_name: "Thermalright",
        product_name: "LCD Panel",
        implementation_key: ImplementationKey::ScsiLcd,
        pixel_transport: PixelTransport::Scsi,
        device_family_id: 1,
    },
    RegistryEntry {
        vid: 0x0416,
        pid: 0x5406,
        vendor_name: "Winbond",
        product_name: "SCSI LCD",
        implementation_key: ImplementationKey::ScsiLcd,
        pixel_transport: PixelTransport::Scsi,
        device_family_id: 1,
    },
    RegistryEntry {
        vid: 0x0402,
        pid: 0x3922,
        vendor_name: "ALi Corp",
        product_name: "SCSI LCD",
        implementation_key: ImplementationKey::ScsiLcd,
        pixel_transport: PixelTransport::Scsi,
        device_family_id: 1,
    },
    RegistryEntry {
        vid: 0x0416,
        pid: 0x530A,
        vendor_name: "Winbond",
        product_name: "HID LCD",
        implementation_key: ImplementationKey::HidLcd,
        pixel_transport: PixelTransport::Hid,
        device_family_id: 2,
    },
    RegistryEntry {
        vid: 0x0416,
        pid: 0x53E6,
        vendor_name: "Winbond",
        product_name: "HID LCD",
        implementation_key: ImplementationKey::HidLcd,
        pixel_transport: PixelTransport::Hid,
        device_family_id: 2,
    },
    RegistryEntry {
        vid: 0x87AD,
        pid: 0x70DB,
        vendor_name: "Thermalright",
        product_name: "Bulk LCD",
        implementation_key: ImplementationKey::BulkLcd,
        pixel_transport: PixelTransport::Bulk,
        device_family_id: 3,
    },
    RegistryEntry {
        vid: 0x0416,
        pid: 0x8001,
        vendor_name: "Winbond",
        product_name: "LED Controller",
        implementation_key: ImplementationKey::LedHid,
        pixel_transport: PixelTransport::LedHid,
        device_family_id: 4,
    },
];

/// Look up a registry entry by `(vid, pid)`.
pub fn lookup(vid: u16, pid: u16) -> Option<&'static RegistryEntry> {
    KNOWN_DEVICES
        .iter()
        .find(|e| e.vid == vid && e.pid == pid)
}

/// The 12 enumerated cooler LED form factors, selected by PM during the LED
/// HID handshake.
pub static LED_STYLES: &[LedDeviceStyle] = &[
    LedDeviceStyle { name: "ring-12", led_count: 12, segment_count: 1, model_pm: 1 },
    LedDeviceStyle { name: "ring-16", led_count: 16, segment_count: 1, model_pm: 2 },
    LedDeviceStyle { name: "ring-24", led_count: 24, segment_count: 1, model_pm: 3 },
    LedDeviceStyle { name: "dual-ring-12", led_count: 24, segment_count: 2, model_pm: 4 },
    LedDeviceStyle { name: "dual-ring-16", led_count: 32, segment_count: 2, model_pm: 5 },
    LedDeviceStyle { name: "fan-frame-8", led_count: 8, segment_count: 1, model_pm: 6 },
    LedDeviceStyle { name: "fan-frame-12", led_count: 12, segment_count: 1, model_pm: 7 },
    LedDeviceStyle { name: "bar-7seg", led_count: 7, segment_count: 7, model_pm: 8 },
    LedDeviceStyle { name: "bar-14seg", led_count: 14, segment_count: 7, model_pm: 9 },
    LedDeviceStyle { name: "strip-20", led_count: 20, segment_count: 1, model_pm: 10 },
    LedDeviceStyle { name: "strip-40", led_count: 40, segment_count: 1, model_pm: 11 },
    LedDeviceStyle { name: "quad-fan-48", led_count: 48, segment_count: 4, model_pm: 12 },
];

/// Look up an LED style by its PM byte.
pub fn led_style_for_pm(pm: u8) -> Option<&'static LedDeviceStyle> {
    LED_STYLES.iter().find(|s| s.model_pm == pm)
}
