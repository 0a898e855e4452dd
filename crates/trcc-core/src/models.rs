//! Shared data types flowing between layers: discovery output, handshake
//! results, derived panel profiles, chunk plans, and LED form factors.

/// Which wire transport a `(vid, pid)` pair is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelTransport {
    Scsi,
    Hid,
    Bulk,
    LedHid,
}

/// Which protocol handler interprets handshake bytes and frames for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationKey {
    ScsiLcd,
    HidLcd,
    BulkLcd,
    LedHid,
}

/// Pixel encoding a `PanelProfile` asks the pixel pipeline for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb565Be,
    Rgb565Le,
    Jpeg,
    LedSegments,
}

/// What L1 discovery emits for each matched USB device.
///
/// `pixel_transport` and `implementation_key` are fully determined by
/// `(vid, pid)` via the static registry — never set independently of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub vid: u16,
    pub pid: u16,
    /// Opaque string uniquely naming the physical USB port.
    pub bus_path: String,
    pub vendor_name: String,
    pub product_name: String,
    pub implementation_key: ImplementationKey,
    pub pixel_transport: PixelTransport,
    pub device_family_id: u8,
    /// OS path to the raw-SCSI pass-through node, only populated for SCSI
    /// family devices, and only when discovery could locate it.
    pub scsi_pass_through_node: Option<String>,
}

impl DeviceDescriptor {
    /// Canonical cache key: lowercase hex vid:pid followed by the bus path.
    pub fn cache_key(&self) -> String {
        format!("{:04x}:{:04x}@{}", self.vid, self.pid, self.bus_path)
    }
}

/// What a successful protocol handshake yields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HandshakeResult {
    pub resolution: Option<(u32, u32)>,
    /// The PM byte, or family id for protocols without a PM byte.
    pub model_id: u32,
    pub serial: String,
    pub raw_response: Vec<u8>,
    pub sub_type: u8,
    pub use_jpeg: bool,
    pub led_style: Option<&'static LedDeviceStyle>,
}

/// One segment of a chunked frame write: a device command word and the
/// number of payload bytes it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSegment {
    pub chunk_cmd: u32,
    pub byte_length: usize,
}

/// Ordered partition of one frame into device-legal command bursts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkPlan(pub Vec<ChunkSegment>);

impl ChunkPlan {
    pub fn total_len(&self) -> usize {
        self.0.iter().map(|s| s.byte_length).sum()
    }
}

/// Derived, per-device rendering contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelProfile {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub bytes_per_pixel: u32,
    pub chunk_plan: ChunkPlan,
}

impl PanelProfile {
    /// Default profile used by SCSI LCD devices before a real FBL probe has
    /// run: 320x320, RGB565, partitioned into the 4-chunk SCSI plan.
    pub fn default_scsi_lcd() -> Self {
        crate::protocol::scsi_lcd::profile_for(320, 320)
    }
}

/// One of the 12 enumerated cooler LED form factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedDeviceStyle {
    pub name: &'static str,
    pub led_count: u16,
    pub segment_count: u8,
    pub model_pm: u8,
}

/// In-flight frame unit passed from the pixel pipeline to a transport.
/// Constructed per caller frame, consumed once, never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameJob {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
}
