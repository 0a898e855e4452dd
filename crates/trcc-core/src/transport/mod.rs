//! Transport Adapters (L2): uniform `open/write/read/close` operations over
//! four concrete mechanisms (SCSI pass-through, HID, raw bulk, LED HID).
//!
//! All transports must guarantee resources are released on every
//! control-flow exit (success, failure, drop); kernel-driver detachment is
//! attempted silently and is never raised as fatal.

pub mod bulk;
pub mod hid;
pub mod led_hid;
pub mod scsi;

use crate::error::Result;

/// Default timeout for handshake operations, shared by every transport.
pub const HANDSHAKE_TIMEOUT_MS: u64 = 1000;
/// Default timeout for steady-state frame I/O.
pub const FRAME_IO_TIMEOUT_MS: u64 = 5000;
/// Maximum bytes a single device command may carry (hardware constraint
/// shared by every chunked transport).
pub const MAX_CHUNK_LEN: usize = 64 * 1024;

/// The capability set every concrete transport satisfies. Kept as a trait
/// purely to document the shared shape — call sites hold the concrete
/// transport, not a trait object, per the one-way ownership design (senders
/// own transports; transports never reach back into the sender).
pub trait Transport {
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
    fn read(&mut self, len: usize) -> Result<Vec<u8>>;
    fn close(&mut self) -> Result<()>;
}
