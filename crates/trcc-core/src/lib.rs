//! trcc-core — userspace device I/O core for Thermalright/ALi Corp/Winbond
//! cooler LCD and LED peripherals.
//!
//! Layered roughly bottom-up: [`transport`] speaks raw USB (SCSI pass-through,
//! HID/bulk, LED HID); [`protocol`] builds handshake and frame wire formats on
//! top of a transport; [`sender`] owns the cache of live device connections;
//! [`pixel`] and [`color`] turn application-level images/colours into wire
//! bytes; [`format`] reads and writes the on-disk theme/animation formats;
//! [`hr10`] is the temperature-reactive LED daemon; [`discover`] and
//! [`registry`] find and identify attached devices; [`diagnostics`] renders
//! all of the above into a serializable capability report.

pub mod color;
pub mod diagnostics;
pub mod discover;
pub mod error;
pub mod format;
pub mod hr10;
pub mod models;
pub mod pixel;
pub mod protocol;
pub mod reconnect;
pub mod registry;
pub mod sender;
pub mod transport;

pub use error::{CoreError, Result};
