//! Crate-level error type aggregating every module's failure modes.

use std::fmt;

/// Identifies the physical device a failure occurred against, when known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceContext {
    pub vid: u16,
    pub pid: u16,
    pub bus_path: String,
}

impl fmt::Display for DeviceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}@{}", self.vid, self.pid, self.bus_path)
    }
}

impl DeviceContext {
    pub fn new(vid: u16, pid: u16, bus_path: impl Into<String>) -> Self {
        Self {
            vid,
            pid,
            bus_path: bus_path.into(),
        }
    }
}

/// Crate-wide error taxonomy. Mirrors the design's error handling section:
/// each variant carries a stable machine-readable tag (via `Display`) and,
/// where applicable, the `(vid, pid, bus_path)` of the device involved.
#[derive(Debug)]
pub enum CoreError {
    /// Discovery saw zero matches for the requested selector.
    DeviceNotFound(String),
    /// OS rejected `open` / interface claim / endpoint lookup.
    TransportOpenFailed(DeviceContext, String),
    /// Device responded with insufficient or zero-PM bytes.
    HandshakeFailed(DeviceContext, String),
    /// A transport operation exceeded its deadline.
    WireIoTimeout(DeviceContext, String),
    /// Frame shape contradicts the panel profile.
    ProtocolError(DeviceContext, String),
    /// `.tr` header mismatch, `Theme.zt` magic mismatch, unexpected EOF.
    FormatError(String),
    /// `(vid, pid)` not in the static registry.
    UnsupportedDevice(u16, u16),
    /// Underlying filesystem / process I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::DeviceNotFound(sel) => write!(f, "device_not_found: no match for {sel}"),
            CoreError::TransportOpenFailed(ctx, msg) => {
                write!(f, "transport_open_failed: {ctx}: {msg}")
            }
            CoreError::HandshakeFailed(ctx, msg) => write!(f, "handshake_failed: {ctx}: {msg}"),
            CoreError::WireIoTimeout(ctx, msg) => write!(f, "wire_io_timeout: {ctx}: {msg}"),
            CoreError::ProtocolError(ctx, msg) => write!(f, "protocol_error: {ctx}: {msg}"),
            CoreError::FormatError(msg) => write!(f, "format_error: {msg}"),
            CoreError::UnsupportedDevice(vid, pid) => {
                write!(f, "unsupported_device: {vid:04x}:{pid:04x}")
            }
            CoreError::Io(e) => write!(f, "io_error: {e}"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Io(e)
    }
}

/// Whether a failure is transient (frame-scoped, sender survives) or should
/// evict the sender from the cache, per the protocol handlers' failure table
/// and the error taxonomy's propagation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Transient,
    EvictSender,
    Fatal,
}

impl CoreError {
    pub fn failure_class(&self) -> FailureClass {
        match self {
            CoreError::WireIoTimeout(..) | CoreError::ProtocolError(..) => FailureClass::Transient,
            CoreError::TransportOpenFailed(..) | CoreError::HandshakeFailed(..) => {
                FailureClass::EvictSender
            }
            CoreError::FormatError(..)
            | CoreError::DeviceNotFound(..)
            | CoreError::UnsupportedDevice(..)
            | CoreError::Io(..) => FailureClass::Fatal,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let ctx = DeviceContext::new(0x87cd, 0x70db, "1-3.2");
        let e = CoreError::HandshakeFailed(ctx, "short response".into());
        let s = e.to_string();
        assert!(s.contains("87cd:70db"));
        assert!(s.contains("1-3.2"));
        assert!(s.contains("short response"));
    }

    #[test]
    fn failure_classes() {
        let ctx = DeviceContext::default();
        assert_eq!(
            CoreError::WireIoTimeout(ctx.clone(), "x".into()).failure_class(),
            FailureClass::Transient
        );
        assert_eq!(
            CoreError::ProtocolError(ctx.clone(), "x".into()).failure_class(),
            FailureClass::Transient
        );
        assert_eq!(
            CoreError::TransportOpenFailed(ctx.clone(), "x".into()).failure_class(),
            FailureClass::EvictSender
        );
        assert_eq!(
            CoreError::HandshakeFailed(ctx, "x".into()).failure_class(),
            FailureClass::EvictSender
        );
        assert_eq!(
            CoreError::FormatError("x".into()).failure_class(),
            FailureClass::Fatal
        );
    }

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: CoreError = io.into();
        assert!(matches!(e, CoreError::Io(_)));
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn question_mark_propagation() {
        fn inner() -> Result<()> {
            let _ = std::fs::read("/nonexistent/path/for/trcc/tests")?;
            Ok(())
        }
        assert!(inner().is_err());
    }
}
