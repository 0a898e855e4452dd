//! SCSI-over-USB transport: stateless, one command = one pass-through call.
//!
//! Every operation shells out to an external raw-SCSI executor (historically
//! `sg_raw` on Linux). Abstracted behind [`ScsiExecutor`] so other OSes or a
//! native ioctl path can substitute without touching the protocol handler.

use crate::error::{CoreError, DeviceContext, Result};
use std::process::Command;

/// Fixed 20-byte SCSI command packet layout (little-endian):
/// `[cmd:u32][8 zero bytes][size:u32][crc32_ieee(header[0..16]):u32]`.
pub const HEADER_LEN: usize = 20;

/// IEEE CRC-32 (equivalent to `binascii.crc32`/`zlib.crc32`).
pub fn crc32_ieee(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

/// Build the 20-byte SCSI command header for `cmd`/`size`.
pub fn build_command_header(cmd: u32, size: u32) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[0..4].copy_from_slice(&cmd.to_le_bytes());
    // offset 4..12 stays zero
    header[12..16].copy_from_slice(&size.to_le_bytes());
    let crc = crc32_ieee(&header[0..16]);
    header[16..20].copy_from_slice(&crc.to_le_bytes());
    header
}

/// Abstracts the external raw-SCSI pass-through binary so the transport is
/// swappable and mockable.
pub trait ScsiExecutor {
    fn read(&self, node: &str, header: &[u8; HEADER_LEN], read_len: usize) -> Result<Vec<u8>>;
    fn write(&self, node: &str, header: &[u8; HEADER_LEN], data: &[u8]) -> Result<()>;
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Shells out to `sg_raw` (or an overridden binary path), the historical
/// Linux raw-SCSI pass-through executor.
pub struct SgRawExecutor {
    pub binary: String,
}

impl Default for SgRawExecutor {
    fn default() -> Self {
        Self {
            binary: "sg_raw".to_string(),
        }
    }
}

impl ScsiExecutor for SgRawExecutor {
    fn read(&self, node: &str, header: &[u8; HEADER_LEN], read_len: usize) -> Result<Vec<u8>> {
        let out = Command::new(&self.binary)
            .arg("-r")
            .arg(format!("{read_len:x}"))
            .arg("-v")
            .arg(node)
            .arg(to_hex(header))
            .output()
            .map_err(|e| {
                CoreError::TransportOpenFailed(
                    DeviceContext::default(),
                    format!("spawning {}: {e}", self.binary),
                )
            })?;
        if !out.status.success() {
            return Err(CoreError::WireIoTimeout(
                DeviceContext::default(),
                format!("{} exited with {:?}", self.binary, out.status.code()),
            ));
        }
        Ok(out.stdout)
    }

    fn write(&self, node: &str, header: &[u8; HEADER_LEN], data: &[u8]) -> Result<()> {
        let status = Command::new(&self.binary)
            .arg("-v")
            .arg(node)
            .arg(to_hex(header))
            .arg(to_hex(data))
            .status()
            .map_err(|e| {
                CoreError::TransportOpenFailed(
                    DeviceContext::default(),
                    format!("spawning {}: {e}", self.binary),
                )
            })?;
        if !status.success() {
            return Err(CoreError::WireIoTimeout(
                DeviceContext::default(),
                format!("{} exited with {:?}", self.binary, status.code()),
            ));
        }
        Ok(())
    }
}

/// Stateless SCSI transport handle. There is no open session: `close()` is
/// a no-op, matching the spec's "every operation is stateless" rule.
pub struct ScsiTransport<E: ScsiExecutor> {
    pub node: String,
    pub executor: E,
}

impl<E: ScsiExecutor> ScsiTransport<E> {
    pub fn new(node: String, executor: E) -> Self {
        Self { node, executor }
    }

    pub fn send_command(&self, cmd: u32, data: &[u8], padded_len: u32) -> Result<()> {
        let header = build_command_header(cmd, padded_len);
        let mut payload = data.to_vec();
        payload.resize(padded_len as usize, 0);
        self.executor.write(&self.node, &header, &payload)
    }

    pub fn read_command(&self, cmd: u32, read_len: usize) -> Result<Vec<u8>> {
        let header = build_command_header(cmd, read_len as u32);
        self.executor.read(&self.node, &header, read_len)
    }

    /// No-op: SCSI pass-through has no persistent session to tear down.
    pub fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::cell::RefCell;

    /// Records every read/write call for serialisation and ordering tests.
    #[derive(Default)]
    pub struct MockExecutor {
        pub calls: RefCell<Vec<String>>,
        pub read_reply: RefCell<Vec<u8>>,
        pub fail_next_write: RefCell<bool>,
    }

    impl ScsiExecutor for MockExecutor {
        fn read(&self, node: &str, header: &[u8; HEADER_LEN], read_len: usize) -> Result<Vec<u8>> {
            self.calls
                .borrow_mut()
                .push(format!("read {node} {read_len} cmd={:08x}", u32::from_le_bytes(header[0..4].try_into().unwrap())));
            Ok(self.read_reply.borrow().clone())
        }

        fn write(&self, node: &str, header: &[u8; HEADER_LEN], data: &[u8]) -> Result<()> {
            self.calls.borrow_mut().push(format!(
                "write {node} {} cmd={:08x}",
                data.len(),
                u32::from_le_bytes(header[0..4].try_into().unwrap())
            ));
            if *self.fail_next_write.borrow() {
                *self.fail_next_write.borrow_mut() = false;
                return Err(CoreError::ProtocolError(
                    DeviceContext::default(),
                    "mock write failure".into(),
                ));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout_and_crc() {
        for (cmd, size) in [(0x0000_00F5u32, 0xE100u32), (0x1015, 65536), (0, 0)] {
            let header = build_command_header(cmd, size);
            assert_eq!(header.len(), HEADER_LEN);
            assert_eq!(u32::from_le_bytes(header[0..4].try_into().unwrap()), cmd);
            assert_eq!(&header[4..12], &[0u8; 8]);
            assert_eq!(u32::from_le_bytes(header[12..16].try_into().unwrap()), size);
            let crc = u32::from_le_bytes(header[16..20].try_into().unwrap());
            assert_eq!(crc, crc32_ieee(&header[0..16]));
        }
    }

    #[test]
    fn crc_matches_ieee_crc32() {
        // Known IEEE CRC-32 of the ASCII string "123456789" is 0xCBF43926.
        assert_eq!(crc32_ieee(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn send_command_pads_to_declared_length() {
        let exec = mock::MockExecutor::default();
        let transport = ScsiTransport::new("/dev/sg0".into(), exec);
        transport.send_command(0x1015, &[1, 2, 3], 10).unwrap();
        let calls = transport.executor.calls.borrow();
        assert_eq!(calls[0], "write /dev/sg0 10 cmd=00001015");
    }

    #[test]
    fn close_is_a_no_op() {
        let exec = mock::MockExecutor::default();
        let mut transport = ScsiTransport::new("/dev/sg0".into(), exec);
        assert!(transport.close().is_ok());
        assert!(transport.executor.calls.borrow().is_empty());
    }
}
