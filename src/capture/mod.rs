//! The capture container format: one fixed global header followed by a
//! sequence of length-prefixed packet records. The byte layout is the
//! classic little-endian microsecond pcap layout, so the generated files
//! open in standard capture tooling.

mod reader;
mod writer;

pub use reader::CaptureReader;
pub use writer::{write_capture, CaptureWriter};

use crate::error::{Error, Result};

/// Magic number of a little-endian capture with microsecond timestamps.
pub const MAGIC: u32 = 0xa1b2_c3d4;
/// The same magic read from a big-endian file.
const MAGIC_SWAPPED: u32 = 0xd4c3_b2a1;
/// Magic of the nanosecond-timestamp variant, little and big endian.
const MAGIC_NANOS: u32 = 0xa1b2_3c4d;
const MAGIC_NANOS_SWAPPED: u32 = 0x4d3c_b2a1;

pub const VERSION_MAJOR: u16 = 2;
pub const VERSION_MINOR: u16 = 4;

/// Default snapshot length ceiling, well above the largest synthetic payload.
pub const DEFAULT_SNAPLEN: u32 = 65_535;
/// Link-layer type stamped into the global header.
pub const LINKTYPE_ETHERNET: u32 = 1;

pub const FILE_HEADER_LEN: usize = 24;
pub const RECORD_HEADER_LEN: usize = 16;

/// The global header written once at the start of every capture file.
/// Identical for all records in one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureHeader {
    /// Timezone correction in seconds
    pub thiszone: i32,
    /// Timestamp accuracy, in practice always zero
    pub sigfigs: u32,
    /// Maximum captured length permitted per record
    pub snaplen: u32,
    /// Link-layer type of the payloads
    pub linktype: u32,
}

impl Default for CaptureHeader {
    fn default() -> Self {
        CaptureHeader {
            thiszone: 0,
            sigfigs: 0,
            snaplen: DEFAULT_SNAPLEN,
            linktype: LINKTYPE_ETHERNET,
        }
    }
}

impl CaptureHeader {
    pub fn to_bytes(&self) -> [u8; FILE_HEADER_LEN] {
        let mut buf = [0u8; FILE_HEADER_LEN];
        buf[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        buf[4..6].copy_from_slice(&VERSION_MAJOR.to_le_bytes());
        buf[6..8].copy_from_slice(&VERSION_MINOR.to_le_bytes());
        buf[8..12].copy_from_slice(&self.thiszone.to_le_bytes());
        buf[12..16].copy_from_slice(&self.sigfigs.to_le_bytes());
        buf[16..20].copy_from_slice(&self.snaplen.to_le_bytes());
        buf[20..24].copy_from_slice(&self.linktype.to_le_bytes());
        buf
    }

    pub fn parse(buf: &[u8; FILE_HEADER_LEN]) -> Result<Self> {
        let magic = u32_le(buf, 0);
        match magic {
            MAGIC => {}
            MAGIC_SWAPPED | MAGIC_NANOS | MAGIC_NANOS_SWAPPED => {
                return Err(Error::Format {
                    offset: 0,
                    reason: format!(
                        "unsupported capture variant {magic:#010x} (big-endian or nanosecond timestamps)"
                    ),
                });
            }
            _ => {
                return Err(Error::Format {
                    offset: 0,
                    reason: format!("unrecognized magic number {magic:#010x}"),
                });
            }
        }
        let version_major = u16_le(buf, 4);
        let version_minor = u16_le(buf, 6);
        if version_major != VERSION_MAJOR {
            return Err(Error::Format {
                offset: 4,
                reason: format!("unsupported format version {version_major}.{version_minor}"),
            });
        }
        Ok(CaptureHeader {
            thiszone: i32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
            sigfigs: u32_le(buf, 12),
            snaplen: u32_le(buf, 16),
            linktype: u32_le(buf, 20),
        })
    }
}

/// The fixed header preceding each record's payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub ts_sec: u32,
    pub ts_usec: u32,
    /// Number of payload bytes actually stored in the file
    pub caplen: u32,
    /// Length of the packet as captured, never less than `caplen`
    pub origlen: u32,
}

impl RecordHeader {
    pub fn to_bytes(&self) -> [u8; RECORD_HEADER_LEN] {
        let mut buf = [0u8; RECORD_HEADER_LEN];
        buf[0..4].copy_from_slice(&self.ts_sec.to_le_bytes());
        buf[4..8].copy_from_slice(&self.ts_usec.to_le_bytes());
        buf[8..12].copy_from_slice(&self.caplen.to_le_bytes());
        buf[12..16].copy_from_slice(&self.origlen.to_le_bytes());
        buf
    }

    pub fn parse(buf: &[u8; RECORD_HEADER_LEN]) -> Self {
        RecordHeader {
            ts_sec: u32_le(buf, 0),
            ts_usec: u32_le(buf, 4),
            caplen: u32_le(buf, 8),
            origlen: u32_le(buf, 12),
        }
    }
}

fn u32_le(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn u16_le(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let header = CaptureHeader {
            thiszone: -3600,
            sigfigs: 0,
            snaplen: 4096,
            linktype: LINKTYPE_ETHERNET,
        };
        let parsed = CaptureHeader::parse(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn header_reference_layout() {
        // reference sample: the canonical little-endian byte sequence
        let bytes = CaptureHeader::default().to_bytes();
        assert_eq!(&bytes[0..4], &[0xd4, 0xc3, 0xb2, 0xa1]);
        assert_eq!(&bytes[4..8], &[0x02, 0x00, 0x04, 0x00]);
        assert_eq!(&bytes[8..12], &[0x00, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[12..16], &[0x00, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[16..20], &[0xff, 0xff, 0x00, 0x00]);
        assert_eq!(&bytes[20..24], &[0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn rejects_foreign_magics() {
        let mut bytes = CaptureHeader::default().to_bytes();
        bytes[0..4].copy_from_slice(&[0xa1, 0xb2, 0xc3, 0xd4]); // big endian on disk
        assert!(CaptureHeader::parse(&bytes).is_err());
        bytes[0..4].copy_from_slice(&[0x4d, 0x3c, 0xb2, 0xa1]); // nanosecond variant
        assert!(CaptureHeader::parse(&bytes).is_err());
        bytes[0..4].copy_from_slice(&[0x00, 0x11, 0x22, 0x33]); // garbage
        assert!(CaptureHeader::parse(&bytes).is_err());
    }

    #[test]
    fn rejects_unknown_version() {
        let mut bytes = CaptureHeader::default().to_bytes();
        bytes[4] = 3;
        assert!(CaptureHeader::parse(&bytes).is_err());
    }

    #[test]
    fn record_header_round_trip() {
        let record = RecordHeader {
            ts_sec: 1_700_000_000,
            ts_usec: 123_456,
            caplen: 512,
            origlen: 512,
        };
        assert_eq!(RecordHeader::parse(&record.to_bytes()), record);
    }
}
