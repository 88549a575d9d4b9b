//! Capture file writer.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{CaptureHeader, RecordHeader, FILE_HEADER_LEN, RECORD_HEADER_LEN};
use crate::error::{Error, Result};
use crate::structs::CapturePacket;

/// Serializes packets into a capture byte stream: the global header once,
/// then one record per packet in write order. Records are immutable once
/// flushed; there is no rollback, so a failure mid-stream leaves a
/// truncated file the caller must discard.
pub struct CaptureWriter<W: Write> {
    inner: W,
    header: CaptureHeader,
    bytes_written: u64,
    packets_written: u64,
}

impl CaptureWriter<BufWriter<std::fs::File>> {
    /// Create (or truncate) the destination file and write the global header.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CaptureWriter<W> {
    pub fn new(inner: W) -> Result<Self> {
        Self::with_header(inner, CaptureHeader::default())
    }

    pub fn with_header(mut inner: W, header: CaptureHeader) -> Result<Self> {
        inner.write_all(&header.to_bytes())?;
        Ok(CaptureWriter {
            inner,
            header,
            bytes_written: FILE_HEADER_LEN as u64,
            packets_written: 0,
        })
    }

    pub fn header(&self) -> &CaptureHeader {
        &self.header
    }

    /// Append one record. Captured and original length are both the
    /// payload's actual byte length; nothing is ever truncated here, so a
    /// payload above the snapshot ceiling is a caller error.
    pub fn write_packet(&mut self, packet: &CapturePacket) -> Result<()> {
        if packet.data.len() as u64 > self.header.snaplen as u64 {
            return Err(Error::InvalidParameter {
                name: "payload",
                reason: format!(
                    "{} bytes exceed the snapshot length {}",
                    packet.data.len(),
                    self.header.snaplen
                ),
            });
        }
        let record = RecordHeader {
            ts_sec: packet.timestamp.as_secs() as u32,
            ts_usec: packet.timestamp.subsec_micros(),
            caplen: packet.data.len() as u32,
            origlen: packet.data.len() as u32,
        };
        self.inner.write_all(&record.to_bytes())?;
        self.inner.write_all(&packet.data)?;
        self.bytes_written += (RECORD_HEADER_LEN + packet.data.len()) as u64;
        self.packets_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn packets_written(&self) -> u64 {
        self.packets_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Write an ordered packet sequence to a new capture file and return the
/// number of bytes written.
pub fn write_capture<P, I>(path: P, packets: I) -> Result<u64>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = CapturePacket>,
{
    let mut writer = CaptureWriter::create(path)?;
    for packet in packets {
        writer.write_packet(&packet)?;
    }
    writer.flush()?;
    Ok(writer.bytes_written())
}
