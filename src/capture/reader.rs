//! Capture file reader.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::time::Duration;

use super::{CaptureHeader, RecordHeader, FILE_HEADER_LEN, RECORD_HEADER_LEN};
use crate::error::{Error, Result};
use crate::structs::CapturePacket;

/// Lazy, single-pass reader over a capture stream. Records are decoded one
/// at a time, so arbitrarily large captures are processed with bounded
/// memory; stopping early performs no reads beyond what was consumed.
#[derive(Debug)]
pub struct CaptureReader<R: Read> {
    inner: R,
    header: CaptureHeader,
    /// Byte offset of the next unread byte
    offset: u64,
    records_read: u64,
}

impl CaptureReader<BufReader<File>> {
    /// Open a capture file for reading. Re-opening decodes from the start
    /// again.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read> CaptureReader<R> {
    /// Wrap a byte stream, reading and validating the global header.
    pub fn new(mut inner: R) -> Result<Self> {
        let mut buf = [0u8; FILE_HEADER_LEN];
        let filled = read_full(&mut inner, &mut buf)?;
        if filled < FILE_HEADER_LEN {
            return Err(Error::Format {
                offset: filled as u64,
                reason: "file too short for a capture header".to_string(),
            });
        }
        let header = CaptureHeader::parse(&buf)?;
        Ok(CaptureReader {
            inner,
            header,
            offset: FILE_HEADER_LEN as u64,
            records_read: 0,
        })
    }

    pub fn header(&self) -> &CaptureHeader {
        &self.header
    }

    /// Number of records decoded so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    pub fn byte_offset(&self) -> u64 {
        self.offset
    }

    /// Decode the next record. `Ok(None)` means the stream ended cleanly at
    /// a record boundary; running out of bytes inside a record is the
    /// corruption signal and yields a truncation error instead.
    pub fn next_packet(&mut self) -> Result<Option<CapturePacket>> {
        let mut head = [0u8; RECORD_HEADER_LEN];
        let filled = read_full(&mut self.inner, &mut head)?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < RECORD_HEADER_LEN {
            return Err(Error::Truncated {
                record: self.records_read + 1,
                offset: self.offset,
                expected: RECORD_HEADER_LEN,
                actual: filled,
            });
        }
        let record = RecordHeader::parse(&head);
        if record.caplen > self.header.snaplen {
            return Err(Error::Format {
                offset: self.offset,
                reason: format!(
                    "captured length {} exceeds the snapshot length {}",
                    record.caplen, self.header.snaplen
                ),
            });
        }
        if record.caplen > record.origlen {
            return Err(Error::Format {
                offset: self.offset,
                reason: format!(
                    "captured length {} exceeds the original length {}",
                    record.caplen, record.origlen
                ),
            });
        }
        if record.ts_usec >= 1_000_000 {
            return Err(Error::Format {
                offset: self.offset,
                reason: format!("microsecond field {} out of range", record.ts_usec),
            });
        }
        self.offset += RECORD_HEADER_LEN as u64;

        let mut data = vec![0u8; record.caplen as usize];
        let filled = read_full(&mut self.inner, &mut data)?;
        if filled < data.len() {
            return Err(Error::Truncated {
                record: self.records_read + 1,
                offset: self.offset,
                expected: data.len(),
                actual: filled,
            });
        }
        self.offset += data.len() as u64;
        self.records_read += 1;
        Ok(Some(CapturePacket {
            timestamp: Duration::new(record.ts_sec as u64, record.ts_usec * 1_000),
            data,
        }))
    }
}

impl<R: Read> Iterator for CaptureReader<R> {
    type Item = Result<CapturePacket>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_packet() {
            Ok(Some(packet)) => Some(Ok(packet)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Read until the buffer is full or the stream ends, reporting how many
/// bytes actually arrived.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
