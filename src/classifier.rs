//! Stream classification: replay a capture file and recover the intended
//! per-consumer packet distribution from the payloads' leading tag bytes.

use std::io::Read;
use std::path::Path;

use crate::capture::CaptureReader;
use crate::error::{Error, Result};
use crate::structs::{ConsumerTally, TagAlphabet};

/// Classify every record of a capture file.
pub fn classify_file<P: AsRef<Path>>(path: P, alphabet: TagAlphabet) -> Result<ConsumerTally> {
    let mut reader = CaptureReader::open(path)?;
    classify(&mut reader, alphabet)
}

/// Drive a reader to completion and tally records by their leading tag
/// byte. The whole stream is consumed; an out-of-alphabet byte aborts the
/// run rather than being bucketed somewhere misleading.
pub fn classify<R: Read>(reader: &mut CaptureReader<R>, alphabet: TagAlphabet) -> Result<ConsumerTally> {
    let mut tally = ConsumerTally::new(alphabet);
    while let Some(packet) = reader.next_packet()? {
        let record = reader.records_read();
        let lead = match packet.data.first() {
            Some(&byte) => byte,
            None => {
                return Err(Error::Format {
                    offset: reader.byte_offset(),
                    reason: format!("record {record} is empty and has no consumer tag"),
                });
            }
        };
        match alphabet.index_of(lead) {
            Some(index) => tally.add(index),
            None => return Err(Error::UnknownTag { record, tag: lead }),
        }
    }
    log::debug!("{} records classified", tally.total());
    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureWriter;
    use crate::generator::{self, PcgChooser, StreamGenerator, FACTS};
    use crate::structs::{CapturePacket, StreamSpec, CONSUMER_TAGS};
    use std::io::Cursor;
    use std::time::Duration;

    fn generate_capture(spec: StreamSpec, seed: u64) -> Vec<u8> {
        let generator =
            StreamGenerator::new(spec, CONSUMER_TAGS, FACTS, PcgChooser::new(Some(seed))).unwrap();
        let mut writer = CaptureWriter::new(Vec::new()).unwrap();
        for (i, payload) in generator.enumerate() {
            let packet = CapturePacket::new(Duration::from_micros(i as u64), payload);
            writer.write_packet(&packet).unwrap();
        }
        writer.into_inner()
    }

    fn classify_bytes(bytes: Vec<u8>) -> Result<ConsumerTally> {
        let mut reader = CaptureReader::new(Cursor::new(bytes)).unwrap();
        classify(&mut reader, CONSUMER_TAGS)
    }

    #[test]
    fn round_trip_recovers_the_distribution() {
        // 512 B packets, 20 000 records, 2 consumers
        let spec = StreamSpec {
            packet_size: 512,
            packet_count: 20_000,
            consumer_count: 2,
        };
        let tally = classify_bytes(generate_capture(spec, 1)).unwrap();
        assert_eq!(tally.total(), 20_000);
        let nonzero: Vec<(u8, u64)> = tally.iter().filter(|&(_, count)| count > 0).collect();
        assert_eq!(nonzero.len(), 2);
        for (_, count) in nonzero {
            assert!((9_000..=11_000).contains(&count), "skewed split: {count}");
        }
    }

    #[test]
    fn distribution_is_roughly_uniform_over_large_samples() {
        let spec = StreamSpec {
            packet_size: 128,
            packet_count: 100_000,
            consumer_count: 4,
        };
        let tally = classify_bytes(generate_capture(spec, 99)).unwrap();
        assert_eq!(tally.total(), 100_000);
        for index in 0..4 {
            let count = tally.count(index);
            assert!(
                (22_500..=27_500).contains(&count),
                "consumer {index} got {count} packets"
            );
        }
        for index in 4..CONSUMER_TAGS.len() {
            assert_eq!(tally.count(index), 0);
        }
    }

    #[test]
    fn empty_stream_tallies_to_zero() {
        let spec = StreamSpec {
            packet_size: 512,
            packet_count: 0,
            consumer_count: 2,
        };
        let tally = classify_bytes(generate_capture(spec, 5)).unwrap();
        assert_eq!(tally.total(), 0);
        assert!(tally.iter().all(|(_, count)| count == 0));
    }

    #[test]
    fn out_of_alphabet_tag_aborts_classification() {
        let mut writer = CaptureWriter::new(Vec::new()).unwrap();
        writer
            .write_packet(&CapturePacket::new(Duration::ZERO, vec![0xa0; 32]))
            .unwrap();
        writer
            .write_packet(&CapturePacket::new(Duration::ZERO, vec![0x10; 32]))
            .unwrap();
        let err = classify_bytes(writer.into_inner()).unwrap_err();
        assert!(matches!(err, Error::UnknownTag { record: 2, tag: 0x10 }));
    }

    #[test]
    fn empty_record_aborts_classification() {
        let mut writer = CaptureWriter::new(Vec::new()).unwrap();
        writer
            .write_packet(&CapturePacket::new(Duration::ZERO, Vec::new()))
            .unwrap();
        let err = classify_bytes(writer.into_inner()).unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }

    #[test]
    fn truncated_stream_aborts_classification() {
        let spec = StreamSpec {
            packet_size: 256,
            packet_count: 10,
            consumer_count: 2,
        };
        let mut bytes = generate_capture(spec, 3);
        bytes.truncate(bytes.len() - 40);
        let err = classify_bytes(bytes).unwrap_err();
        assert!(matches!(err, Error::Truncated { .. }));
    }

    #[test]
    fn round_trip_through_the_writer_helper() {
        // the public write/classify contract end to end, via a file
        let spec = StreamSpec {
            packet_size: 200,
            packet_count: 500,
            consumer_count: 5,
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.pcap");
        generator::generate_to_file(
            &path,
            spec,
            CONSUMER_TAGS,
            FACTS,
            PcgChooser::new(Some(11)),
            Some(Duration::ZERO),
        )
        .unwrap();
        let tally = classify_file(&path, CONSUMER_TAGS).unwrap();
        assert_eq!(tally.total(), 500);
        for index in 5..CONSUMER_TAGS.len() {
            assert_eq!(tally.count(index), 0);
        }
    }
}
