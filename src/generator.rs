//! Synthetic stream generation: packets whose first bytes encode the
//! intended consumer, padded with the same tag byte to an exact size.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::prelude::*;
use rand_pcg::Pcg32;

use crate::capture::{CaptureWriter, DEFAULT_SNAPLEN};
use crate::error::{Error, Result};
use crate::structs::{CapturePacket, StreamSpec, TagAlphabet};
use crate::ui;

/// Number of tag bytes prepended to every payload. The same tag also pads
/// the tail, so the leading byte always identifies the consumer.
pub const TAG_PREFIX_LEN: usize = 16;

/// The fixed pool of textual fact payloads.
pub const FACTS: &[&[u8]] = &[
    b"There are over 1,000 varieties of cherries.",
    b"The botanical name of the wild cherry tree is \"prunus avium\".",
    b"Cherries are a good source of vitamin C.",
    b"Cherries are rich in antioxidants and anti-inflammatory compounds.",
    b"Cherries contain relatively high amounts of the metals potassium, copper, and manganese.",
    b"Never eat cherry pits! They contain small amounts of amygdalin which your body converts to cyanide.",
];

/// Uniform selection over a bounded candidate list. Injected so tests can
/// substitute a deterministic sequence.
pub trait Chooser {
    fn choose_uniform<'a, T>(&mut self, candidates: &'a [T]) -> &'a T;
}

/// Chooser backed by a seedable PCG generator.
pub struct PcgChooser {
    rng: Pcg32,
}

impl PcgChooser {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => Pcg32::seed_from_u64(s),
            None => Pcg32::from_entropy(),
        };
        PcgChooser { rng }
    }
}

impl Chooser for PcgChooser {
    fn choose_uniform<'a, T>(&mut self, candidates: &'a [T]) -> &'a T {
        &candidates[self.rng.gen_range(0..candidates.len())]
    }
}

/// Produces the payloads of one synthetic stream, in generation order.
#[derive(Debug)]
pub struct StreamGenerator<'a, C: Chooser> {
    packet_size: usize,
    remaining: u64,
    tags: Vec<u8>,
    facts: &'a [&'a [u8]],
    chooser: C,
}

impl<'a, C: Chooser> StreamGenerator<'a, C> {
    pub fn new(
        spec: StreamSpec,
        alphabet: TagAlphabet,
        facts: &'a [&'a [u8]],
        chooser: C,
    ) -> Result<Self> {
        if spec.consumer_count == 0 || spec.consumer_count > alphabet.len() {
            return Err(Error::InvalidParameter {
                name: "consumer_count",
                reason: format!(
                    "must be between 1 and {} (got {})",
                    alphabet.len(),
                    spec.consumer_count
                ),
            });
        }
        if facts.is_empty() {
            return Err(Error::InvalidParameter {
                name: "facts",
                reason: "the fact pool is empty".to_string(),
            });
        }
        let minimum = size_floor(facts);
        if spec.packet_size < minimum {
            return Err(Error::SizeTooSmall {
                packet_size: spec.packet_size,
                minimum,
            });
        }
        let tags: Vec<u8> = alphabet.tags().take(spec.consumer_count).collect();
        Ok(StreamGenerator {
            packet_size: spec.packet_size,
            remaining: spec.packet_count,
            tags,
            facts,
            chooser,
        })
    }
}

impl<C: Chooser> Iterator for StreamGenerator<'_, C> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let tag = *self.chooser.choose_uniform(&self.tags);
        let fact = *self.chooser.choose_uniform(self.facts);
        Some(build_payload(tag, fact, self.packet_size))
    }
}

/// The smallest packet size the pool admits: the tag prefix plus the
/// longest fact.
pub fn size_floor(facts: &[&[u8]]) -> usize {
    TAG_PREFIX_LEN + facts.iter().map(|f| f.len()).max().unwrap_or(0)
}

fn build_payload(tag: u8, fact: &[u8], packet_size: usize) -> Vec<u8> {
    let mut payload = Vec::with_capacity(packet_size);
    payload.resize(TAG_PREFIX_LEN, tag);
    payload.extend_from_slice(fact);
    payload.resize(packet_size, tag);
    payload
}

/// Summary of one generated capture file.
#[derive(Debug, Clone, Copy)]
pub struct ExportSummary {
    pub packets: u64,
    pub bytes: u64,
}

/// Generate a stream and write it straight to a capture file. Packets are
/// stamped with the wall clock at generation time, or with `start_time +
/// i` microseconds when a fixed base is given (which makes the output
/// byte-reproducible together with a seeded chooser).
pub fn generate_to_file<P: AsRef<Path>, C: Chooser>(
    path: P,
    spec: StreamSpec,
    alphabet: TagAlphabet,
    facts: &[&[u8]],
    chooser: C,
    start_time: Option<Duration>,
) -> Result<ExportSummary> {
    if spec.packet_size as u64 > DEFAULT_SNAPLEN as u64 {
        return Err(Error::InvalidParameter {
            name: "packet_size",
            reason: format!("exceeds the snapshot length {DEFAULT_SNAPLEN}"),
        });
    }
    let generator = StreamGenerator::new(spec, alphabet, facts, chooser)?;
    let mut writer = CaptureWriter::create(path)?;
    log::trace!("Start stream generation");
    let bar = ui::generation_bar(spec.packet_count);
    for (i, payload) in generator.enumerate() {
        let timestamp = match start_time {
            Some(base) => base + Duration::from_micros(i as u64),
            None => SystemTime::now().duration_since(UNIX_EPOCH).unwrap(),
        };
        writer.write_packet(&CapturePacket::new(timestamp, payload))?;
        bar.inc(1);
    }
    bar.finish();
    writer.flush()?;
    log::debug!(
        "{} packets written ({} bytes)",
        writer.packets_written(),
        writer.bytes_written()
    );
    Ok(ExportSummary {
        packets: writer.packets_written(),
        bytes: writer.bytes_written(),
    })
}
