use capgen::capture::CaptureReader;
use capgen::classifier;
use capgen::config;
use capgen::error::Result;
use capgen::generator::{self, PcgChooser, FACTS};
use capgen::structs::{StreamSpec, CONSUMER_TAGS};
use capgen::ui;
mod cmd;

use std::fs;
use std::path::Path;
use std::process;
use std::time::Duration;

use clap::Parser;
use indicatif::HumanBytes;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = cmd::Args::parse();
    if let Err(e) = run(args) {
        log::error!("{e}");
        process::exit(1);
    }
}

fn run(args: cmd::Args) -> Result<()> {
    match args.command {
        cmd::Command::Generate {
            outfile,
            packet_size,
            packet_count,
            consumer_count,
            seed,
            start_time,
            classify,
        } => {
            if let Some(s) = seed {
                log::info!("Generating with seed {s}");
            }
            let spec = StreamSpec {
                packet_size,
                packet_count,
                consumer_count,
            };
            generate(&outfile, spec, seed, start_time, classify)
        }
        cmd::Command::Classify { infile } => {
            let tally = classifier::classify_file(&infile, CONSUMER_TAGS)?;
            ui::print_tally(&tally);
            Ok(())
        }
        cmd::Command::Inspect { infile, limit } => inspect(&infile, limit),
        cmd::Command::Batch {
            profile,
            outdir,
            seed,
            start_time,
            classify,
        } => {
            let experiments = match &profile {
                Some(path) => config::import_experiments(&fs::read_to_string(path)?)?,
                None => {
                    log::info!("Using the embedded experiment grid");
                    config::default_experiments()
                }
            };
            fs::create_dir_all(&outdir)?;
            for spec in experiments {
                let path = Path::new(&outdir).join(spec.file_name());
                generate(&path, spec, seed, start_time, classify)?;
            }
            Ok(())
        }
    }
}

fn generate<P: AsRef<Path>>(
    path: P,
    spec: StreamSpec,
    seed: Option<u64>,
    start_time: Option<u64>,
    classify: bool,
) -> Result<()> {
    let path = path.as_ref();
    let summary = generator::generate_to_file(
        path,
        spec,
        CONSUMER_TAGS,
        FACTS,
        PcgChooser::new(seed),
        start_time.map(Duration::from_secs),
    )?;
    log::info!(
        "{} packets ({}) saved into {}",
        summary.packets,
        HumanBytes(summary.bytes),
        path.display()
    );
    if classify {
        let tally = classifier::classify_file(path, CONSUMER_TAGS)?;
        ui::print_tally(&tally);
    }
    Ok(())
}

fn inspect(infile: &str, limit: u64) -> Result<()> {
    let mut reader = CaptureReader::open(infile)?;
    let mut shown = 0;
    while shown < limit {
        match reader.next_packet()? {
            Some(packet) => {
                let head = &packet.data[..packet.data.len().min(24)];
                println!(
                    "record {:>6}  length {:>6}  time {:?}  head {:02x?}",
                    reader.records_read(),
                    packet.data.len(),
                    packet.timestamp,
                    head
                );
                shown += 1;
            }
            None => break,
        }
    }
    Ok(())
}
