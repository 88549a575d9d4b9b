use clap::{Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate one synthetic capture file
    Generate {
        #[arg(
            short,
            long,
            default_value = "output.pcap",
            help = "Output pcap file for the synthetic packets"
        )]
        outfile: String,
        #[arg(short = 'b', long, default_value_t = 512, help = "Size of every packet, in bytes")]
        packet_size: usize,
        #[arg(
            short = 'n',
            long,
            default_value_t = 20_000,
            help = "Number of packets to generate"
        )]
        packet_count: u64,
        #[arg(
            short,
            long,
            default_value_t = 2,
            help = "Number of distinct consumer tags in use"
        )]
        consumer_count: usize,
        #[arg(short, long, help = "Seed for random number generation")]
        seed: Option<u64>,
        #[arg(short = 't', long, help = "Stamp packets from this Unix timestamp (in seconds) instead of the wall clock. Generation is deterministic when used with --seed")]
        start_time: Option<u64>,
        #[arg(
            long,
            default_value_t = false,
            help = "Re-read and classify the file after generation"
        )]
        classify: bool,
    },
    /// Recover the per-consumer packet distribution from a capture file
    Classify {
        #[arg(short, long, required = true, help = "Pcap file to classify")]
        infile: String,
    },
    /// Print the first records of a capture file
    Inspect {
        #[arg(short, long, required = true, help = "Pcap file to inspect")]
        infile: String,
        #[arg(
            short,
            long,
            default_value_t = 16,
            help = "Maximum number of records to read"
        )]
        limit: u64,
    },
    /// Generate a whole grid of capture files from a TOML experiment profile
    Batch {
        #[arg(
            short,
            long,
            default_value = None,
            help = "Path to the experiment profile. By default, use the embedded grid"
        )]
        profile: Option<String>,
        #[arg(
            short,
            long,
            default_value = "output",
            help = "Directory for the generated pcap files"
        )]
        outdir: String,
        #[arg(short, long, help = "Seed for random number generation")]
        seed: Option<u64>,
        #[arg(short = 't', long, help = "Stamp packets from this Unix timestamp (in seconds) instead of the wall clock")]
        start_time: Option<u64>,
        #[arg(
            long,
            default_value_t = false,
            help = "Re-read and classify each file after generation"
        )]
        classify: bool,
    },
}
