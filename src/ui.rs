use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use std::fmt::Write;

use crate::structs::ConsumerTally;

/// Progress bar for a generation run with a known packet target.
pub fn generation_bar(target: u64) -> ProgressBar {
    let bar = ProgressBar::new(target);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} Generation [{wide_bar}] {pos}/{len} ({eta})")
            .unwrap()
            .with_key("eta", |state: &ProgressState, w: &mut dyn Write| {
                write!(w, "{:.1}s", state.eta().as_secs_f64()).unwrap()
            }),
    );
    bar
}

/// Print the per-consumer distribution recovered from a capture file.
pub fn print_tally(tally: &ConsumerTally) {
    let total = tally.total();
    println!("Classified {total} packets");
    for (tag, count) in tally.iter() {
        let share = if total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / total as f64
        };
        println!("  consumer {tag:#04x}: {count} packets ({share:.1}%)");
    }
}
