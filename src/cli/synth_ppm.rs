// Synthetic binary PPM generator for histogram benchmarks
//
// Usage:
//   ./synth_ppm <output-file> [--width W] [--height H] [--depth D]
//               [--dist uniform|skewed] [--seed S]

use std::time::Instant;

use clap::Parser;

use histo::config::SynthArgs;
use histo::{io, logging, synth, Result};

fn main() {
    let args = SynthArgs::parse();
    logging::init(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &SynthArgs) -> Result<()> {
    let start = Instant::now();
    let buffer = synth::generate(args.width, args.height, args.depth, args.dist, args.seed)?;
    io::ppm::write_path(&args.output, &buffer)?;
    tracing::info!(
        path = %args.output.display(),
        width = args.width,
        height = args.height,
        dist = ?args.dist,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "wrote synthetic image"
    );
    Ok(())
}
