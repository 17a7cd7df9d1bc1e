// Per-channel histogram of a binary PPM image (one run)
//
// Usage:
//   ./histogram <input-file> <output-file> <threads> [--strategy S] [--reduction R]
//               [--parallel-threshold N] [--merge-workers M] [--affinity] [--json]
//   strategy:  spinlock | ticket | lockfree | private (default)
//   reduction: auto | serial | parallel (private only)
//
// Output:
//   Time: 123456 ns
// or, with --json, a single JSON run report.

use clap::Parser;

use histo::config::HistogramArgs;
use histo::{engine, io, logging, Result};

fn main() {
    let args = HistogramArgs::parse();
    logging::init(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &HistogramArgs) -> Result<()> {
    let params = args.to_params()?;
    let buffer = io::ppm::read_path(&args.input)?;
    tracing::info!(
        xsize = buffer.xsize(),
        ysize = buffer.ysize(),
        maxrgb = buffer.depth_bound(),
        strategy = params.strategy.as_str(),
        threads = params.threads,
        "loaded image"
    );

    let outcome = engine::run(&buffer, &params)?;

    let summary = if args.json {
        serde_json::to_string_pretty(&outcome.report(&params, &buffer))?
    } else {
        io::report::timing_line(outcome.timings.total_ns)
    };
    // an unwritable sink loses the histogram but not the timing
    io::report::publish(&args.output, &outcome.histogram, &summary, std::io::stdout().lock())?;
    Ok(())
}
