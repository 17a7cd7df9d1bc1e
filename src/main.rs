// Benchmark sweep over every merge strategy and thread count
//
// Usage:
//   cargo run --release --bin run_all_benchmarks -- [--input image.ppm]
//       [--width W --height H --dist uniform|skewed --seed S]
//       [--threads 1,2,4,8,16] [--strategies spinlock,ticket,lockfree,private]
//       [--repeat R] [--affinity]
//
// Output (CSV-style):
//   hist,rust,strategy=ticket,N=4194304,T=8,reduction=none,time,1234567,ns
//   hist,rust,strategy=ticket,N=4194304,T=8,reduction=none,correct,1,boolean

use clap::Parser;

use histo::config::SweepArgs;
use histo::{engine, io, logging, synth, Histogram, PixelBuffer, Result, RunParams};

fn main() {
    let args = SweepArgs::parse();
    logging::init(args.verbose);

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(3),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load(args: &SweepArgs) -> Result<PixelBuffer> {
    match &args.input {
        Some(path) => io::ppm::read_path(path),
        None => synth::generate(args.width, args.height, 255, args.dist, args.seed),
    }
}

/// Returns whether every configuration reproduced the reference histogram.
fn run(args: &SweepArgs) -> Result<bool> {
    args.validate()?;
    let buffer = load(args)?;
    let n = buffer.len();
    let reference = Histogram::reference(&buffer);
    tracing::info!(pixels = n, maxrgb = buffer.depth_bound(), "sweep input ready");

    let mut all_correct = true;
    for strategy in args.strategies() {
        for &threads in &args.threads {
            let params = RunParams::new(threads, strategy).with_affinity(args.affinity);

            // warm-up, not reported
            engine::run(&buffer, &params)?;

            let mut best = u64::MAX;
            let mut correct = true;
            let mut reduction = "none";
            for _ in 0..args.repeat {
                let outcome = engine::run(&buffer, &params)?;
                best = best.min(outcome.timings.total_ns);
                correct &= outcome.histogram == reference;
                if let Some(r) = outcome.reduction_used {
                    reduction = r.as_str();
                }
            }

            let tag = format!(
                "hist,rust,strategy={},N={},T={},reduction={}",
                strategy.as_str(),
                n,
                threads,
                reduction
            );
            println!("{tag},time,{best},ns");
            println!("{tag},correct,{},boolean", u8::from(correct));

            if !correct {
                tracing::error!(strategy = strategy.as_str(), threads, "histogram mismatch");
                all_correct = false;
            }
        }
    }
    Ok(all_correct)
}
