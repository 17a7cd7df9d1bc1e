//! PPM source and histogram writer against real files.

use std::fs;

use histo::engine::{run, RunParams};
use histo::io::{ppm, report};
use histo::synth::{generate, Distribution};
use histo::{Channel, HistoError, StrategyKind};

#[test]
fn ppm_file_to_histogram_file() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("input.ppm");
    let output = dir.path().join("hist.txt");

    let buffer = generate(40, 25, 255, Distribution::Skewed, 11).unwrap();
    ppm::write_path(&image, &buffer).unwrap();

    let loaded = ppm::read_path(&image).unwrap();
    assert_eq!(loaded, buffer);

    let outcome = run(&loaded, &RunParams::new(3, StrategyKind::Lockfree)).unwrap();
    report::write_path(&output, &outcome.histogram).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    // three blocks of "256" followed by 256 bucket lines
    assert_eq!(lines.len(), 3 * 257);
    assert_eq!(lines[0], "256");
    assert_eq!(lines[257], "256");
    let red_total: u64 = lines[1..257]
        .iter()
        .map(|l| l.split_once(' ').unwrap().1.parse::<u64>().unwrap())
        .sum();
    assert_eq!(red_total, 1000);
    assert_eq!(lines[1 + 7], format!("7 {}", outcome.histogram.counts(Channel::Red)[7]));
}

#[test]
fn unsupported_depth_aborts_before_run() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("deep.ppm");
    fs::write(&image, b"P6\n1 1\n1023\n\0\0\0\0\0\0").unwrap();
    let err = ppm::read_path(&image).unwrap_err();
    assert!(matches!(err, HistoError::UnsupportedDepth { depth: 1023 }));
    assert!(err.is_fatal());
}

#[test]
fn unparsable_input_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("junk.ppm");
    fs::write(&image, b"GIF89a").unwrap();
    assert!(matches!(ppm::read_path(&image), Err(HistoError::InvalidFormat { .. })));
    assert!(matches!(ppm::read_path(dir.path().join("missing.ppm")), Err(HistoError::Io(_))));
}

#[test]
fn unwritable_sink_is_non_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let buffer = generate(8, 8, 255, Distribution::Uniform, 1).unwrap();
    let outcome = run(&buffer, &RunParams::new(2, StrategyKind::Private)).unwrap();

    // a directory cannot be opened as the output file
    let err = report::write_path(dir.path(), &outcome.histogram).unwrap_err();
    assert!(matches!(err, HistoError::Output { .. }));
    assert!(!err.is_fatal());
    assert!(outcome.histogram.is_conserved(64));

    let summary = report::timing_line(outcome.timings.total_ns);
    let mut stdout = Vec::new();
    let written = report::publish(dir.path(), &outcome.histogram, &summary, &mut stdout).unwrap();
    assert!(!written);
    let printed = String::from_utf8(stdout).unwrap();
    assert!(printed.starts_with("Time: ") && printed.ends_with(" ns\n"), "{printed}");
}

#[test]
fn publish_writes_file_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("hist.txt");
    let buffer = generate(4, 4, 15, Distribution::Uniform, 2).unwrap();
    let outcome = run(&buffer, &RunParams::new(2, StrategyKind::Ticket)).unwrap();

    let mut stdout = Vec::new();
    assert!(report::publish(&output, &outcome.histogram, "Time: 7 ns", &mut stdout).unwrap());
    assert_eq!(stdout, b"Time: 7 ns\n");
    assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 3 * 17);
}
