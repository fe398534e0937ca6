#![cfg(test)]
use std::time::{Duration, Instant};

use crate::options::CompilationOptions;
use crate::session::Compilation;
use crate::testing::TestUnit;

fn time_emit(arms: usize) -> Duration {
    let test = TestUnit::new();
    let labels: Vec<String> = (0..arms).map(|i| format!("{i:08x}-case")).collect();
    let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
    let unit = test.null_switch(&labels);
    let compilation = Compilation::create("Bench", &unit, CompilationOptions::default());

    let mut image = Vec::new();
    let start = Instant::now();
    let result = compilation.emit_to(&mut image);
    let elapsed = start.elapsed();
    assert!(result.success, "emit failed: {:?}", result.diagnostics);
    elapsed
}

#[test]
fn benchmark_discard_only_is_faster_than_10k_arms() {
    let empty = time_emit(0);
    let large = time_emit(10_000);
    println!("0 arms: {:?}, 10,000 arms: {:?}", empty, large);
    assert!(empty < large, "0 arms took {:?}, 10,000 arms took {:?}", empty, large);
}

#[test]
fn benchmark_switch_emit_regression_guard() {
    // Doubling the arm count must not come close to quadrupling emit time.
    let small = (0..3).map(|_| time_emit(5_000)).min().unwrap_or_default();
    let large = (0..3).map(|_| time_emit(10_000)).min().unwrap_or_default();
    println!("5,000 arms: {:?}, 10,000 arms: {:?}", small, large);

    assert!(
        large < small * 3 + Duration::from_millis(50),
        "Switch emit is scaling poorly: 5k arms {:?}, 10k arms {:?}",
        small,
        large
    );
    assert!(large.as_millis() < 2500, "Emitting 10,000 arms took {:?}! Limit is 2.5s", large);
}
