/// Switchbench CLI
/// Synthesizes a large string switch, emits it, and reports how long the emit took.

use std::fs;

use bumpalo::Bump;
use clap::Parser as ClapParser;
use log::warn;
use switchbench::config::Cli;
use switchbench::driver::Driver;
use switchbench::record::{self, MeasurementRecord};
use switchbench::synth::{self, Synthesizer};
use switchbench::BenchError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), BenchError> {
    let pipeline = cli.pipeline();
    let driver = Driver::new(pipeline.as_ref(), cli.settings(), &cli.output);

    for &arm_count in &cli.arms {
        let synthesizer = Synthesizer::new(arm_count);
        for _ in 0..cli.repeat {
            let arena = Bump::new();
            let unit = synthesizer.synthesize(&arena);

            if let Some(path) = &cli.emit_source {
                fs::write(path, unit.to_string()).map_err(|e| BenchError::io(path, e))?;
            }

            println!("Starting compilation");
            let measurement = driver.run(&unit, arm_count)?;
            println!("Completed compilation in {}ms", measurement.elapsed_ms());

            let record = MeasurementRecord::from_measurement(
                &measurement,
                synth::build_name(),
                driver.pipeline_name(),
                &driver.settings().assembly_name,
            );
            println!("{}", record);
            if let Some(path) = &cli.record {
                record::append(path, &record)?;
            }

            if cli.strict {
                measurement.into_checked()?;
            } else if !measurement.result.success {
                warn!(
                    "emit of {} arm(s) failed and left no {}; timing reported anyway (use --strict to fail)",
                    arm_count,
                    driver.output().display()
                );
            }
        }
    }
    Ok(())
}
