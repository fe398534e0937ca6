/// Command-line configuration.

use std::path::PathBuf;

use clap::{Parser as ClapParser, ValueEnum};
use switchbench_compiler::{CompilationOptions, OptimizationLevel, OutputKind};

use crate::driver::DEFAULT_OUTPUT;
use crate::pipeline::{EmitSettings, NativePipeline, Pipeline, DEFAULT_ASSEMBLY_NAME};
use crate::rustc::{RustcPipeline, DEFAULT_RUSTC};
use crate::synth::DEFAULT_ARM_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// In-process switchbench compiler
    Native,
    /// External rustc on the rendered crate
    Rustc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Optimization {
    Debug,
    Release,
}

impl From<Optimization> for OptimizationLevel {
    fn from(optimization: Optimization) -> Self {
        match optimization {
            Optimization::Debug => OptimizationLevel::Debug,
            Optimization::Release => OptimizationLevel::Release,
        }
    }
}

#[derive(Debug, ClapParser)]
#[command(name = "switchbench")]
#[command(about = "Times how long a front-end takes to emit a very large string switch")]
#[command(version)]
pub struct Cli {
    /// Literal arms per switch; a comma separated list runs a sweep
    #[arg(
        short = 'n',
        long = "arms",
        env = "SWITCHBENCH_ARMS",
        value_delimiter = ',',
        default_values_t = [DEFAULT_ARM_COUNT]
    )]
    pub arms: Vec<usize>,

    /// Measurements per arm count
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,

    /// Output artifact, overwritten on every run
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Assembly (crate) name of the emitted library
    #[arg(long, default_value = DEFAULT_ASSEMBLY_NAME)]
    pub assembly_name: String,

    #[arg(long, value_enum, default_value_t = Backend::Native)]
    pub backend: Backend,

    /// rustc executable for `--backend rustc`
    #[arg(long, env = "RUSTC", default_value = DEFAULT_RUSTC)]
    pub rustc: PathBuf,

    #[arg(long, value_enum, default_value_t = Optimization::Release)]
    pub optimization: Optimization,

    /// Exit non-zero when an emit fails
    #[arg(long)]
    pub strict: bool,

    /// Append one JSON record per measurement to this file
    #[arg(long, env = "SWITCHBENCH_RECORD")]
    pub record: Option<PathBuf>,

    /// Write the synthesized program as source text
    #[arg(long)]
    pub emit_source: Option<PathBuf>,
}

impl Cli {
    pub fn settings(&self) -> EmitSettings {
        EmitSettings {
            assembly_name: self.assembly_name.clone(),
            options: CompilationOptions::new(OutputKind::DynamicallyLinkedLibrary)
                .with_optimization(self.optimization.into())
                .with_deterministic(true),
        }
    }

    pub fn pipeline(&self) -> Box<dyn Pipeline> {
        match self.backend {
            Backend::Native => Box::new(NativePipeline),
            Backend::Rustc => Box::new(RustcPipeline::new(&self.rustc)),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_benchmark_setup() {
        let cli = Cli::try_parse_from(["switchbench"]).expect("parse failed");
        assert!(cli.arms == vec![DEFAULT_ARM_COUNT] || std::env::var_os("SWITCHBENCH_ARMS").is_some());
        assert_eq!(cli.repeat, 1);
        assert_eq!(cli.output, PathBuf::from("SomeAssm.dll"));
        assert_eq!(cli.backend, Backend::Native);
        assert!(!cli.strict);

        let settings = cli.settings();
        assert_eq!(settings.assembly_name, "SomeAssm");
        assert_eq!(settings.options, CompilationOptions::default());
        assert_eq!(cli.pipeline().name(), "native");
    }

    #[test]
    fn arm_sweep_and_overrides_parse() {
        let cli = Cli::try_parse_from([
            "switchbench",
            "-n",
            "0,100,10000",
            "-r",
            "3",
            "--backend",
            "rustc",
            "--optimization",
            "debug",
            "--strict",
            "-o",
            "out/Lib.dll",
        ])
        .expect("parse failed");

        assert_eq!(cli.arms, vec![0, 100, 10_000]);
        assert_eq!(cli.repeat, 3);
        assert!(cli.strict);
        assert_eq!(cli.settings().options.optimization, OptimizationLevel::Debug);
        assert_eq!(cli.pipeline().name(), "rustc");
    }

    #[test]
    fn zero_repeat_is_a_usage_error() {
        assert!(Cli::try_parse_from(["switchbench", "-r", "0"]).is_err());
        assert!(Cli::try_parse_from(["switchbench", "-n", "many"]).is_err());
    }
}
