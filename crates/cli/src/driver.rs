/// Compilation driver and timer.
///
/// Configures one session per measurement, then times exactly the emit call.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{info, warn};
use switchbench_compiler::EmitResult;
use switchbench_language::ast::CompilationUnit;

use crate::error::BenchError;
use crate::pipeline::{EmitSettings, Pipeline};

pub const DEFAULT_OUTPUT: &str = "SomeAssm.dll";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    pub arm_count: usize,
    pub elapsed: Duration,
    pub result: EmitResult,
}

impl Measurement {
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Fail if the emit did not succeed.
    pub fn into_checked(self) -> Result<Self, BenchError> {
        if self.result.success {
            Ok(self)
        } else {
            Err(BenchError::EmitFailed {
                arm_count: self.arm_count,
                diagnostics: self.result.diagnostics,
            })
        }
    }
}

pub struct Driver<'p> {
    pipeline: &'p dyn Pipeline,
    settings: EmitSettings,
    output: PathBuf,
}

impl<'p> Driver<'p> {
    pub fn new(pipeline: &'p dyn Pipeline, settings: EmitSettings, output: impl Into<PathBuf>) -> Self {
        Self {
            pipeline,
            settings,
            output: output.into(),
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn pipeline_name(&self) -> &'static str {
        self.pipeline.name()
    }

    pub fn settings(&self) -> &EmitSettings {
        &self.settings
    }

    /// Configure a session for `unit` and time one emit to the output path.
    pub fn run(&self, unit: &CompilationUnit<'_>, arm_count: usize) -> Result<Measurement, BenchError> {
        let mut session = self.pipeline.configure(unit, &self.settings)?;

        let start = Instant::now();
        let result = session.emit(&self.output)?;
        let elapsed = start.elapsed();

        if result.success {
            info!(
                "{}: emitted {} arm(s) to {} in {:?}",
                self.pipeline.name(),
                arm_count,
                self.output.display(),
                elapsed
            );
        } else {
            warn!(
                "{}: emit of {} arm(s) failed with {} error(s) after {:?}",
                self.pipeline.name(),
                arm_count,
                result.error_count(),
                elapsed
            );
            for diagnostic in result.errors() {
                warn!("  {}", diagnostic);
            }
        }

        Ok(Measurement { arm_count, elapsed, result })
    }
}
