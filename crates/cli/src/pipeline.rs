/// Front-end pipelines the driver can time.
///
/// A pipeline turns a synthesized unit into a configured session; the session
/// performs exactly one emit. Configuration happens before the timer starts.

use std::path::Path;

use log::debug;
use switchbench_compiler::{Compilation, CompilationOptions, EmitResult};
use switchbench_language::ast::CompilationUnit;

use crate::error::BenchError;

pub const DEFAULT_ASSEMBLY_NAME: &str = "SomeAssm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitSettings {
    pub assembly_name: String,
    pub options: CompilationOptions,
}

impl Default for EmitSettings {
    fn default() -> Self {
        Self {
            assembly_name: DEFAULT_ASSEMBLY_NAME.to_string(),
            options: CompilationOptions::default(),
        }
    }
}

pub trait Pipeline {
    fn name(&self) -> &'static str;

    fn configure<'u>(
        &self,
        unit: &'u CompilationUnit<'u>,
        settings: &EmitSettings,
    ) -> Result<Box<dyn Session + 'u>, BenchError>;
}

pub trait Session {
    /// Emit to `output`, replacing any existing file. Compile errors are
    /// reported through the result, not as `Err`.
    fn emit(&mut self, output: &Path) -> Result<EmitResult, BenchError>;
}

/// The in-process compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativePipeline;

struct NativeSession<'u> {
    compilation: Compilation<'u>,
}

impl Pipeline for NativePipeline {
    fn name(&self) -> &'static str {
        "native"
    }

    fn configure<'u>(
        &self,
        unit: &'u CompilationUnit<'u>,
        settings: &EmitSettings,
    ) -> Result<Box<dyn Session + 'u>, BenchError> {
        debug!(
            "native: configuring '{}' as {} ({})",
            settings.assembly_name, settings.options.output_kind, settings.options.optimization
        );
        let compilation = Compilation::create(settings.assembly_name.clone(), unit, settings.options);
        Ok(Box::new(NativeSession { compilation }))
    }
}

impl Session for NativeSession<'_> {
    fn emit(&mut self, output: &Path) -> Result<EmitResult, BenchError> {
        Ok(self.compilation.emit(output))
    }
}
