use std::fmt;
use std::io;
use std::path::PathBuf;

use switchbench_compiler::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot render source: {0}")]
    Render(#[from] fmt::Error),

    #[error("Cannot serialize measurement: {0}")]
    Record(#[from] serde_json::Error),

    #[error("Cannot run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Emit of {arm_count} arm(s) failed with {} error(s)", error_count(.diagnostics))]
    EmitFailed {
        arm_count: usize,
        diagnostics: Vec<Diagnostic>,
    },
}

fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}

impl BenchError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BenchError::Io { path: path.into(), source }
    }
}
