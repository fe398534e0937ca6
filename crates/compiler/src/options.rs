/// Compilation options recognized by the front-end.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    /// A loadable library with no entry point.
    DynamicallyLinkedLibrary,
    /// Requires a `static Main` method.
    ConsoleApplication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationLevel {
    Debug,
    Release,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::DynamicallyLinkedLibrary => write!(f, "dll"),
            OutputKind::ConsoleApplication => write!(f, "exe"),
        }
    }
}

impl fmt::Display for OptimizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationLevel::Debug => write!(f, "debug"),
            OptimizationLevel::Release => write!(f, "release"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationOptions {
    pub output_kind: OutputKind,
    pub optimization: OptimizationLevel,
    pub deterministic: bool,
}

impl CompilationOptions {
    pub fn new(output_kind: OutputKind) -> Self {
        Self {
            output_kind,
            optimization: OptimizationLevel::Debug,
            deterministic: false,
        }
    }

    pub fn with_optimization(mut self, optimization: OptimizationLevel) -> Self {
        self.optimization = optimization;
        self
    }

    pub fn with_deterministic(mut self, deterministic: bool) -> Self {
        self.deterministic = deterministic;
        self
    }

    pub fn is_release(&self) -> bool {
        self.optimization == OptimizationLevel::Release
    }
}

impl Default for CompilationOptions {
    /// Release, deterministic library output.
    fn default() -> Self {
        Self::new(OutputKind::DynamicallyLinkedLibrary)
            .with_optimization(OptimizationLevel::Release)
            .with_deterministic(true)
    }
}
