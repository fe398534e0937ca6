/// Switchbench Compiler
/// Binds, lowers and emits switch programs into loadable library images.

pub mod bind;
pub mod codegen;
pub mod decision;
pub mod diag;
pub mod exhaustiveness;
pub mod hash;
pub mod image;
pub mod interp;
pub mod ir;
pub mod optimize;
pub mod options;
pub mod session;
pub mod types;

#[cfg(test)]
mod benchmarks;
#[cfg(test)]
mod testing;

pub use diag::{Diagnostic, Severity};
pub use options::{CompilationOptions, OptimizationLevel, OutputKind};
pub use session::{Compilation, EmitResult};
