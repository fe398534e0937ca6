/// Switchbench - switch expression compile-time regression harness.
/// Synthesizes a method with a very large switch and times its emit.

pub mod config;
pub mod driver;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod rustc;
pub mod synth;

pub use error::BenchError;
