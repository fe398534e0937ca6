/// Switchbench Language
/// Syntax tree for synthesized switch programs, arena-allocated with bumpalo.

pub mod ast;
pub mod builder;
pub mod printer;
