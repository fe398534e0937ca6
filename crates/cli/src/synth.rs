/// AST Synthesizer: builds the benchmark compilation unit.
///
/// `object SomeMethod(string str) => str switch { "<token>" => null, ..., _ => null }`
/// inside `public sealed class SomeClass` inside `namespace SomeNs`.

use std::iter::FusedIterator;

use bumpalo::Bump;
use switchbench_language::ast::*;
use switchbench_language::builder::SwitchBuilder;
use uuid::Uuid;

pub const DEFAULT_ARM_COUNT: usize = 10_000;

pub const NAMESPACE: &str = "SomeNs";
pub const CLASS: &str = "SomeClass";
pub const METHOD: &str = "SomeMethod";
pub const PARAMETER: &str = "str";

const CLASS_MODIFIERS: &[Modifier] = &[Modifier::Public, Modifier::Sealed];

const PACKAGE_QUALIFIER: &str = concat!(
    module_path!(),
    ", ",
    env!("CARGO_PKG_NAME"),
    ", Version=",
    env!("CARGO_PKG_VERSION"),
);

/// Build name reported next to measurements.
pub fn build_name() -> &'static str {
    option_env!("SWITCHBENCH_BUILD").unwrap_or("Dev")
}

/// Static per-build qualifier appended to every case label.
pub fn build_qualifier() -> String {
    format!("{}, Build={}", PACKAGE_QUALIFIER, build_name())
}

/// A fresh random identifier followed by `qualifier`.
pub fn make_case<'a>(arena: &'a Bump, qualifier: &str) -> &'a str {
    bumpalo::format!(in arena, "{}{}", Uuid::new_v4(), qualifier).into_bump_str()
}

/// Lazily produced literal arms. Each call to `next` generates one new label;
/// the stream is finite and cannot be restarted.
pub struct ArmStream<'a> {
    arena: &'a Bump,
    qualifier: &'a str,
    remaining: usize,
}

impl<'a> Iterator for ArmStream<'a> {
    type Item = LiteralArm<'a>;

    fn next(&mut self) -> Option<LiteralArm<'a>> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(LiteralArm::new(make_case(self.arena, self.qualifier), Expression::Null))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ArmStream<'_> {}

impl FusedIterator for ArmStream<'_> {}

#[derive(Debug, Clone)]
pub struct Synthesizer {
    arm_count: usize,
    qualifier: String,
}

impl Synthesizer {
    pub fn new(arm_count: usize) -> Self {
        Self {
            arm_count,
            qualifier: build_qualifier(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = qualifier.into();
        self
    }

    pub fn arms<'a>(&self, arena: &'a Bump) -> ArmStream<'a> {
        ArmStream {
            arena,
            qualifier: arena.alloc_str(&self.qualifier),
            remaining: self.arm_count,
        }
    }

    /// Build the unit: `arm_count` literal arms followed by one discard, every
    /// arm producing `null`.
    pub fn synthesize<'a>(&self, arena: &'a Bump) -> CompilationUnit<'a> {
        let body = SwitchBuilder::with_capacity(arena, PARAMETER, self.arm_count)
            .arms(self.arms(arena))
            .discard(Expression::Null);
        let method = Method::new(
            METHOD,
            PredefinedType::Object,
            Parameter::new(PARAMETER, PredefinedType::String),
            body,
        );
        let class = Class::new(CLASS, CLASS_MODIFIERS, method);
        CompilationUnit::new(Namespace::new(NAMESPACE, class))
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_ARM_COUNT)
    }
}
