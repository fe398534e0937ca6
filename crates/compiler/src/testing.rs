/// Syntax tree fixtures shared by the compiler tests.

use bumpalo::Bump;
use switchbench_language::ast::*;
use switchbench_language::builder::SwitchBuilder;

pub struct TestUnit {
    pub arena: Bump,
}

impl TestUnit {
    pub fn new() -> Self {
        Self { arena: Bump::new() }
    }

    /// `object SomeMethod(string str) => str switch { label => null, ..., _ => null }`
    pub fn null_switch(&self, labels: &[&str]) -> CompilationUnit<'_> {
        unit_with(&self.arena, "str", PredefinedType::Object, labels, Expression::Null)
    }

    /// Arm `i` matches `label-{i}` and returns `i`; the discard returns -1.
    pub fn numbered_switch(&self, count: usize) -> CompilationUnit<'_> {
        let mut builder = SwitchBuilder::with_capacity(&self.arena, "str", count);
        for i in 0..count {
            builder = builder.arm(&format!("label-{i}"), Expression::Integer(i as i64));
        }
        wrap(builder.discard(Expression::Integer(-1)), PredefinedType::Object)
    }
}

pub fn unit_with<'a>(
    arena: &'a Bump,
    governing: &str,
    return_type: PredefinedType,
    labels: &[&str],
    result: Expression<'a>,
) -> CompilationUnit<'a> {
    let mut builder = SwitchBuilder::with_capacity(arena, governing, labels.len());
    for label in labels {
        builder = builder.arm(label, result);
    }
    wrap(builder.discard(result), return_type)
}

fn wrap<'a>(switch: SwitchExpression<'a>, return_type: PredefinedType) -> CompilationUnit<'a> {
    let method = Method::new(
        "SomeMethod",
        return_type,
        Parameter::new("str", PredefinedType::String),
        switch,
    );
    let class = Class::new("SomeClass", &[Modifier::Public, Modifier::Sealed], method);
    CompilationUnit::new(Namespace::new("SomeNs", class))
}
