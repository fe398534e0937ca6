/// Binding pass: resolves names and checks types on the syntax tree.
///
/// The bound tree borrows every string from the syntax tree, so binding a
/// switch with tens of thousands of arms copies no labels.

use switchbench_language::ast::{CompilationUnit, Expression, Modifier, Pattern};

use crate::diag::{self, Diagnostic};
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundValue<'a> {
    Null,
    String(&'a str),
    Integer(i64),
    /// Method argument by position.
    Argument(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundPattern<'a> {
    Literal(&'a str),
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundArm<'a> {
    pub pattern: BoundPattern<'a>,
    pub result: BoundValue<'a>,
}

#[derive(Debug, Clone)]
pub struct BoundSwitch<'a> {
    pub governing: BoundValue<'a>,
    pub governing_ty: Type,
    pub arms: Vec<BoundArm<'a>>,
}

#[derive(Debug, Clone)]
pub struct BoundMethod<'a> {
    pub name: &'a str,
    pub is_static: bool,
    pub parameter: (&'a str, Type),
    pub return_type: Type,
    pub switch: BoundSwitch<'a>,
}

#[derive(Debug, Clone)]
pub struct BoundUnit<'a> {
    pub namespace: &'a str,
    pub class_name: &'a str,
    pub class_modifiers: &'a [Modifier],
    pub method: BoundMethod<'a>,
}

/// Names visible inside the method body.
struct Scope<'a> {
    parameter: &'a str,
    parameter_ty: Type,
}

impl<'a> Scope<'a> {
    fn resolve(&self, name: &str) -> Option<(BoundValue<'a>, Type)> {
        (name == self.parameter).then_some((BoundValue::Argument(0), self.parameter_ty))
    }

    /// Bind an expression, reporting unknown names.
    fn bind_value(
        &self,
        expression: Expression<'a>,
        arm: Option<usize>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (BoundValue<'a>, Type) {
        match expression {
            Expression::Null => (BoundValue::Null, Type::Null),
            Expression::String(value) => (BoundValue::String(value), Type::Str),
            Expression::Integer(value) => (BoundValue::Integer(value), Type::Int),
            Expression::Identifier(name) => match self.resolve(name) {
                Some(bound) => bound,
                None => {
                    let mut diagnostic = Diagnostic::error(
                        diag::UNDEFINED_NAME,
                        format!("The name '{}' does not exist in the current context", name),
                    );
                    if let Some(arm) = arm {
                        diagnostic = diagnostic.at_arm(arm);
                    }
                    diagnostics.push(diagnostic);
                    (BoundValue::Null, Type::Object)
                }
            },
        }
    }
}

pub fn bind_unit<'a>(unit: &CompilationUnit<'a>, diagnostics: &mut Vec<Diagnostic>) -> BoundUnit<'a> {
    let class = unit.class();
    let method = unit.method();
    let scope = Scope {
        parameter: method.parameter.name,
        parameter_ty: Type::from_predefined(method.parameter.ty),
    };
    let return_type = Type::from_predefined(method.return_type);
    let switch = method.body;

    let (governing, governing_ty) = scope.bind_value(switch.governing, None, diagnostics);

    let mut arms = Vec::with_capacity(switch.arm_count());
    for (index, arm) in switch.arms().enumerate() {
        let pattern = match arm.pattern {
            Pattern::Literal(token) => {
                if !governing_ty.is_assignable_from(Type::Str) {
                    diagnostics.push(
                        Diagnostic::error(
                            diag::TYPE_MISMATCH,
                            format!("A string pattern cannot match a value of type '{}'", governing_ty),
                        )
                        .at_arm(index),
                    );
                }
                BoundPattern::Literal(token)
            }
            Pattern::Discard => BoundPattern::Discard,
        };

        let (result, result_ty) = scope.bind_value(arm.result, Some(index), diagnostics);
        if !return_type.is_assignable_from(result_ty) {
            diagnostics.push(
                Diagnostic::error(
                    diag::TYPE_MISMATCH,
                    format!(
                        "Cannot implicitly convert type '{}' to '{}'",
                        result_ty, return_type
                    ),
                )
                .at_arm(index),
            );
        }

        arms.push(BoundArm { pattern, result });
    }

    BoundUnit {
        namespace: unit.namespace.name,
        class_name: class.name,
        class_modifiers: class.modifiers,
        method: BoundMethod {
            name: method.name,
            is_static: method.is_static(),
            parameter: (scope.parameter, scope.parameter_ty),
            return_type,
            switch: BoundSwitch {
                governing,
                governing_ty,
                arms,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{unit_with, TestUnit};
    use switchbench_language::ast::PredefinedType;

    #[test]
    fn binds_parameter_and_arms() {
        let test = TestUnit::new();
        let unit = test.null_switch(&["a", "b"]);
        let mut diagnostics = vec![];
        let bound = bind_unit(&unit, &mut diagnostics);

        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(bound.method.switch.governing, BoundValue::Argument(0));
        assert_eq!(bound.method.switch.governing_ty, Type::Str);
        assert_eq!(bound.method.return_type, Type::Object);
        assert_eq!(bound.method.switch.arms.len(), 3);
        assert_eq!(bound.method.switch.arms[2].pattern, BoundPattern::Discard);
        assert!(bound.method.switch.arms.iter().all(|arm| arm.result == BoundValue::Null));
    }

    #[test]
    fn unknown_governing_name_is_reported() {
        let test = TestUnit::new();
        let unit = unit_with(&test.arena, "missing", PredefinedType::Object, &[], Expression::Null);
        let mut diagnostics = vec![];
        bind_unit(&unit, &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, diag::UNDEFINED_NAME);
    }

    #[test]
    fn null_result_does_not_fit_int_return() {
        let test = TestUnit::new();
        let unit = unit_with(&test.arena, "str", PredefinedType::Int, &["x"], Expression::Null);
        let mut diagnostics = vec![];
        bind_unit(&unit, &mut diagnostics);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.code == diag::TYPE_MISMATCH));
        assert_eq!(diagnostics[0].arm, Some(0));
        assert_eq!(diagnostics[1].arm, Some(1));
    }
}
