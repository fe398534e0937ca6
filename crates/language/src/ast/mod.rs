/// Syntax tree for a single compilation unit:
/// namespace -> class -> method -> switch expression.
///
/// Every node borrows from a `bumpalo::Bump` arena. The shape is fixed by
/// construction: one namespace, one class, one method with one parameter,
/// and a switch whose only catch-all arm is always last.

use std::fmt;
use std::iter::FusedIterator;

/// Keyword types understood by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredefinedType {
    Object,
    String,
    Int,
    Bool,
}

impl PredefinedType {
    pub fn keyword(self) -> &'static str {
        match self {
            PredefinedType::Object => "object",
            PredefinedType::String => "string",
            PredefinedType::Int => "int",
            PredefinedType::Bool => "bool",
        }
    }
}

impl fmt::Display for PredefinedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Public,
    Sealed,
    Static,
}

impl Modifier {
    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Sealed => "sealed",
            Modifier::Static => "static",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expression<'a> {
    Identifier(&'a str),
    String(&'a str),
    Integer(i64),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern<'a> {
    /// String equality against a constant.
    Literal(&'a str),
    /// `_`
    Discard,
}

/// One arm as seen in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arm<'a> {
    pub pattern: Pattern<'a>,
    pub result: Expression<'a>,
}

/// A literal arm as stored in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralArm<'a> {
    pub token: &'a str,
    pub result: Expression<'a>,
}

impl<'a> LiteralArm<'a> {
    pub fn new(token: &'a str, result: Expression<'a>) -> Self {
        Self { token, result }
    }
}

/// `governing switch { literal => result, ..., _ => result }`
///
/// Only `SwitchBuilder::discard` constructs one.
#[derive(Debug, Clone, Copy)]
pub struct SwitchExpression<'a> {
    pub governing: Expression<'a>,
    literal_arms: &'a [LiteralArm<'a>],
    discard: Expression<'a>,
}

impl<'a> SwitchExpression<'a> {
    pub(crate) fn new(
        governing: Expression<'a>,
        literal_arms: &'a [LiteralArm<'a>],
        discard: Expression<'a>,
    ) -> Self {
        Self { governing, literal_arms, discard }
    }

    pub fn literal_arms(&self) -> &'a [LiteralArm<'a>] {
        self.literal_arms
    }

    pub fn discard_result(&self) -> Expression<'a> {
        self.discard
    }

    /// Total arm count, discard included.
    pub fn arm_count(&self) -> usize {
        self.literal_arms.len() + 1
    }

    /// All arms in declaration order; the discard arm comes last.
    pub fn arms(&self) -> Arms<'a> {
        Arms {
            literals: self.literal_arms.iter(),
            discard: Some(self.discard),
        }
    }
}

pub struct Arms<'a> {
    literals: std::slice::Iter<'a, LiteralArm<'a>>,
    discard: Option<Expression<'a>>,
}

impl<'a> Iterator for Arms<'a> {
    type Item = Arm<'a>;

    fn next(&mut self) -> Option<Arm<'a>> {
        if let Some(literal) = self.literals.next() {
            return Some(Arm {
                pattern: Pattern::Literal(literal.token),
                result: literal.result,
            });
        }
        self.discard.take().map(|result| Arm {
            pattern: Pattern::Discard,
            result,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.literals.len() + usize::from(self.discard.is_some());
        (len, Some(len))
    }
}

impl ExactSizeIterator for Arms<'_> {}

impl FusedIterator for Arms<'_> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter<'a> {
    pub name: &'a str,
    pub ty: PredefinedType,
}

impl<'a> Parameter<'a> {
    pub fn new(name: &'a str, ty: PredefinedType) -> Self {
        Self { name, ty }
    }
}

/// An expression-bodied method with exactly one parameter.
#[derive(Debug, Clone, Copy)]
pub struct Method<'a> {
    pub name: &'a str,
    pub modifiers: &'a [Modifier],
    pub return_type: PredefinedType,
    pub parameter: Parameter<'a>,
    pub body: SwitchExpression<'a>,
}

impl<'a> Method<'a> {
    pub fn new(
        name: &'a str,
        return_type: PredefinedType,
        parameter: Parameter<'a>,
        body: SwitchExpression<'a>,
    ) -> Self {
        Self {
            name,
            modifiers: &[],
            return_type,
            parameter,
            body,
        }
    }

    pub fn with_modifiers(mut self, modifiers: &'a [Modifier]) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(&Modifier::Static)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Class<'a> {
    pub name: &'a str,
    pub modifiers: &'a [Modifier],
    pub method: Method<'a>,
}

impl<'a> Class<'a> {
    pub fn new(name: &'a str, modifiers: &'a [Modifier], method: Method<'a>) -> Self {
        Self { name, modifiers, method }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Namespace<'a> {
    pub name: &'a str,
    pub class: Class<'a>,
}

impl<'a> Namespace<'a> {
    pub fn new(name: &'a str, class: Class<'a>) -> Self {
        Self { name, class }
    }
}

/// The root handed to the compiler.
#[derive(Debug, Clone, Copy)]
pub struct CompilationUnit<'a> {
    pub namespace: Namespace<'a>,
}

impl<'a> CompilationUnit<'a> {
    pub fn new(namespace: Namespace<'a>) -> Self {
        Self { namespace }
    }

    pub fn class(&self) -> &Class<'a> {
        &self.namespace.class
    }

    pub fn method(&self) -> &Method<'a> {
        &self.namespace.class.method
    }

    pub fn switch(&self) -> &SwitchExpression<'a> {
        &self.namespace.class.method.body
    }
}
