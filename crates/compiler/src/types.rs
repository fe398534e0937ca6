/// Switchbench type representation.

use std::fmt;

use serde::{Deserialize, Serialize};
use switchbench_language::ast::PredefinedType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Object,
    Str,
    Int,
    Bool,
    /// Type of the `null` literal.
    Null,
}

impl Type {
    pub fn from_predefined(ty: PredefinedType) -> Self {
        match ty {
            PredefinedType::Object => Type::Object,
            PredefinedType::String => Type::Str,
            PredefinedType::Int => Type::Int,
            PredefinedType::Bool => Type::Bool,
        }
    }

    /// Whether a value of type `other` may be stored in a slot of type `self`.
    pub fn is_assignable_from(self, other: Type) -> bool {
        match (self, other) {
            (Type::Object, _) => true,
            (Type::Str, Type::Str | Type::Null) => true,
            (a, b) => a == b,
        }
    }

    /// Domains that literal patterns alone can never cover.
    pub fn is_infinite_domain(self) -> bool {
        !matches!(self, Type::Bool | Type::Null)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Object => write!(f, "object"),
            Type::Str => write!(f, "string"),
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Null => write!(f, "<null>"),
        }
    }
}
