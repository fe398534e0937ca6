/// Source rendering of a compilation unit.

use std::fmt::{self, Write};

use crate::ast::{Class, CompilationUnit, Expression, Method, Modifier, Pattern};

const INDENT: &str = "    ";

fn write_modifiers(f: &mut fmt::Formatter<'_>, modifiers: &[Modifier]) -> fmt::Result {
    for modifier in modifiers {
        write!(f, "{} ", modifier.keyword())?;
    }
    Ok(())
}

/// Write `value` as a double-quoted literal.
pub fn write_string_literal<W: Write>(out: &mut W, value: &str) -> fmt::Result {
    out.write_char('"')?;
    for ch in value.chars() {
        match ch {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            '\0' => out.write_str("\\0")?,
            c if c.is_control() => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

impl fmt::Display for Expression<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) => f.write_str(name),
            Expression::String(value) => write_string_literal(f, value),
            Expression::Integer(value) => write!(f, "{}", value),
            Expression::Null => f.write_str("null"),
        }
    }
}

impl fmt::Display for Pattern<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(token) => write_string_literal(f, token),
            Pattern::Discard => f.write_str("_"),
        }
    }
}

impl fmt::Display for Method<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = INDENT.repeat(2);
        f.write_str(&indent)?;
        write_modifiers(f, self.modifiers)?;
        writeln!(
            f,
            "{} {}({} {}) => {} switch",
            self.return_type, self.name, self.parameter.ty, self.parameter.name, self.body.governing
        )?;
        writeln!(f, "{indent}{{")?;
        let last = self.body.arm_count() - 1;
        for (index, arm) in self.body.arms().enumerate() {
            let separator = if index == last { "" } else { "," };
            writeln!(f, "{indent}{INDENT}{} => {}{separator}", arm.pattern, arm.result)?;
        }
        writeln!(f, "{indent}}};")
    }
}

impl fmt::Display for Class<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(INDENT)?;
        write_modifiers(f, self.modifiers)?;
        writeln!(f, "class {}", self.name)?;
        writeln!(f, "{INDENT}{{")?;
        write!(f, "{}", self.method)?;
        writeln!(f, "{INDENT}}}")
    }
}

impl fmt::Display for CompilationUnit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "namespace {}", self.namespace.name)?;
        writeln!(f, "{{")?;
        write!(f, "{}", self.namespace.class)?;
        writeln!(f, "}}")
    }
}
