/// Switch expression builder.
///
/// Literal arms are pushed in order; `discard` appends the catch-all and is the
/// only way to finish, so a built switch always ends with exactly one discard arm.

use bumpalo::Bump;
use bumpalo::collections::Vec as BumpVec;

use crate::ast::{Expression, LiteralArm, SwitchExpression};

pub struct SwitchBuilder<'a> {
    arena: &'a Bump,
    governing: Expression<'a>,
    arms: BumpVec<'a, LiteralArm<'a>>,
}

impl<'a> SwitchBuilder<'a> {
    /// Start a switch governed by the identifier `governing`.
    pub fn new(arena: &'a Bump, governing: &str) -> Self {
        Self::with_capacity(arena, governing, 0)
    }

    pub fn with_capacity(arena: &'a Bump, governing: &str, capacity: usize) -> Self {
        Self {
            arena,
            governing: Expression::Identifier(arena.alloc_str(governing)),
            arms: BumpVec::with_capacity_in(capacity, arena),
        }
    }

    /// Append a literal arm, copying `token` into the arena.
    pub fn arm(mut self, token: &str, result: Expression<'a>) -> Self {
        let token = self.arena.alloc_str(token);
        self.arms.push(LiteralArm::new(token, result));
        self
    }

    /// Append arms whose tokens already live in the arena.
    pub fn arms<I>(mut self, arms: I) -> Self
    where
        I: IntoIterator<Item = LiteralArm<'a>>,
    {
        self.arms.extend(arms);
        self
    }

    pub fn len(&self) -> usize {
        self.arms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// Close the switch with `_ => result`.
    pub fn discard(self, result: Expression<'a>) -> SwitchExpression<'a> {
        SwitchExpression::new(self.governing, self.arms.into_bump_slice(), result)
    }
}
