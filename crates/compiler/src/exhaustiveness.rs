use std::collections::HashMap;

use crate::bind::{BoundPattern, BoundSwitch};
use crate::diag::{self, Diagnostic};

/// Checks every arm of `switch` for reachability and the switch as a whole for
/// exhaustiveness, in a single pass over the arms.
///
/// A literal arm is unreachable when an earlier arm already matched the same
/// label, and every arm after a discard is unreachable. Literal patterns never
/// cover an infinite domain, so such switches need a catch-all.
pub fn check_switch(switch: &BoundSwitch<'_>, diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(switch.arms.len());
    let mut discard_at: Option<usize> = None;

    for (index, arm) in switch.arms.iter().enumerate() {
        if let Some(first) = discard_at {
            diagnostics.push(
                Diagnostic::error(
                    diag::SUBSUMED_PATTERN,
                    format!("The pattern has already been handled by the discard in arm {}", first),
                )
                .at_arm(index),
            );
            continue;
        }

        match arm.pattern {
            BoundPattern::Literal(label) => {
                if let Some(&first) = seen.get(label) {
                    diagnostics.push(
                        Diagnostic::error(
                            diag::SUBSUMED_PATTERN,
                            format!("The pattern has already been handled by arm {}", first),
                        )
                        .at_arm(index),
                    );
                } else {
                    seen.insert(label, index);
                }
            }
            BoundPattern::Discard => discard_at = Some(index),
        }
    }

    if discard_at.is_none() && switch.governing_ty.is_infinite_domain() {
        diagnostics.push(Diagnostic::error(
            diag::NON_EXHAUSTIVE,
            format!(
                "The switch expression does not handle all possible values of its input type '{}'",
                switch.governing_ty
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::{BoundArm, BoundValue};
    use crate::types::Type;

    fn switch_of(patterns: &[BoundPattern<'static>]) -> BoundSwitch<'static> {
        BoundSwitch {
            governing: BoundValue::Argument(0),
            governing_ty: Type::Str,
            arms: patterns
                .iter()
                .map(|&pattern| BoundArm { pattern, result: BoundValue::Null })
                .collect(),
        }
    }

    #[test]
    fn unique_labels_with_discard_pass() {
        let switch = switch_of(&[
            BoundPattern::Literal("a"),
            BoundPattern::Literal("b"),
            BoundPattern::Discard,
        ]);
        let mut diagnostics = vec![];
        check_switch(&switch, &mut diagnostics);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn duplicate_label_points_at_second_arm() {
        let switch = switch_of(&[
            BoundPattern::Literal("a"),
            BoundPattern::Literal("b"),
            BoundPattern::Literal("a"),
            BoundPattern::Discard,
        ]);
        let mut diagnostics = vec![];
        check_switch(&switch, &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, diag::SUBSUMED_PATTERN);
        assert_eq!(diagnostics[0].arm, Some(2));
        assert!(diagnostics[0].message.contains("arm 0"));
    }

    #[test]
    fn arms_after_discard_are_unreachable() {
        let switch = switch_of(&[BoundPattern::Discard, BoundPattern::Literal("a")]);
        let mut diagnostics = vec![];
        check_switch(&switch, &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].arm, Some(1));
    }

    #[test]
    fn string_switch_without_discard_is_not_exhaustive() {
        let switch = switch_of(&[BoundPattern::Literal("a")]);
        let mut diagnostics = vec![];
        check_switch(&switch, &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, diag::NON_EXHAUSTIVE);
    }
}
