/// Release-mode optimizations applied between lowering and codegen.

use std::collections::HashMap;

use crate::bind::BoundArm;

/// Maps each arm to the first arm with an equal result, so arms producing the
/// same value share a single result block.
pub fn share_results(arms: &[BoundArm<'_>]) -> Vec<usize> {
    let mut first = HashMap::new();
    arms.iter()
        .enumerate()
        .map(|(index, arm)| *first.entry(arm.result).or_insert(index))
        .collect()
}

/// One result block per arm.
pub fn unshared_results(arm_count: usize) -> Vec<usize> {
    (0..arm_count).collect()
}
