/// Switch lowering: turns the checked arm list into a decision tree.
///
/// Small switches compare the input against each label in declaration order.
/// From `HASH_DISPATCH_THRESHOLD` labels on, the input is hashed once and a
/// balanced binary search over label hashes selects a bucket; only the
/// labels in that bucket are compared for equality. Lookup cost is then
/// logarithmic in the label count instead of linear.

use crate::bind::{BoundPattern, BoundSwitch};
use crate::hash::hash_str;

/// Label count from which string switches dispatch on hashes.
pub const HASH_DISPATCH_THRESHOLD: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<'a> {
    /// Select the arm with this declaration index.
    Arm(usize),
    /// No arm matches; only reachable when the switch has no catch-all.
    Fail,
    /// `input == label` selects `then`.
    Equals {
        label: &'a str,
        then: usize,
        otherwise: Box<Decision<'a>>,
    },
    /// `hash(input) < pivot`
    HashBelow {
        pivot: u64,
        below: Box<Decision<'a>>,
        rest: Box<Decision<'a>>,
    },
    /// `hash(input) == hash`
    HashEquals {
        hash: u64,
        then: Box<Decision<'a>>,
        otherwise: Box<Decision<'a>>,
    },
}

#[derive(Debug, Clone)]
pub struct DecisionTree<'a> {
    pub root: Decision<'a>,
    /// The input hash must be computed before entering `root`.
    pub uses_hash: bool,
}

#[derive(Debug, Clone, Copy)]
struct Keyed<'a> {
    hash: u64,
    label: &'a str,
    arm: usize,
}

pub fn lower_switch<'a>(switch: &BoundSwitch<'a>) -> DecisionTree<'a> {
    let mut literals = Vec::with_capacity(switch.arms.len());
    let mut fallback = Decision::Fail;
    for (index, arm) in switch.arms.iter().enumerate() {
        match arm.pattern {
            BoundPattern::Literal(label) => literals.push((label, index)),
            BoundPattern::Discard => {
                fallback = Decision::Arm(index);
                break;
            }
        }
    }

    if literals.len() < HASH_DISPATCH_THRESHOLD {
        return DecisionTree {
            root: chain(literals.into_iter(), &fallback),
            uses_hash: false,
        };
    }

    let mut keyed: Vec<Keyed<'a>> = literals
        .into_iter()
        .map(|(label, arm)| Keyed { hash: hash_str(label), label, arm })
        .collect();
    // Stable: labels sharing a hash stay in declaration order.
    keyed.sort_by_key(|entry| entry.hash);
    let buckets: Vec<&[Keyed<'a>]> = keyed.chunk_by(|a, b| a.hash == b.hash).collect();

    DecisionTree {
        root: split(&buckets, &fallback),
        uses_hash: true,
    }
}

fn chain<'a, I>(literals: I, fallback: &Decision<'a>) -> Decision<'a>
where
    I: DoubleEndedIterator<Item = (&'a str, usize)>,
{
    literals.rev().fold(fallback.clone(), |otherwise, (label, then)| Decision::Equals {
        label,
        then,
        otherwise: Box::new(otherwise),
    })
}

fn split<'a>(buckets: &[&[Keyed<'a>]], fallback: &Decision<'a>) -> Decision<'a> {
    match buckets {
        [] => fallback.clone(),
        [bucket] => Decision::HashEquals {
            hash: bucket[0].hash,
            then: Box::new(chain(
                bucket.iter().map(|entry| (entry.label, entry.arm)),
                fallback,
            )),
            otherwise: Box::new(fallback.clone()),
        },
        _ => {
            let mid = buckets.len() / 2;
            Decision::HashBelow {
                pivot: buckets[mid][0].hash,
                below: Box::new(split(&buckets[..mid], fallback)),
                rest: Box::new(split(&buckets[mid..], fallback)),
            }
        }
    }
}
