use thiserror::Error;

use crate::machine::op::Label;

/// Structural problems found by `Program::validate`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A branch points outside `1..=max`, where `max` is one past the last
    /// occupied label count.
    #[error("instruction {label} branches to label {target}, valid targets are 1..={max}")]
    InvalidBranchTarget {
        label: Label,
        target: Label,
        max: Label,
    },

    #[error("program has {} stop instructions (labels {labels:?}), exactly one is allowed", labels.len())]
    MultipleHalts { labels: Vec<Label> },
}
