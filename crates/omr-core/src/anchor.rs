use std::fmt;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Character reported for a slot with no resolved mark.
pub const EMPTY_MARKER: char = 'X';
/// Character reported for a slot whose marks disagree.
pub const CONFLICT_MARKER: char = 'M';

/// Computed bubble center that detected marks are matched against.
///
/// `slot` is the index column (0-based) for the index grid and the question
/// number (1-based) for the answer grid. `label` is the digit or option letter
/// the bubble stands for.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub position: Point2<f32>,
    pub slot: u32,
    pub label: char,
}

impl Anchor {
    pub fn new(x: f32, y: f32, slot: u32, label: char) -> Self {
        Self {
            position: Point2::new(x, y),
            slot,
            label,
        }
    }
}

/// Resolved state of one slot.
///
/// Serialized as a single character: the label itself, `'X'` for
/// [`SlotOutcome::Empty`] and `'M'` for [`SlotOutcome::Conflict`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "char", from = "char")]
pub enum SlotOutcome {
    Empty,
    Value(char),
    Conflict,
}

impl SlotOutcome {
    /// Reduce the labels resolved into one slot.
    ///
    /// No labels gives `Empty`, a single distinct label gives that label, and
    /// two or more distinct labels give `Conflict` no matter how many marks
    /// back each one.
    pub fn from_labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        let mut outcome = SlotOutcome::Empty;
        for label in labels {
            outcome = match outcome {
                SlotOutcome::Empty => SlotOutcome::Value(label),
                SlotOutcome::Value(prev) if prev == label => outcome,
                _ => return SlotOutcome::Conflict,
            };
        }
        outcome
    }

    /// `true` for a single agreed label.
    #[inline]
    pub fn is_value(&self) -> bool {
        matches!(self, SlotOutcome::Value(_))
    }

    pub fn as_char(&self) -> char {
        match *self {
            SlotOutcome::Empty => EMPTY_MARKER,
            SlotOutcome::Value(c) => c,
            SlotOutcome::Conflict => CONFLICT_MARKER,
        }
    }
}

impl From<SlotOutcome> for char {
    fn from(outcome: SlotOutcome) -> char {
        outcome.as_char()
    }
}

impl From<char> for SlotOutcome {
    fn from(c: char) -> Self {
        match c {
            EMPTY_MARKER => SlotOutcome::Empty,
            CONFLICT_MARKER => SlotOutcome::Conflict,
            other => SlotOutcome::Value(other),
        }
    }
}

impl fmt::Display for SlotOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
