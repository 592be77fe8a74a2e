//! Nearest-anchor assignment of marks and per-slot reduction.

use std::collections::BTreeMap;

use nalgebra::{distance_squared, Point2};
use omr_core::{Anchor, Mark, SlotOutcome};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::Grid;

/// Labels resolved into each slot, in mark order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotAssignments {
    by_slot: BTreeMap<u32, Vec<char>>,
}

impl SlotAssignments {
    pub fn push(&mut self, slot: u32, label: char) {
        self.by_slot.entry(slot).or_default().push(label);
    }

    pub fn labels(&self, slot: u32) -> &[char] {
        self.by_slot.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.by_slot.is_empty()
    }

    /// Slots that received at least one mark.
    pub fn occupied_slots(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_slot.keys().copied()
    }

    pub fn outcome(&self, slot: u32) -> SlotOutcome {
        SlotOutcome::from_labels(self.labels(slot).iter().copied())
    }
}

/// Outcome for a single slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotResult {
    pub slot: u32,
    pub outcome: SlotOutcome,
}

/// Closest anchor to `p`; the first of several equally close anchors wins.
pub fn nearest_anchor(anchors: &[Anchor], p: Point2<f32>) -> Option<&Anchor> {
    let mut best: Option<(&Anchor, f32)> = None;
    for anchor in anchors {
        let d2 = distance_squared(&anchor.position, &p);
        match best {
            Some((_, best_d2)) if d2 >= best_d2 => {}
            _ => best = Some((anchor, d2)),
        }
    }
    best.map(|(anchor, _)| anchor)
}

/// Assign every mark to its nearest anchor and group labels by slot.
///
/// Full scan over the grid; anchor counts are small enough that no spatial
/// index pays off.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(grid, marks), fields(block = %grid.block, marks = marks.len()))
)]
pub fn resolve_marks(grid: &Grid, marks: &[Mark]) -> SlotAssignments {
    let mut out = SlotAssignments::default();
    for mark in marks {
        if let Some(anchor) = nearest_anchor(&grid.anchors, mark.center) {
            log::trace!(
                "{} mark ({:.1}, {:.1}) -> slot {} '{}'",
                grid.block,
                mark.center.x,
                mark.center.y,
                anchor.slot,
                anchor.label
            );
            out.push(anchor.slot, anchor.label);
        }
    }
    out
}

/// Reduce the assignments of the requested slots, in the order given.
///
/// Slots that received no mark come out as [`SlotOutcome::Empty`]; marks in
/// slots that are not requested are ignored.
pub fn disambiguate<I>(assignments: &SlotAssignments, slots: I) -> Vec<SlotResult>
where
    I: IntoIterator<Item = u32>,
{
    slots
        .into_iter()
        .map(|slot| SlotResult {
            slot,
            outcome: assignments.outcome(slot),
        })
        .collect()
}
