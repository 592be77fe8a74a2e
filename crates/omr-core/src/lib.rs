//! Core types shared by the bubble-sheet recognition stages.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete detector, image type or sheet layout: it only knows
//! about detector boxes, rectangles, marks, anchors and slot outcomes.

mod anchor;
mod detection;
mod logger;
mod roi;

pub use anchor::{Anchor, SlotOutcome, CONFLICT_MARKER, EMPTY_MARKER};
pub use detection::{DetectionBox, DetectionClass, Mark};
pub use roi::{Roi, RoiError, RoiPadding};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
