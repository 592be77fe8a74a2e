//! Bubble-sheet reading: grid reconstruction and mark disambiguation.
//!
//! Pipeline for one block:
//! - refine the detected block box into a calculation rectangle,
//! - generate the semantic anchors (digit bubbles or option bubbles),
//! - snap every mark to its nearest anchor and group labels per slot,
//! - reduce each slot to empty, a single label, or a conflict.
//!
//! Detection and grading live in `omr-grader`.

mod error;
pub mod grid;
mod layout;
mod reader;
pub mod resolve;

pub use error::{SheetBlock, SheetError};
pub use grid::{answer_grid, index_grid, Band, Grid};
pub use layout::{
    AnswerBlockLayout, ColumnBand, IndexBlockLayout, SheetLayout, MAX_INDEX_COLUMNS, MAX_OPTIONS,
    MAX_QUESTIONS, UNKNOWN_MARKER,
};
pub use reader::{BlockReading, SheetReader};
pub use resolve::{disambiguate, nearest_anchor, resolve_marks, SlotAssignments, SlotResult};

pub use omr_core::{Anchor, Mark, Roi, RoiPadding, SlotOutcome};
