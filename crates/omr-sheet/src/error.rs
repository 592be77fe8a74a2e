use std::fmt;

use omr_core::RoiError;
use serde::{Deserialize, Serialize};

/// The two printed blocks of a bubble sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetBlock {
    Index,
    Answers,
}

impl fmt::Display for SheetBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SheetBlock::Index => "index",
            SheetBlock::Answers => "answers",
        })
    }
}

/// Errors returned while reading a sheet block.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SheetError {
    /// `found == 0` means the detector produced no box for the block,
    /// `found > 1` means it produced several and none is authoritative.
    #[error("{block} ROI not usable: detector produced {found} candidate(s), expected exactly 1")]
    MissingRoi { block: SheetBlock, found: usize },
    #[error("{block} ROI is degenerate after padding")]
    DegenerateRoi {
        block: SheetBlock,
        #[source]
        source: RoiError,
    },
    #[error("invalid sheet layout: {0}")]
    InvalidLayout(String),
    #[error("{requested} questions requested, answer grid holds {capacity}")]
    QuestionCapacity { requested: u32, capacity: u32 },
}
