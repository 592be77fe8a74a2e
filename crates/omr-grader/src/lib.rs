//! Scheme building and script grading for photographed bubble sheets.
//!
//! This crate provides:
//! - the detector capability boundary ([`MarkDetector`]) and the adapter
//!   that splits one detection pass into block boxes and marks,
//! - the end-to-end [`OmrGrader`] that reads the index and answer blocks and
//!   either emits an answer key (scheme mode) or grades against one (script
//!   mode),
//! - JSON helpers for configs, recorded detections, keys and outcomes.
//!
//! ## Quickstart
//!
//! ```no_run
//! use omr_grader::{GradeRequest, GraderParams, OmrGrader, RecordedDetections};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detections = RecordedDetections::load_json("reference_sheet.json")?;
//! let grader = OmrGrader::new(detections.clone(), GraderParams::default())?;
//!
//! let key = grader.grade_detections(&detections.boxes, &GradeRequest::scheme(60))?;
//! let key = key.scheme().cloned().unwrap_or_default();
//!
//! let script = grader.grade_path("student.jpg", &GradeRequest::script(60, &key))?;
//! println!("{}", serde_json::to_string_pretty(&script)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `omr_grader::core`: boxes, rectangles, marks, anchors, slot outcomes.
//! - `omr_grader::sheet`: layout, grid generation, mark resolution.

pub use omr_core as core;
pub use omr_sheet as sheet;

mod batch;
mod detector;
mod error;
mod observer;
mod pipeline;
mod scheme;
mod sheet_image;

pub use detector::{
    boxes_from_raw, DetectionParams, DetectorError, MarkDetector, RawDetection,
    RecordedDetections, SheetDetections,
};
pub use error::GradeError;
pub use observer::{LogObserver, NoopObserver, SheetObserver};
pub use pipeline::{GradeRequest, GraderParams, GradingMode, OmrGrader};
pub use scheme::{
    build_scheme, grade_script, CorrectAnswer, GradedAnswer, GradingResult, MarkScheme,
    MarkingOutcome, SchemeEntry,
};
pub use sheet_image::{load_sheet_image, prepare_image, ImageSize};

pub use omr_core::{DetectionBox, DetectionClass, Mark, Roi, SlotOutcome};
pub use omr_sheet::{SheetBlock, SheetError, SheetLayout};
