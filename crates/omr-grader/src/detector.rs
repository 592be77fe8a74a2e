//! The detector capability boundary and the detection adapter.
//!
//! A [`MarkDetector`] turns a resized sheet image into classified boxes. The
//! adapter ([`SheetDetections`]) partitions one detection pass into the two
//! block boxes and the mark centroids; marks are then filtered into each
//! block independently.

use std::fs;
use std::path::Path;

use image::RgbImage;
use omr_core::{DetectionBox, DetectionClass, Mark, Roi};
use omr_sheet::{SheetBlock, SheetError};
use serde::{Deserialize, Serialize};

use crate::GradeError;

/// Error type reported by detector implementations.
pub type DetectorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Thresholds handed to the detector model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    /// Minimum box confidence. The adapter also drops boxes below it.
    pub confidence: f32,
    /// IoU threshold for the model's non-maximum suppression.
    pub iou: f32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            confidence: 0.25,
            iou: 0.7,
        }
    }
}

/// Object detector capability: image in, classified boxes out.
///
/// Implementations wrap a real model, a stub, or a recorded fixture. Load the
/// model once; share it across threads if it is `Sync`, or pool one instance
/// per worker otherwise.
pub trait MarkDetector {
    fn detect(
        &self,
        image: &RgbImage,
        params: &DetectionParams,
    ) -> Result<Vec<DetectionBox>, DetectorError>;
}

impl<F> MarkDetector for F
where
    F: Fn(&RgbImage, &DetectionParams) -> Result<Vec<DetectionBox>, DetectorError>,
{
    fn detect(
        &self,
        image: &RgbImage,
        params: &DetectionParams,
    ) -> Result<Vec<DetectionBox>, DetectorError> {
        self(image, params)
    }
}

/// Raw model output row: `xyxy` box, numeric class id, confidence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub xyxy: [f32; 4],
    pub class_id: u32,
    pub confidence: f32,
}

/// Convert raw model rows into typed boxes, dropping unknown class ids.
pub fn boxes_from_raw(raw: &[RawDetection]) -> Vec<DetectionBox> {
    raw.iter()
        .filter_map(|r| {
            let Some(class) = DetectionClass::from_class_id(r.class_id) else {
                log::warn!("ignoring detection with unknown class id {}", r.class_id);
                return None;
            };
            let [x1, y1, x2, y2] = r.xyxy;
            Some(DetectionBox::new(x1, y1, x2, y2, class, r.confidence))
        })
        .collect()
}

/// Detector that replays a fixed list of boxes for every image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordedDetections {
    pub boxes: Vec<DetectionBox>,
}

impl RecordedDetections {
    pub fn new(boxes: Vec<DetectionBox>) -> Self {
        Self { boxes }
    }

    /// Replay raw model rows; rows with unknown class ids are skipped.
    pub fn from_raw(raw: &[RawDetection]) -> Self {
        Self::new(boxes_from_raw(raw))
    }

    /// Load a JSON array from disk, holding either typed boxes or raw model
    /// rows.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, GradeError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum DetectionsFile {
            Boxes(Vec<DetectionBox>),
            Raw(Vec<RawDetection>),
        }

        let raw = fs::read_to_string(path)?;
        Ok(match serde_json::from_str(&raw)? {
            DetectionsFile::Boxes(boxes) => Self::new(boxes),
            DetectionsFile::Raw(rows) => Self::from_raw(&rows),
        })
    }

    /// Write the boxes to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), GradeError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl MarkDetector for RecordedDetections {
    fn detect(
        &self,
        _image: &RgbImage,
        _params: &DetectionParams,
    ) -> Result<Vec<DetectionBox>, DetectorError> {
        Ok(self.boxes.clone())
    }
}

/// One detection pass split by class.
///
/// Block boxes are kept as lists so that a missing or repeated block can be
/// reported instead of guessed at.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SheetDetections {
    pub index_rois: Vec<Roi>,
    pub answers_rois: Vec<Roi>,
    pub marks: Vec<Mark>,
    /// Boxes dropped for falling below the confidence floor.
    pub dropped: usize,
}

impl SheetDetections {
    /// Partition raw boxes, keeping only those at or above `min_confidence`.
    pub fn from_boxes(boxes: &[DetectionBox], min_confidence: f32) -> Self {
        let mut out = SheetDetections::default();
        for b in boxes {
            if b.confidence < min_confidence {
                out.dropped += 1;
                continue;
            }
            match b.class {
                DetectionClass::Mark => out.marks.push(b.to_mark()),
                DetectionClass::IndexRoi => out.index_rois.push(b.to_roi()),
                DetectionClass::AnswersRoi => out.answers_rois.push(b.to_roi()),
            }
        }
        if out.dropped > 0 {
            log::warn!(
                "dropped {} box(es) below confidence {min_confidence}",
                out.dropped
            );
        }
        out
    }

    /// The single detected box for `block`.
    pub fn roi(&self, block: SheetBlock) -> Result<Roi, SheetError> {
        let candidates = match block {
            SheetBlock::Index => &self.index_rois,
            SheetBlock::Answers => &self.answers_rois,
        };
        match candidates.as_slice() {
            [roi] => Ok(*roi),
            other => Err(SheetError::MissingRoi {
                block,
                found: other.len(),
            }),
        }
    }

    /// Marks whose centroid lies inside `roi` (half-open test).
    pub fn marks_in(&self, roi: &Roi) -> Vec<Mark> {
        self.marks
            .iter()
            .filter(|m| roi.contains(m.center))
            .copied()
            .collect()
    }
}
