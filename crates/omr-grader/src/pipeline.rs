//! End-to-end grading of one sheet.
//!
//! Stages run as plain functions over immutable values:
//! detection boxes -> [`SheetDetections`] -> per-block [`BlockReading`]
//! -> scheme or graded script.

use std::fs;
use std::path::Path;

use image::DynamicImage;
use omr_core::DetectionBox;
use omr_sheet::{BlockReading, SheetBlock, SheetLayout, SheetReader};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::detector::{DetectionParams, MarkDetector, SheetDetections};
use crate::observer::{NoopObserver, SheetObserver};
use crate::scheme::{build_scheme, grade_script, MarkScheme, MarkingOutcome};
use crate::sheet_image::{load_sheet_image, prepare_image, ImageSize};
use crate::GradeError;

/// Configuration for the grader.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraderParams {
    pub image_size: ImageSize,
    pub detection: DetectionParams,
    pub layout: SheetLayout,
}

impl GraderParams {
    /// Load a JSON config from disk; missing fields keep their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, GradeError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), GradeError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Which pass a sheet is processed in.
#[derive(Clone, Copy, Debug)]
pub enum GradingMode<'a> {
    /// Reference sheet: its answers become the key.
    Scheme,
    /// Student sheet, graded against a previously built key.
    Script(&'a MarkScheme),
}

/// Per-sheet request.
#[derive(Clone, Copy, Debug)]
pub struct GradeRequest<'a> {
    pub total_questions: u32,
    pub mode: GradingMode<'a>,
}

impl<'a> GradeRequest<'a> {
    pub fn scheme(total_questions: u32) -> Self {
        Self {
            total_questions,
            mode: GradingMode::Scheme,
        }
    }

    pub fn script(total_questions: u32, scheme: &'a MarkScheme) -> Self {
        Self {
            total_questions,
            mode: GradingMode::Script(scheme),
        }
    }
}

/// Bubble-sheet grader: detector + sheet reader + optional observer.
pub struct OmrGrader<D, O = NoopObserver> {
    params: GraderParams,
    reader: SheetReader,
    detector: D,
    observer: O,
}

impl<D: MarkDetector> OmrGrader<D> {
    /// Validate the layout and build a grader around `detector`.
    pub fn new(detector: D, params: GraderParams) -> Result<Self, GradeError> {
        let reader = SheetReader::new(params.layout.clone())?;
        Ok(Self {
            params,
            reader,
            detector,
            observer: NoopObserver,
        })
    }
}

impl<D: MarkDetector, O: SheetObserver> OmrGrader<D, O> {
    /// Replace the diagnostic observer.
    pub fn with_observer<O2: SheetObserver>(self, observer: O2) -> OmrGrader<D, O2> {
        OmrGrader {
            params: self.params,
            reader: self.reader,
            detector: self.detector,
            observer,
        }
    }

    pub fn params(&self) -> &GraderParams {
        &self.params
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Load, resize, detect and grade a sheet stored on disk.
    pub fn grade_path(
        &self,
        path: impl AsRef<Path>,
        request: &GradeRequest<'_>,
    ) -> Result<MarkingOutcome, GradeError> {
        let image = load_sheet_image(path)?;
        self.grade_image(&image, request)
    }

    /// Resize, detect and grade a decoded sheet image.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, image, request), fields(width = image.width(), height = image.height()))
    )]
    pub fn grade_image(
        &self,
        image: &DynamicImage,
        request: &GradeRequest<'_>,
    ) -> Result<MarkingOutcome, GradeError> {
        let resized = prepare_image(image, self.params.image_size);
        let boxes = self
            .detector
            .detect(&resized, &self.params.detection)
            .map_err(GradeError::Detector)?;
        log::debug!("detector returned {} box(es)", boxes.len());
        self.grade_detections(&boxes, request)
    }

    /// Grade from detector output already in working-size pixel coordinates.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, boxes, request), fields(boxes = boxes.len(), questions = request.total_questions))
    )]
    pub fn grade_detections(
        &self,
        boxes: &[DetectionBox],
        request: &GradeRequest<'_>,
    ) -> Result<MarkingOutcome, GradeError> {
        let detections = SheetDetections::from_boxes(boxes, self.params.detection.confidence);
        self.observer.on_detections(&detections);

        match request.mode {
            GradingMode::Scheme => {
                let answers = self.read_answers(&detections, request.total_questions)?;
                let scheme = build_scheme(&answers.slots);
                log::info!("built scheme with {} entries", scheme.len());
                Ok(MarkingOutcome::Scheme { scheme })
            }
            GradingMode::Script(scheme) => {
                let index = self.read_index(&detections)?;
                let answers = self.read_answers(&detections, request.total_questions)?;

                if scheme.len() < request.total_questions as usize {
                    log::warn!(
                        "scheme has {} entries for {} questions; uncovered questions are graded against '?'",
                        scheme.len(),
                        request.total_questions
                    );
                }

                let result = grade_script(
                    index.text(),
                    &answers.slots,
                    scheme,
                    request.total_questions,
                );
                log::info!(
                    "script {}: score {}/{}",
                    result.index_number,
                    result.score,
                    result.out_of
                );
                Ok(MarkingOutcome::Script(result))
            }
        }
    }

    fn read_index(&self, detections: &SheetDetections) -> Result<BlockReading, GradeError> {
        let raw = detections.roi(SheetBlock::Index)?;
        let marks = detections.marks_in(&raw);
        let reading = self.reader.read_index(&raw, &marks)?;
        self.observer.on_block(&raw, &reading);
        Ok(reading)
    }

    fn read_answers(
        &self,
        detections: &SheetDetections,
        total_questions: u32,
    ) -> Result<BlockReading, GradeError> {
        let raw = detections.roi(SheetBlock::Answers)?;
        let marks = detections.marks_in(&raw);
        let reading = self.reader.read_answers(&raw, &marks, total_questions)?;
        self.observer.on_block(&raw, &reading);
        Ok(reading)
    }
}
