//! Grading many independent sheets with one shared grader.
//!
//! Each sheet's state is local to its own call, so the only requirement for
//! parallel use is a `Sync` detector and observer. With the `rayon` feature
//! sheets are processed on the rayon pool, otherwise one after another.

use image::DynamicImage;
use omr_core::DetectionBox;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::detector::MarkDetector;
use crate::observer::SheetObserver;
use crate::pipeline::{GradeRequest, OmrGrader};
use crate::scheme::MarkingOutcome;
use crate::GradeError;

impl<D, O> OmrGrader<D, O>
where
    D: MarkDetector + Sync,
    O: SheetObserver + Sync,
{
    /// Grade several decoded images with the same request; results keep the
    /// input order.
    pub fn grade_batch(
        &self,
        images: &[DynamicImage],
        request: &GradeRequest<'_>,
    ) -> Vec<Result<MarkingOutcome, GradeError>> {
        #[cfg(feature = "rayon")]
        let out = images
            .par_iter()
            .map(|img| self.grade_image(img, request))
            .collect();

        #[cfg(not(feature = "rayon"))]
        let out = images
            .iter()
            .map(|img| self.grade_image(img, request))
            .collect();

        out
    }

    /// Grade several recorded detection sets with the same request.
    pub fn grade_detection_batch(
        &self,
        sheets: &[Vec<DetectionBox>],
        request: &GradeRequest<'_>,
    ) -> Vec<Result<MarkingOutcome, GradeError>> {
        #[cfg(feature = "rayon")]
        let out = sheets
            .par_iter()
            .map(|boxes| self.grade_detections(boxes, request))
            .collect();

        #[cfg(not(feature = "rayon"))]
        let out = sheets
            .iter()
            .map(|boxes| self.grade_detections(boxes, request))
            .collect();

        out
    }
}
