use omr_sheet::SheetError;

use crate::detector::DetectorError;

/// Errors produced by the grading facade.
#[derive(thiserror::Error, Debug)]
pub enum GradeError {
    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("mark detector failed")]
    Detector(#[source] DetectorError),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
