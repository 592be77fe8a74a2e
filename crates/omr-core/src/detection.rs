use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::Roi;

/// Object classes emitted by the upstream sheet detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionClass {
    /// A filled-in bubble.
    Mark,
    /// The index-number block.
    IndexRoi,
    /// The answers block.
    AnswersRoi,
}

impl DetectionClass {
    /// Class id used by the reference detector model.
    pub fn class_id(self) -> u32 {
        match self {
            DetectionClass::Mark => 0,
            DetectionClass::IndexRoi => 1,
            DetectionClass::AnswersRoi => 2,
        }
    }

    pub fn from_class_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(DetectionClass::Mark),
            1 => Some(DetectionClass::IndexRoi),
            2 => Some(DetectionClass::AnswersRoi),
            _ => None,
        }
    }
}

/// One classified bounding box, in pixel coordinates of the resized image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub class: DetectionClass,
    pub confidence: f32,
}

impl DetectionBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, class: DetectionClass, confidence: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            class,
            confidence,
        }
    }

    #[inline]
    pub fn center(&self) -> Point2<f32> {
        Point2::new((self.x1 + self.x2) * 0.5, (self.y1 + self.y2) * 0.5)
    }

    /// The box as a region of interest (no ordering fix-up is applied).
    #[inline]
    pub fn to_roi(&self) -> Roi {
        Roi::new(self.x1, self.y1, self.x2, self.y2)
    }

    /// Centroid mark for this box.
    #[inline]
    pub fn to_mark(&self) -> Mark {
        Mark {
            center: self.center(),
            confidence: self.confidence,
        }
    }
}

/// Centroid of a detected ink mark.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub center: Point2<f32>,
    pub confidence: f32,
}

impl Mark {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self {
            center: Point2::new(x, y),
            confidence,
        }
    }
}
