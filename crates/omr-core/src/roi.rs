//! Axis-aligned regions of interest and the padding-based refiner.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in image pixel coordinates.
///
/// Containment is half-open: `x_start <= x < x_end` and `y_start <= y < y_end`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub x_start: f32,
    pub y_start: f32,
    pub x_end: f32,
    pub y_end: f32,
}

/// Errors produced while refining a region of interest.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum RoiError {
    #[error("refined rectangle is degenerate (width={width}, height={height})")]
    Degenerate { width: f32, height: f32 },
}

impl Roi {
    pub fn new(x_start: f32, y_start: f32, x_end: f32, y_end: f32) -> Self {
        Self {
            x_start,
            y_start,
            x_end,
            y_end,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.x_end - self.x_start
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y_end - self.y_start
    }

    #[inline]
    pub fn origin(&self) -> Point2<f32> {
        Point2::new(self.x_start, self.y_start)
    }

    /// Half-open containment test used to assign marks to a block.
    #[inline]
    pub fn contains(&self, p: Point2<f32>) -> bool {
        self.x_start <= p.x && p.x < self.x_end && self.y_start <= p.y && p.y < self.y_end
    }

    /// Closed containment test, used when checking generated geometry.
    #[inline]
    pub fn contains_closed(&self, p: Point2<f32>) -> bool {
        self.x_start <= p.x && p.x <= self.x_end && self.y_start <= p.y && p.y <= self.y_end
    }

    /// `true` when both extents are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        let (w, h) = (self.width(), self.height());
        w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0
    }

    /// Shrink this rectangle inward by per-side ratios of its own extent.
    ///
    /// Left/right padding is `ratio * width`, top/bottom padding is
    /// `ratio * height`. The raw extents are used for all four sides, so the
    /// ratios do not compound.
    pub fn refine(&self, padding: &RoiPadding) -> Result<Roi, RoiError> {
        let w = self.width();
        let h = self.height();
        let refined = Roi {
            x_start: self.x_start + padding.left * w,
            y_start: self.y_start + padding.top * h,
            x_end: self.x_end - padding.right * w,
            y_end: self.y_end - padding.bottom * h,
        };
        if !refined.is_valid() {
            return Err(RoiError::Degenerate {
                width: refined.width(),
                height: refined.height(),
            });
        }
        Ok(refined)
    }
}

/// Per-side inward padding, each expressed as a fraction of the raw extent on
/// that side's axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiPadding {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl RoiPadding {
    pub const ZERO: RoiPadding = RoiPadding {
        left: 0.0,
        right: 0.0,
        top: 0.0,
        bottom: 0.0,
    };

    /// Trim that isolates the digit matrix inside a detected index box.
    pub fn index_block() -> Self {
        Self {
            left: 0.05,
            right: 0.05,
            top: 0.095,
            bottom: 0.08,
        }
    }

    /// Trim that isolates the bubble matrix inside a detected answers box.
    pub fn answer_block() -> Self {
        Self {
            left: 0.05,
            right: 0.04,
            top: 0.04,
            bottom: 0.04,
        }
    }
}

impl Default for RoiPadding {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn refine_applies_each_side_independently() {
        let raw = Roi::new(100.0, 200.0, 300.0, 600.0);
        let refined = raw.refine(&RoiPadding::index_block()).expect("refine");

        assert_relative_eq!(refined.x_start, 110.0, epsilon = 1e-3);
        assert_relative_eq!(refined.x_end, 290.0, epsilon = 1e-3);
        assert_relative_eq!(refined.y_start, 238.0, epsilon = 1e-3);
        assert_relative_eq!(refined.y_end, 568.0, epsilon = 1e-3);
    }

    #[test]
    fn refine_with_asymmetric_horizontal_padding() {
        let raw = Roi::new(0.0, 0.0, 1000.0, 1000.0);
        let refined = raw.refine(&RoiPadding::answer_block()).expect("refine");

        assert_relative_eq!(refined.x_start, 50.0, epsilon = 1e-3);
        assert_relative_eq!(refined.x_end, 960.0, epsilon = 1e-3);
        assert_relative_eq!(refined.y_start, 40.0, epsilon = 1e-3);
        assert_relative_eq!(refined.y_end, 960.0, epsilon = 1e-3);
    }

    #[test]
    fn refine_rejects_collapsed_rectangle() {
        let raw = Roi::new(0.0, 0.0, 100.0, 100.0);
        let padding = RoiPadding {
            left: 0.5,
            right: 0.5,
            ..RoiPadding::ZERO
        };
        let err = raw.refine(&padding).unwrap_err();
        assert!(matches!(err, RoiError::Degenerate { width, .. } if width <= 0.0));
    }

    #[test]
    fn refine_rejects_inverted_input() {
        let raw = Roi::new(50.0, 50.0, 10.0, 100.0);
        assert!(raw.refine(&RoiPadding::ZERO).is_err());
    }

    #[test]
    fn containment_is_half_open() {
        let roi = Roi::new(0.0, 0.0, 10.0, 10.0);
        assert!(roi.contains(Point2::new(0.0, 0.0)));
        assert!(roi.contains(Point2::new(9.999, 5.0)));
        assert!(!roi.contains(Point2::new(10.0, 5.0)));
        assert!(!roi.contains(Point2::new(5.0, 10.0)));
        assert!(roi.contains_closed(Point2::new(10.0, 10.0)));
    }

    #[test]
    fn padding_defaults_fill_missing_fields() {
        let p: RoiPadding = serde_json::from_str(r#"{"top": 0.1}"#).expect("json");
        assert_eq!(
            p,
            RoiPadding {
                top: 0.1,
                ..RoiPadding::ZERO
            }
        );
    }
}
