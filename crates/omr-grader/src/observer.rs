//! Optional diagnostic sink for intermediate geometry.

use omr_core::Roi;
use omr_sheet::BlockReading;

use crate::detector::SheetDetections;

/// Receives intermediate geometry while a sheet is graded.
///
/// Every method defaults to a no-op; grading never depends on what an
/// observer does.
pub trait SheetObserver {
    fn on_detections(&self, _detections: &SheetDetections) {}

    /// Called once per block read, with the raw detected box.
    fn on_block(&self, _raw: &Roi, _reading: &BlockReading) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl SheetObserver for NoopObserver {}

/// Observer that writes the geometry to the `log` facade at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl SheetObserver for LogObserver {
    fn on_detections(&self, detections: &SheetDetections) {
        log::debug!(
            "detections: {} mark(s), {} index box(es), {} answers box(es), {} dropped",
            detections.marks.len(),
            detections.index_rois.len(),
            detections.answers_rois.len(),
            detections.dropped
        );
    }

    fn on_block(&self, raw: &Roi, reading: &BlockReading) {
        let grid = &reading.grid;
        log::debug!(
            "{}: raw [{:.1}, {:.1}, {:.1}, {:.1}] -> area [{:.1}, {:.1}, {:.1}, {:.1}]",
            grid.block,
            raw.x_start,
            raw.y_start,
            raw.x_end,
            raw.y_end,
            grid.area.x_start,
            grid.area.y_start,
            grid.area.x_end,
            grid.area.y_end
        );
        log::debug!(
            "{}: {} column band(s), {} row band(s), {} anchor(s)",
            grid.block,
            grid.columns.len(),
            grid.rows.len(),
            grid.anchors.len()
        );
        log::debug!("{}: outcomes {}", grid.block, reading.text());
    }
}

impl<T: SheetObserver + ?Sized> SheetObserver for &T {
    fn on_detections(&self, detections: &SheetDetections) {
        (**self).on_detections(detections)
    }

    fn on_block(&self, raw: &Roi, reading: &BlockReading) {
        (**self).on_block(raw, reading)
    }
}
