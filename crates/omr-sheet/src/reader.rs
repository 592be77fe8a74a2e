use omr_core::{Mark, Roi};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::grid::{answer_grid, index_grid, Grid};
use crate::resolve::{disambiguate, resolve_marks, SlotAssignments, SlotResult};
use crate::{SheetBlock, SheetError, SheetLayout};

/// Everything derived from one block of one sheet.
#[derive(Clone, Debug)]
pub struct BlockReading {
    pub grid: Grid,
    pub assignments: SlotAssignments,
    pub slots: Vec<SlotResult>,
}

impl BlockReading {
    /// Slot outcomes concatenated in slot order (`"10X42M7"` style).
    pub fn text(&self) -> String {
        self.slots.iter().map(|s| s.outcome.as_char()).collect()
    }
}

/// Reads index numbers and answers off a sheet with a fixed layout.
#[derive(Clone, Debug)]
pub struct SheetReader {
    layout: SheetLayout,
}

impl SheetReader {
    /// Validate `layout` and build a reader for it.
    pub fn new(layout: SheetLayout) -> Result<Self, SheetError> {
        layout.validate()?;
        Ok(Self { layout })
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    /// Calculation rectangle for a raw detected block box.
    pub fn calculation_area(&self, block: SheetBlock, raw: &Roi) -> Result<Roi, SheetError> {
        let padding = match block {
            SheetBlock::Index => &self.layout.index.padding,
            SheetBlock::Answers => &self.layout.answers.padding,
        };
        raw.refine(padding)
            .map_err(|source| SheetError::DegenerateRoi { block, source })
    }

    /// Read the index number from the marks inside the raw index box.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self, marks), fields(marks = marks.len())))]
    pub fn read_index(&self, raw: &Roi, marks: &[Mark]) -> Result<BlockReading, SheetError> {
        let area = self.calculation_area(SheetBlock::Index, raw)?;
        let grid = index_grid(area, &self.layout.index);
        let assignments = resolve_marks(&grid, marks);
        let slots = disambiguate(&assignments, 0..self.layout.index.columns);
        log::debug!(
            "index: {} marks over {} anchors -> {}",
            marks.len(),
            grid.anchors.len(),
            slots.iter().map(|s| s.outcome.as_char()).collect::<String>()
        );
        Ok(BlockReading {
            grid,
            assignments,
            slots,
        })
    }

    /// Read answers `1..=total_questions` from the marks inside the raw
    /// answers box.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self, marks), fields(marks = marks.len())))]
    pub fn read_answers(
        &self,
        raw: &Roi,
        marks: &[Mark],
        total_questions: u32,
    ) -> Result<BlockReading, SheetError> {
        self.layout.check_question_count(total_questions)?;
        let area = self.calculation_area(SheetBlock::Answers, raw)?;
        let grid = answer_grid(area, &self.layout.answers);
        let assignments = resolve_marks(&grid, marks);
        let slots = disambiguate(&assignments, 1..=total_questions);

        let ignored = assignments
            .occupied_slots()
            .filter(|&q| q > total_questions)
            .count();
        if ignored > 0 {
            log::debug!("answers: {ignored} marked question(s) beyond {total_questions} ignored");
        }
        Ok(BlockReading {
            grid,
            assignments,
            slots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omr_core::{RoiError, SlotOutcome};

    #[test]
    fn reader_rejects_invalid_layout() {
        let mut layout = SheetLayout::default();
        layout.index.columns = 0;
        assert!(matches!(
            SheetReader::new(layout),
            Err(SheetError::InvalidLayout(_))
        ));
    }

    #[test]
    fn degenerate_box_is_reported_per_block() {
        let reader = SheetReader::new(SheetLayout::default()).expect("reader");
        let flat = Roi::new(10.0, 10.0, 500.0, 10.0);
        let err = reader.read_index(&flat, &[]).unwrap_err();
        assert!(matches!(
            err,
            SheetError::DegenerateRoi {
                block: SheetBlock::Index,
                source: RoiError::Degenerate { .. }
            }
        ));
    }

    #[test]
    fn empty_index_reads_all_x() {
        let reader = SheetReader::new(SheetLayout::default()).expect("reader");
        let reading = reader
            .read_index(&Roi::new(100.0, 100.0, 800.0, 700.0), &[])
            .expect("read");
        assert_eq!(reading.text(), "XXXXXXX");
    }

    #[test]
    fn answers_outside_requested_range_do_not_leak() {
        let reader = SheetReader::new(SheetLayout::default()).expect("reader");
        let raw = Roi::new(0.0, 0.0, 1000.0, 2000.0);
        let area = reader
            .calculation_area(SheetBlock::Answers, &raw)
            .expect("area");
        let grid = answer_grid(area, &reader.layout().answers);
        let far = grid
            .slot_anchors(150)
            .find(|a| a.label == 'B')
            .expect("anchor");
        let marks = [Mark {
            center: far.position,
            confidence: 0.7,
        }];

        let reading = reader.read_answers(&raw, &marks, 10).expect("read");
        assert_eq!(reading.slots.len(), 10);
        assert!(reading
            .slots
            .iter()
            .all(|s| s.outcome == SlotOutcome::Empty));
        assert_eq!(reading.assignments.labels(150), &['B']);
    }
}
