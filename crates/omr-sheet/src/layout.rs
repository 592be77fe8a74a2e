//! Structural parameters of the printed sheet.
//!
//! The defaults reproduce the calibrated layout of the reference answer
//! sheet: a 7-digit index block and a 5-column, 200-question answer block.

use omr_core::{RoiPadding, CONFLICT_MARKER, EMPTY_MARKER};
use serde::{Deserialize, Serialize};

use crate::SheetError;

/// Reserved for a correct answer that the scheme does not cover.
pub const UNKNOWN_MARKER: char = '?';

/// Upper bound on index columns a layout may declare.
pub const MAX_INDEX_COLUMNS: u32 = 64;
/// Upper bound on answer options per question.
pub const MAX_OPTIONS: usize = 26;
/// Upper bound on the questions one answer block may hold.
pub const MAX_QUESTIONS: u32 = 10_000;

/// Index-number block: equal column bands, equal digit rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexBlockLayout {
    /// Characters in the index number, one column each.
    pub columns: u32,
    /// Digit rows per column, labelled `'0'` upwards.
    pub digits: u32,
    pub padding: RoiPadding,
}

impl Default for IndexBlockLayout {
    fn default() -> Self {
        Self {
            columns: 7,
            digits: 10,
            padding: RoiPadding::index_block(),
        }
    }
}

/// Horizontal extent of one answer column, as fractions of the block width.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnBand {
    pub start: f32,
    pub end: f32,
}

impl ColumnBand {
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }
}

/// Answer block: calibrated column bands, grouped rows with gaps between
/// groups, and a fixed ordered option set per row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerBlockLayout {
    pub columns: Vec<ColumnBand>,
    pub groups_per_column: u32,
    pub rows_per_group: u32,
    /// Vertical gap between consecutive groups, as a fraction of block height.
    pub group_gap: f32,
    pub options: Vec<char>,
    pub padding: RoiPadding,
}

impl Default for AnswerBlockLayout {
    fn default() -> Self {
        const W: f32 = 965.0;
        Self {
            columns: vec![
                ColumnBand::new(35.0 / W, 175.0 / W),
                ColumnBand::new(235.0 / W, 375.0 / W),
                ColumnBand::new(435.0 / W, 570.0 / W),
                ColumnBand::new(635.0 / W, 770.0 / W),
                ColumnBand::new(830.0 / W, 965.0 / W),
            ],
            groups_per_column: 8,
            rows_per_group: 5,
            group_gap: 0.022,
            options: vec!['A', 'B', 'C', 'D', 'E'],
            padding: RoiPadding::answer_block(),
        }
    }
}

impl AnswerBlockLayout {
    /// Questions per column; saturates instead of overflowing.
    #[inline]
    pub fn questions_per_column(&self) -> u32 {
        self.groups_per_column.saturating_mul(self.rows_per_group)
    }

    /// Number of questions the block can hold; saturates instead of
    /// overflowing.
    #[inline]
    pub fn capacity(&self) -> u32 {
        u32::try_from(self.columns.len())
            .unwrap_or(u32::MAX)
            .saturating_mul(self.questions_per_column())
    }

    /// Exact question count, `None` when it does not fit in a `u32`.
    fn checked_capacity(&self) -> Option<u32> {
        let per_column = self.groups_per_column.checked_mul(self.rows_per_group)?;
        u32::try_from(self.columns.len())
            .ok()?
            .checked_mul(per_column)
    }

    /// Row height as a fraction of block height.
    pub fn row_height_ratio(&self) -> f32 {
        let gaps = self.groups_per_column.saturating_sub(1) as f32;
        (1.0 - gaps * self.group_gap) / self.questions_per_column() as f32
    }
}

/// Complete sheet layout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    pub index: IndexBlockLayout,
    pub answers: AnswerBlockLayout,
}

impl SheetLayout {
    /// Reject layouts that cannot produce a well-formed grid.
    pub fn validate(&self) -> Result<(), SheetError> {
        let invalid = |msg: String| Err(SheetError::InvalidLayout(msg));

        if !(1..=MAX_INDEX_COLUMNS).contains(&self.index.columns) {
            return invalid(format!(
                "index columns must be in 1..={MAX_INDEX_COLUMNS}, got {}",
                self.index.columns
            ));
        }
        if !(1..=10).contains(&self.index.digits) {
            return invalid(format!(
                "index digits must be in 1..=10, got {}",
                self.index.digits
            ));
        }

        let answers = &self.answers;
        if answers.columns.is_empty() {
            return invalid("answer block needs at least one column".into());
        }
        let mut prev_end = 0.0f32;
        for (i, band) in answers.columns.iter().enumerate() {
            let in_unit = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
            if !in_unit(band.start) || !in_unit(band.end) || band.start >= band.end {
                return invalid(format!(
                    "answer column {i} has invalid band [{}, {}]",
                    band.start, band.end
                ));
            }
            if band.start < prev_end {
                return invalid(format!("answer column {i} overlaps the previous column"));
            }
            prev_end = band.end;
        }
        if answers.groups_per_column == 0 || answers.rows_per_group == 0 {
            return invalid("answer block needs at least one group and one row".into());
        }
        match answers.checked_capacity() {
            Some(capacity) if capacity <= MAX_QUESTIONS => {}
            _ => {
                return invalid(format!(
                    "answer block holds more than {MAX_QUESTIONS} questions \
                     ({} columns x {} groups x {} rows)",
                    answers.columns.len(),
                    answers.groups_per_column,
                    answers.rows_per_group
                ));
            }
        }
        if !answers.group_gap.is_finite() || answers.group_gap < 0.0 {
            return invalid(format!("group gap must be >= 0, got {}", answers.group_gap));
        }
        if answers.row_height_ratio() <= 0.0 {
            return invalid("group gaps leave no room for rows".into());
        }
        if answers.options.is_empty() || answers.options.len() > MAX_OPTIONS {
            return invalid(format!(
                "answer rows need 1..={MAX_OPTIONS} options, got {}",
                answers.options.len()
            ));
        }
        for (i, &opt) in answers.options.iter().enumerate() {
            if [EMPTY_MARKER, CONFLICT_MARKER, UNKNOWN_MARKER].contains(&opt) {
                return invalid(format!("option label '{opt}' is a reserved marker"));
            }
            if answers.options[..i].contains(&opt) {
                return invalid(format!("option label '{opt}' appears twice"));
            }
        }
        Ok(())
    }

    /// Fail when more questions are requested than the answer grid holds.
    pub fn check_question_count(&self, total_questions: u32) -> Result<(), SheetError> {
        let capacity = self.answers.capacity();
        if total_questions > capacity {
            return Err(SheetError::QuestionCapacity {
                requested: total_questions,
                capacity,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_layout_is_valid() {
        let layout = SheetLayout::default();
        layout.validate().expect("valid");
        assert_eq!(layout.answers.capacity(), 200);
        assert_relative_eq!(
            layout.answers.row_height_ratio(),
            (1.0 - 7.0 * 0.022) / 40.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn reserved_option_labels_are_rejected() {
        let mut layout = SheetLayout::default();
        layout.answers.options = vec!['A', 'X'];
        assert!(matches!(
            layout.validate(),
            Err(SheetError::InvalidLayout(_))
        ));
    }

    #[test]
    fn overlapping_bands_are_rejected() {
        let mut layout = SheetLayout::default();
        layout.answers.columns = vec![ColumnBand::new(0.0, 0.5), ColumnBand::new(0.4, 0.9)];
        assert!(layout.validate().is_err());
    }

    #[test]
    fn oversized_gaps_are_rejected() {
        let mut layout = SheetLayout::default();
        layout.answers.group_gap = 0.2;
        assert!(layout.validate().is_err());
    }

    #[test]
    fn question_count_is_bounded_by_capacity() {
        let layout = SheetLayout::default();
        layout.check_question_count(200).expect("fits");
        assert_eq!(
            layout.check_question_count(201),
            Err(SheetError::QuestionCapacity {
                requested: 201,
                capacity: 200
            })
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let layout: SheetLayout =
            serde_json::from_str(r#"{"answers": {"options": ["A", "B", "C", "D"]}}"#)
                .expect("json");
        assert_eq!(layout.answers.options.len(), 4);
        assert_eq!(layout.answers.columns.len(), 5);
        assert_eq!(layout.index, IndexBlockLayout::default());
    }

    #[test]
    fn oversized_answer_grid_is_rejected_without_overflow() {
        let layout: SheetLayout = serde_json::from_str(
            r#"{"answers": {"groups_per_column": 100000, "rows_per_group": 100000}}"#,
        )
        .expect("json");
        assert_eq!(layout.answers.questions_per_column(), u32::MAX);
        assert_eq!(layout.answers.capacity(), u32::MAX);
        assert!(matches!(
            layout.validate(),
            Err(SheetError::InvalidLayout(_))
        ));
    }

    #[test]
    fn large_but_representable_grid_is_still_capped() {
        let mut layout = SheetLayout::default();
        layout.answers.groups_per_column = 1000;
        layout.answers.rows_per_group = 5;
        layout.answers.group_gap = 0.0;
        assert!(matches!(
            layout.validate(),
            Err(SheetError::InvalidLayout(_))
        ));
    }

    #[test]
    fn index_and_option_counts_are_bounded() {
        let mut layout = SheetLayout::default();
        layout.index.columns = MAX_INDEX_COLUMNS + 1;
        assert!(layout.validate().is_err());
        layout.index.columns = MAX_INDEX_COLUMNS;
        layout.validate().expect("at the bound");

        let mut layout = SheetLayout::default();
        layout.answers.options = ('a'..='z').chain(['A']).collect();
        assert!(matches!(
            layout.validate(),
            Err(SheetError::InvalidLayout(_))
        ));
    }
}
