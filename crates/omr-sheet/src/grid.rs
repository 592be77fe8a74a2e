//! Anchor generation for the index and answer blocks.

use omr_core::{Anchor, Roi};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::layout::{AnswerBlockLayout, IndexBlockLayout};
use crate::SheetBlock;

/// Pixel extent along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub start: f32,
    pub end: f32,
}

impl Band {
    #[inline]
    pub fn contains(&self, v: f32) -> bool {
        self.start <= v && v <= self.end
    }
}

/// Generated bubble geometry for one block.
///
/// `columns` and `rows` are the cell bands the anchors were placed in, kept
/// for diagnostics. For the answer block `rows` are the question rows of a
/// single column (all columns share them).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Grid {
    pub block: SheetBlock,
    /// Calculation rectangle the grid was laid out in.
    pub area: Roi,
    pub anchors: Vec<Anchor>,
    pub columns: Vec<Band>,
    pub rows: Vec<Band>,
}

impl Grid {
    /// Anchors of one slot, in generation order.
    pub fn slot_anchors(&self, slot: u32) -> impl Iterator<Item = &Anchor> + '_ {
        self.anchors.iter().filter(move |a| a.slot == slot)
    }

    /// Bounding box of all anchor centers, `None` for an empty grid.
    pub fn anchor_extent(&self) -> Option<Roi> {
        let first = self.anchors.first()?;
        let init = Roi::new(
            first.position.x,
            first.position.y,
            first.position.x,
            first.position.y,
        );
        Some(self.anchors.iter().fold(init, |acc, a| {
            Roi::new(
                acc.x_start.min(a.position.x),
                acc.y_start.min(a.position.y),
                acc.x_end.max(a.position.x),
                acc.y_end.max(a.position.y),
            )
        }))
    }
}

/// Lay out the index digit grid inside a calculation rectangle.
///
/// The rectangle is split into `columns` equal bands and each band into
/// `digits` equal rows. Anchors are emitted column by column, digit `'0'`
/// first; `slot` is the 0-based column. Expects a layout that passed
/// [`SheetLayout::validate`](crate::SheetLayout::validate).
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(layout), fields(columns = layout.columns, digits = layout.digits))
)]
pub fn index_grid(area: Roi, layout: &IndexBlockLayout) -> Grid {
    let col_w = area.width() / layout.columns as f32;
    let row_h = area.height() / layout.digits as f32;

    let columns: Vec<Band> = (0..layout.columns)
        .map(|c| Band {
            start: area.x_start + c as f32 * col_w,
            end: area.x_start + (c + 1) as f32 * col_w,
        })
        .collect();
    let rows: Vec<Band> = (0..layout.digits)
        .map(|d| Band {
            start: area.y_start + d as f32 * row_h,
            end: area.y_start + (d + 1) as f32 * row_h,
        })
        .collect();

    let mut anchors = Vec::with_capacity(layout.columns.saturating_mul(layout.digits) as usize);
    for c in 0..layout.columns {
        let x = area.x_start + (c as f32 + 0.5) * col_w;
        for d in 0..layout.digits {
            let y = area.y_start + (d as f32 + 0.5) * row_h;
            anchors.push(Anchor::new(x, y, c, digit_label(d)));
        }
    }

    Grid {
        block: SheetBlock::Index,
        area,
        anchors,
        columns,
        rows,
    }
}

fn digit_label(d: u32) -> char {
    char::from(b'0' + (d % 10) as u8)
}

/// Lay out the answer bubble grid inside a calculation rectangle.
///
/// Columns sit at their calibrated width ratios. Down each column the rows
/// come in groups; the group gap is only inserted between groups. Question
/// numbers start at 1 and run down the first column, then continue at the
/// top of the next one. All questions the layout holds are generated, so a
/// stray mark further down the sheet resolves to its own bubble instead of
/// being pulled onto a graded question.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(layout), fields(columns = layout.columns.len()))
)]
pub fn answer_grid(area: Roi, layout: &AnswerBlockLayout) -> Grid {
    let w = area.width();
    let h = area.height();
    let row_ratio = layout.row_height_ratio();
    let n_opts = layout.options.len();

    let columns: Vec<Band> = layout
        .columns
        .iter()
        .map(|band| Band {
            start: area.x_start + band.start * w,
            end: area.x_start + band.end * w,
        })
        .collect();

    let mut rows = Vec::with_capacity(layout.questions_per_column() as usize);
    let mut y_ratio = 0.0f32;
    for group in 0..layout.groups_per_column {
        for _ in 0..layout.rows_per_group {
            rows.push(Band {
                start: area.y_start + y_ratio * h,
                end: area.y_start + (y_ratio + row_ratio) * h,
            });
            y_ratio += row_ratio;
        }
        if group + 1 < layout.groups_per_column {
            y_ratio += layout.group_gap;
        }
    }

    let mut anchors = Vec::with_capacity((layout.capacity() as usize).saturating_mul(n_opts));
    let mut question = 1u32;
    for col in &columns {
        let opt_w = (col.end - col.start) / n_opts as f32;
        for row in &rows {
            let y = (row.start + row.end) * 0.5;
            for (o, &label) in layout.options.iter().enumerate() {
                let x = col.start + (o as f32 + 0.5) * opt_w;
                anchors.push(Anchor::new(x, y, question, label));
            }
            question += 1;
        }
    }

    Grid {
        block: SheetBlock::Answers,
        area,
        anchors,
        columns,
        rows,
    }
}
