#![allow(dead_code)]

use omr_grader::core::{DetectionBox, DetectionClass, Roi};
use omr_grader::RawDetection;
use omr_grader::sheet::{answer_grid, index_grid, Grid, SheetBlock, SheetLayout, SheetReader};

pub const INDEX_BOX: Roi = Roi {
    x_start: 120.0,
    y_start: 180.0,
    x_end: 1020.0,
    y_end: 860.0,
};

pub const ANSWERS_BOX: Roi = Roi {
    x_start: 90.0,
    y_start: 950.0,
    x_end: 2010.0,
    y_end: 2980.0,
};

const MARK_HALF: f32 = 12.0;

/// Synthetic detector output for one sheet, built on the default layout.
pub struct SheetFixture {
    index: Grid,
    answers: Grid,
    boxes: Vec<DetectionBox>,
}

impl SheetFixture {
    pub fn new() -> Self {
        let layout = SheetLayout::default();
        let reader = SheetReader::new(layout.clone()).expect("default layout");
        let index_area = reader
            .calculation_area(SheetBlock::Index, &INDEX_BOX)
            .expect("index area");
        let answers_area = reader
            .calculation_area(SheetBlock::Answers, &ANSWERS_BOX)
            .expect("answers area");
        Self {
            index: index_grid(index_area, &layout.index),
            answers: answer_grid(answers_area, &layout.answers),
            boxes: Vec::new(),
        }
    }

    pub fn with_index_box(mut self) -> Self {
        self.boxes.push(block_box(INDEX_BOX, DetectionClass::IndexRoi));
        self
    }

    pub fn with_answers_box(mut self) -> Self {
        self.boxes.push(block_box(ANSWERS_BOX, DetectionClass::AnswersRoi));
        self
    }

    pub fn with_blocks(self) -> Self {
        self.with_index_box().with_answers_box()
    }

    /// Fill one digit bubble per index column.
    pub fn index_number(self, digits: &str) -> Self {
        digits
            .chars()
            .enumerate()
            .fold(self, |sheet, (column, digit)| {
                sheet.index_digit(column as u32, digit)
            })
    }

    /// Fill digit bubble `digit` of index column `column`.
    pub fn index_digit(mut self, column: u32, digit: char) -> Self {
        let anchor = self
            .index
            .slot_anchors(column)
            .find(|a| a.label == digit)
            .copied()
            .expect("digit anchor");
        self.boxes
            .push(mark_box(anchor.position.x, anchor.position.y, 0.9));
        self
    }

    /// Fill option `label` of `question`.
    pub fn answer(mut self, question: u32, label: char) -> Self {
        let anchor = self
            .answers
            .slot_anchors(question)
            .find(|a| a.label == label)
            .copied()
            .expect("option anchor");
        self.boxes
            .push(mark_box(anchor.position.x, anchor.position.y, 0.9));
        self
    }

    /// Fill one option per question, in order, starting at question 1.
    pub fn answers(self, labels: &str) -> Self {
        labels
            .chars()
            .enumerate()
            .fold(self, |sheet, (i, label)| sheet.answer(i as u32 + 1, label))
    }

    pub fn push(mut self, b: DetectionBox) -> Self {
        self.boxes.push(b);
        self
    }

    pub fn boxes(&self) -> Vec<DetectionBox> {
        self.boxes.clone()
    }

    /// The same boxes as raw model rows.
    pub fn raw_rows(&self) -> Vec<RawDetection> {
        self.boxes
            .iter()
            .map(|b| RawDetection {
                xyxy: [b.x1, b.y1, b.x2, b.y2],
                class_id: b.class.class_id(),
                confidence: b.confidence,
            })
            .collect()
    }
}

pub fn block_box(roi: Roi, class: DetectionClass) -> DetectionBox {
    DetectionBox::new(roi.x_start, roi.y_start, roi.x_end, roi.y_end, class, 0.95)
}

pub fn mark_box(x: f32, y: f32, confidence: f32) -> DetectionBox {
    DetectionBox::new(
        x - MARK_HALF,
        y - MARK_HALF,
        x + MARK_HALF,
        y + MARK_HALF,
        DetectionClass::Mark,
        confidence,
    )
}
