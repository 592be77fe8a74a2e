//! Answer keys, graded answers and the two output shapes.

use std::fmt;
use std::fs;
use std::path::Path;

use omr_core::SlotOutcome;
use omr_sheet::{SlotResult, UNKNOWN_MARKER};
use serde::{Deserialize, Serialize};

use crate::GradeError;

/// One answer-key entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeEntry {
    #[serde(alias = "answer_to")]
    pub question_number: u32,
    pub answer: SlotOutcome,
}

/// Answer key built from a reference sheet.
///
/// Entries are looked up by position: entry `n - 1` is the key for question
/// `n`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkScheme {
    entries: Vec<SchemeEntry>,
}

impl MarkScheme {
    pub fn new(entries: Vec<SchemeEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SchemeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key for `question` (1-based), [`CorrectAnswer::Unknown`] past the end.
    pub fn correct_answer(&self, question: u32) -> CorrectAnswer {
        question
            .checked_sub(1)
            .and_then(|i| self.entries.get(i as usize))
            .map_or(CorrectAnswer::Unknown, |e| CorrectAnswer::Expected(e.answer))
    }

    /// Load a key saved either as a bare entry list or as a scheme-mode
    /// output object (`{"scheme": [...]}`).
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, GradeError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum SchemeFile {
            Wrapped { scheme: MarkScheme },
            Bare(MarkScheme),
        }

        let raw = fs::read_to_string(path)?;
        Ok(match serde_json::from_str(&raw)? {
            SchemeFile::Wrapped { scheme } => scheme,
            SchemeFile::Bare(scheme) => scheme,
        })
    }
}

impl FromIterator<SchemeEntry> for MarkScheme {
    fn from_iter<T: IntoIterator<Item = SchemeEntry>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Key answer for a graded question; `'?'` when the key does not cover it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "char", from = "char")]
pub enum CorrectAnswer {
    Expected(SlotOutcome),
    Unknown,
}

impl From<CorrectAnswer> for char {
    fn from(c: CorrectAnswer) -> char {
        match c {
            CorrectAnswer::Expected(outcome) => outcome.as_char(),
            CorrectAnswer::Unknown => UNKNOWN_MARKER,
        }
    }
}

impl From<char> for CorrectAnswer {
    fn from(c: char) -> Self {
        if c == UNKNOWN_MARKER {
            CorrectAnswer::Unknown
        } else {
            CorrectAnswer::Expected(SlotOutcome::from(c))
        }
    }
}

impl fmt::Display for CorrectAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

/// Detected and expected answer for one question of a script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedAnswer {
    #[serde(alias = "answer_to")]
    pub question_number: u32,
    pub answer: SlotOutcome,
    pub correct_answer: CorrectAnswer,
}

impl GradedAnswer {
    /// A question scores only with a single detected label equal to the key.
    pub fn is_correct(&self) -> bool {
        self.answer.is_value() && self.correct_answer == CorrectAnswer::Expected(self.answer)
    }
}

/// Script-mode output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingResult {
    pub answers: Vec<GradedAnswer>,
    pub index_number: String,
    pub score: u32,
    pub out_of: u32,
}

impl GradingResult {
    /// Questions the key did not cover.
    pub fn missing_key_entries(&self) -> usize {
        self.answers
            .iter()
            .filter(|a| a.correct_answer == CorrectAnswer::Unknown)
            .count()
    }
}

/// Output of one sheet, in either mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkingOutcome {
    Scheme { scheme: MarkScheme },
    Script(GradingResult),
}

impl MarkingOutcome {
    pub fn scheme(&self) -> Option<&MarkScheme> {
        match self {
            MarkingOutcome::Scheme { scheme } => Some(scheme),
            MarkingOutcome::Script(_) => None,
        }
    }

    pub fn script(&self) -> Option<&GradingResult> {
        match self {
            MarkingOutcome::Script(result) => Some(result),
            MarkingOutcome::Scheme { .. } => None,
        }
    }

    /// Write this outcome to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), GradeError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Scheme mode: turn the answer slots into key entries.
pub fn build_scheme(answers: &[SlotResult]) -> MarkScheme {
    answers
        .iter()
        .map(|s| SchemeEntry {
            question_number: s.slot,
            answer: s.outcome,
        })
        .collect()
}

/// Script mode: pair each answer slot with its key entry and score it.
pub fn grade_script(
    index_number: String,
    answers: &[SlotResult],
    scheme: &MarkScheme,
    total_questions: u32,
) -> GradingResult {
    let answers: Vec<GradedAnswer> = answers
        .iter()
        .map(|s| GradedAnswer {
            question_number: s.slot,
            answer: s.outcome,
            correct_answer: scheme.correct_answer(s.slot),
        })
        .collect();
    let score = answers.iter().filter(|a| a.is_correct()).count() as u32;

    GradingResult {
        answers,
        index_number,
        score,
        out_of: total_questions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(outcomes: &[SlotOutcome]) -> Vec<SlotResult> {
        outcomes
            .iter()
            .enumerate()
            .map(|(i, &outcome)| SlotResult {
                slot: i as u32 + 1,
                outcome,
            })
            .collect()
    }

    #[test]
    fn empty_and_conflict_never_score() {
        let key = build_scheme(&slots(&[
            SlotOutcome::Empty,
            SlotOutcome::Conflict,
            SlotOutcome::Value('C'),
        ]));
        let script = slots(&[
            SlotOutcome::Empty,
            SlotOutcome::Conflict,
            SlotOutcome::Value('C'),
        ]);
        let result = grade_script("1234567".into(), &script, &key, 3);
        assert_eq!(result.score, 1);
        assert_eq!(result.out_of, 3);
    }

    #[test]
    fn short_key_marks_questions_unknown() {
        let key = build_scheme(&slots(&[SlotOutcome::Value('A')]));
        let script = slots(&[SlotOutcome::Value('A'), SlotOutcome::Value('B')]);
        let result = grade_script("XXXXXXX".into(), &script, &key, 2);
        assert_eq!(result.answers[1].correct_answer, CorrectAnswer::Unknown);
        assert_eq!(result.missing_key_entries(), 1);
        assert_eq!(result.score, 1);
    }

    #[test]
    fn key_is_looked_up_by_position() {
        let key = MarkScheme::new(vec![
            SchemeEntry {
                question_number: 7,
                answer: SlotOutcome::Value('D'),
            },
            SchemeEntry {
                question_number: 9,
                answer: SlotOutcome::Value('E'),
            },
        ]);
        assert_eq!(
            key.correct_answer(2),
            CorrectAnswer::Expected(SlotOutcome::Value('E'))
        );
        assert_eq!(key.correct_answer(0), CorrectAnswer::Unknown);
        assert_eq!(key.correct_answer(3), CorrectAnswer::Unknown);
    }

    #[test]
    fn outcomes_serialize_to_the_output_contract() {
        let scheme = MarkingOutcome::Scheme {
            scheme: build_scheme(&slots(&[SlotOutcome::Value('B'), SlotOutcome::Empty])),
        };
        assert_eq!(
            serde_json::to_string(&scheme).expect("json"),
            r#"{"scheme":[{"question_number":1,"answer":"B"},{"question_number":2,"answer":"X"}]}"#
        );

        let script = MarkingOutcome::Script(GradingResult {
            answers: vec![GradedAnswer {
                question_number: 1,
                answer: SlotOutcome::Conflict,
                correct_answer: CorrectAnswer::Unknown,
            }],
            index_number: "0123456".into(),
            score: 0,
            out_of: 1,
        });
        let value = serde_json::to_value(&script).expect("json");
        assert_eq!(value["answers"][0]["correct_answer"], "?");
        assert_eq!(value["answers"][0]["answer"], "M");
        assert_eq!(value["index_number"], "0123456");

        let back: MarkingOutcome = serde_json::from_value(value).expect("parse");
        assert_eq!(back, script);
    }

    #[test]
    fn stored_keys_accept_legacy_field_name() {
        let key: MarkScheme =
            serde_json::from_str(r#"[{"answer_to": 1, "answer": "A"}]"#).expect("json");
        assert_eq!(key.entries()[0].question_number, 1);
    }
}
