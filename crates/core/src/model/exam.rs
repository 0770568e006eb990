use chrono::NaiveDate;
use thiserror::Error;

use crate::model::ids::{MatchSetId, QuestionId};

/// Used when a match set does not say how long it runs.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

const MIN_OPTIONS: usize = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamError {
    #[error("exam has no questions")]
    NoQuestions,

    #[error("question {index} has {count} options, need at least {MIN_OPTIONS}")]
    TooFewOptions { index: usize, count: usize },

    #[error("question {index} has empty text")]
    EmptyQuestion { index: usize },

    #[error("exam duration must be > 0")]
    InvalidDuration,
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    correct_answer: Option<usize>,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, text: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            id,
            text: text.into(),
            options,
            correct_answer: None,
        }
    }

    /// Attaches the answer key, ignoring indices outside the option list.
    #[must_use]
    pub fn with_correct_answer(mut self, index: Option<usize>) -> Self {
        self.correct_answer = index.filter(|idx| *idx < self.options.len());
        self
    }

    /// Resolves the backend's answer key string to an option index.
    ///
    /// Accepts the option text itself, a letter (`"B"`), or a 1-based number.
    #[must_use]
    pub fn resolve_answer_key(options: &[String], raw: &str) -> Option<usize> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Some(idx) = options.iter().position(|opt| opt.trim() == raw) {
            return Some(idx);
        }
        let mut chars = raw.chars();
        if let (Some(letter), None) = (chars.next(), chars.next()) {
            if letter.is_ascii_alphabetic() {
                let idx = (letter.to_ascii_uppercase() as u8 - b'A') as usize;
                return (idx < options.len()).then_some(idx);
            }
        }
        raw.parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .filter(|idx| *idx < options.len())
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    /// Answer key; only meaningful once the attempt has been graded.
    #[must_use]
    pub fn correct_answer(&self) -> Option<usize> {
        self.correct_answer
    }
}

/// A loaded mock test. Immutable for the rest of the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSession {
    exam_id: MatchSetId,
    title: String,
    subject: String,
    date: Option<NaiveDate>,
    duration_seconds: u32,
    questions: Vec<Question>,
    instructions: Vec<String>,
}

impl ExamSession {
    /// Builds a session from fetched match-set data.
    ///
    /// # Errors
    ///
    /// Returns `ExamError` when there are no questions, a question has blank
    /// text or fewer than two options, or the duration is zero.
    pub fn new(
        exam_id: MatchSetId,
        title: impl Into<String>,
        subject: impl Into<String>,
        date: Option<NaiveDate>,
        duration_minutes: Option<u32>,
        questions: Vec<Question>,
    ) -> Result<Self, ExamError> {
        if questions.is_empty() {
            return Err(ExamError::NoQuestions);
        }
        for (index, question) in questions.iter().enumerate() {
            if question.text.trim().is_empty() {
                return Err(ExamError::EmptyQuestion { index });
            }
            if question.options.len() < MIN_OPTIONS {
                return Err(ExamError::TooFewOptions {
                    index,
                    count: question.options.len(),
                });
            }
        }
        let minutes = duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
        if minutes == 0 {
            return Err(ExamError::InvalidDuration);
        }

        Ok(Self {
            exam_id,
            title: title.into(),
            subject: subject.into(),
            date,
            duration_seconds: minutes.saturating_mul(60),
            questions,
            instructions: default_instructions(minutes),
        })
    }

    #[must_use]
    pub fn exam_id(&self) -> MatchSetId {
        self.exam_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    #[must_use]
    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }
}

/// Instruction lines shown before the timer starts.
#[must_use]
pub fn default_instructions(duration_minutes: u32) -> Vec<String> {
    vec![
        format!("The test lasts {duration_minutes} minutes. The timer starts when you begin."),
        "Each question has one correct option. There is no negative marking.".to_string(),
        "Use Mark for Review to flag a question and come back to it later.".to_string(),
        "Your answers are saved automatically as you go.".to_string(),
        "The test is submitted automatically when the time runs out.".to_string(),
        "Do not leave full screen or close the window during the test.".to_string(),
    ]
}

/// Catalogue entry for the mock-test list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSetSummary {
    pub id: MatchSetId,
    pub title: String,
    pub subject: String,
    pub date: Option<NaiveDate>,
    pub duration_minutes: u32,
    pub question_count: u32,
}

/// One answer as posted to the grading endpoint: option text, not index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub selected_answer: String,
}

/// Grading outcome returned after a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub percentage: f64,
    pub result_status: String,
}

impl SubmissionResult {
    #[must_use]
    pub fn unanswered(&self) -> u32 {
        self.total_questions
            .saturating_sub(self.correct_answers)
            .saturating_sub(self.incorrect_answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["4".into(), "5".into(), "6".into(), "7".into()]
    }

    fn question(id: u64) -> Question {
        Question::new(QuestionId::new(id), format!("Q{id}"), options())
    }

    #[test]
    fn duration_defaults_to_sixty_minutes() {
        let exam = ExamSession::new(MatchSetId::new(1), "Maths", "Maths", None, None, vec![
            question(1),
        ])
        .unwrap();
        assert_eq!(exam.duration_seconds(), 3_600);
        assert!(exam.instructions()[0].contains("60 minutes"));
    }

    #[test]
    fn rejects_empty_and_malformed_payloads() {
        let empty = ExamSession::new(MatchSetId::new(1), "t", "s", None, Some(10), vec![]);
        assert_eq!(empty.unwrap_err(), ExamError::NoQuestions);

        let one_option = Question::new(QuestionId::new(2), "Q", vec!["only".into()]);
        let err = ExamSession::new(MatchSetId::new(1), "t", "s", None, Some(10), vec![
            question(1),
            one_option,
        ])
        .unwrap_err();
        assert_eq!(err, ExamError::TooFewOptions { index: 1, count: 1 });

        let zero = ExamSession::new(MatchSetId::new(1), "t", "s", None, Some(0), vec![question(1)]);
        assert_eq!(zero.unwrap_err(), ExamError::InvalidDuration);
    }

    #[test]
    fn answer_key_resolves_text_letter_or_number() {
        let opts = options();
        assert_eq!(Question::resolve_answer_key(&opts, "6"), Some(2));
        assert_eq!(Question::resolve_answer_key(&opts, "b"), Some(1));
        assert_eq!(Question::resolve_answer_key(&opts, " D "), Some(3));
        assert_eq!(Question::resolve_answer_key(&opts, "Z"), None);
        assert_eq!(Question::resolve_answer_key(&opts, ""), None);
        let numbered = vec!["alpha".to_string(), "beta".to_string()];
        assert_eq!(Question::resolve_answer_key(&numbered, "2"), Some(1));
        assert_eq!(Question::resolve_answer_key(&numbered, "3"), None);
    }

    #[test]
    fn correct_answer_out_of_range_is_dropped() {
        let q = question(1).with_correct_answer(Some(9));
        assert_eq!(q.correct_answer(), None);
    }

    #[test]
    fn unanswered_is_derived_from_totals() {
        let result = SubmissionResult {
            total_questions: 10,
            correct_answers: 6,
            incorrect_answers: 2,
            percentage: 60.0,
            result_status: "PASS".into(),
        };
        assert_eq!(result.unanswered(), 2);
    }
}
