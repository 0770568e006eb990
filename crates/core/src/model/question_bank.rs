use chrono::NaiveDate;

use crate::model::exam::{DEFAULT_DURATION_MINUTES, Question};
use crate::model::validation::{DraftErrors, trimmed};

/// Options on every authored question.
pub const QUESTION_OPTION_COUNT: usize = 4;

/// Create form for a new mock test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSetDraft {
    pub title: String,
    pub subject: String,
    /// `YYYY-MM-DD` from the date input.
    pub date: String,
    pub duration_minutes: String,
}

impl Default for MatchSetDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            subject: String::new(),
            date: String::new(),
            duration_minutes: DEFAULT_DURATION_MINUTES.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidMatchSet {
    pub title: String,
    pub subject: String,
    pub date: NaiveDate,
    pub duration_minutes: u32,
}

impl MatchSetDraft {
    /// # Errors
    ///
    /// Returns missing title, subject or date, an unparseable date, and a
    /// duration that is not a positive number of minutes.
    pub fn validate(self) -> Result<ValidMatchSet, DraftErrors> {
        let mut errors = DraftErrors::new();
        errors.require("title", "Title", &self.title);
        errors.require("subject", "Subject", &self.subject);
        errors.require("date", "Date", &self.date);
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok();
        if date.is_none() && !self.date.trim().is_empty() {
            errors.push("date", "Date must be a valid date");
        }
        let duration = self
            .duration_minutes
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|minutes| *minutes > 0);
        if duration.is_none() {
            errors.push("duration_minutes", "Duration must be a positive number of minutes");
        }
        match (date, duration) {
            (Some(date), Some(duration_minutes)) if errors.is_empty() => Ok(ValidMatchSet {
                title: trimmed(&self.title),
                subject: trimmed(&self.subject),
                date,
                duration_minutes,
            }),
            _ => Err(errors),
        }
    }
}

/// A question ready for upload. The answer key is the option text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// Single-question form: text, four options and the answer key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    pub text: String,
    pub options: [String; QUESTION_OPTION_COUNT],
    /// Option text, a letter (`B`) or a 1-based number.
    pub correct_answer: String,
}

impl QuestionDraft {
    /// # Errors
    ///
    /// Returns a missing question or option, and an answer key that names
    /// none of the options.
    pub fn validate(self) -> Result<NewQuestion, DraftErrors> {
        let mut errors = DraftErrors::new();
        errors.require("text", "Question", &self.text);
        if self.options.iter().any(|option| option.trim().is_empty()) {
            errors.push("options", "All four options are required");
        }
        errors.require("correct_answer", "Correct answer", &self.correct_answer);
        errors.into_result()?;

        let options: Vec<String> = self.options.iter().map(|option| trimmed(option)).collect();
        let key = Question::resolve_answer_key(&options, &self.correct_answer)
            .and_then(|index| options.get(index).cloned());
        let Some(correct_answer) = key else {
            let mut errors = DraftErrors::new();
            errors.push("correct_answer", "Correct answer must match one of the options");
            return Err(errors);
        };
        Ok(NewQuestion {
            text: trimmed(&self.text),
            correct_answer,
            options,
        })
    }
}
