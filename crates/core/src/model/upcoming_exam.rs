use chrono::{NaiveDate, NaiveTime};
use url::Url;

use crate::model::ids::UpcomingExamId;
use crate::model::validation::{DraftErrors, normalize_optional, trimmed};

/// An exam announced on the upcoming-exams board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingExam {
    pub id: UpcomingExamId,
    pub title: String,
    pub subject: String,
    pub date: Option<NaiveDate>,
    /// `HH:MM` as entered.
    pub time: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Free text such as `2 hours`.
    pub duration: Option<String>,
    pub recommended: bool,
}

impl UpcomingExam {
    #[must_use]
    pub fn to_draft(&self) -> UpcomingExamDraft {
        UpcomingExamDraft {
            title: self.title.clone(),
            subject: self.subject.clone(),
            date: self
                .date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            time: self.time.clone(),
            description: self.description.clone().unwrap_or_default(),
            image_url: self.image_url.clone().unwrap_or_default(),
            duration: self.duration.clone().unwrap_or_default(),
            recommended: self.recommended,
        }
    }

    /// The same exam with the recommendation flipped.
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            recommended: !self.recommended,
            ..self.clone()
        }
    }
}

/// Recommendation tabs on the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecommendationFilter {
    #[default]
    All,
    Recommended,
    NotRecommended,
}

impl RecommendationFilter {
    pub const ALL: [Self; 3] = [Self::All, Self::Recommended, Self::NotRecommended];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Exams",
            Self::Recommended => "Recommended",
            Self::NotRecommended => "Not Recommended",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpcomingExamFilter {
    pub search: String,
    pub recommendation: RecommendationFilter,
}

impl UpcomingExamFilter {
    /// Search hits title or subject, case-insensitively.
    #[must_use]
    pub fn matches(&self, exam: &UpcomingExam) -> bool {
        let term = self.search.trim().to_lowercase();
        let search_ok = term.is_empty()
            || exam.title.to_lowercase().contains(&term)
            || exam.subject.to_lowercase().contains(&term);
        let recommendation_ok = match self.recommendation {
            RecommendationFilter::All => true,
            RecommendationFilter::Recommended => exam.recommended,
            RecommendationFilter::NotRecommended => !exam.recommended,
        };
        search_ok && recommendation_ok
    }

    #[must_use]
    pub fn apply<'a>(&self, exams: &'a [UpcomingExam]) -> Vec<&'a UpcomingExam> {
        exams.iter().filter(|exam| self.matches(exam)).collect()
    }
}

/// Add/edit exam form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpcomingExamDraft {
    pub title: String,
    pub subject: String,
    pub date: String,
    pub time: String,
    pub description: String,
    pub image_url: String,
    pub duration: String,
    /// Carried through edits; toggled separately.
    pub recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUpcomingExam {
    pub title: String,
    pub subject: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub duration: Option<String>,
    pub recommended: bool,
}

impl UpcomingExamDraft {
    /// # Errors
    ///
    /// Returns missing title, subject, date or time, unparseable date or
    /// time, and an image URL that does not parse.
    pub fn validate(self) -> Result<ValidUpcomingExam, DraftErrors> {
        let mut errors = DraftErrors::new();
        errors.require("title", "Title", &self.title);
        errors.require("subject", "Subject", &self.subject);
        errors.require("date", "Date", &self.date);
        errors.require("time", "Time", &self.time);

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok();
        if date.is_none() && !self.date.trim().is_empty() {
            errors.push("date", "Date must be a valid date");
        }
        let time = NaiveTime::parse_from_str(self.time.trim(), "%H:%M").ok();
        if time.is_none() && !self.time.trim().is_empty() {
            errors.push("time", "Time must be HH:MM");
        }
        let image_url = normalize_optional(Some(self.image_url));
        if let Some(raw) = image_url.as_deref() {
            if Url::parse(raw).is_err() {
                errors.push("image_url", "Image URL must be a valid URL");
            }
        }

        match (date, time) {
            (Some(date), Some(time)) if errors.is_empty() => Ok(ValidUpcomingExam {
                title: trimmed(&self.title),
                subject: trimmed(&self.subject),
                date,
                time,
                description: normalize_optional(Some(self.description)),
                image_url,
                duration: normalize_optional(Some(self.duration)),
                recommended: self.recommended,
            }),
            _ => Err(errors),
        }
    }
}

impl ValidUpcomingExam {
    #[must_use]
    pub fn time_text(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    #[must_use]
    pub fn into_exam(self, id: UpcomingExamId) -> UpcomingExam {
        let time = self.time_text();
        UpcomingExam {
            id,
            title: self.title,
            subject: self.subject,
            date: Some(self.date),
            time,
            description: self.description,
            image_url: self.image_url,
            duration: self.duration,
            recommended: self.recommended,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> UpcomingExamDraft {
        UpcomingExamDraft {
            title: "National Science Olympiad".into(),
            subject: "Science".into(),
            date: "2026-11-20".into(),
            time: "09:30".into(),
            ..UpcomingExamDraft::default()
        }
    }

    #[test]
    fn requires_title_subject_date_and_time() {
        let errors = UpcomingExamDraft::default().validate().unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|err| err.field).collect();
        assert_eq!(fields, vec!["title", "subject", "date", "time"]);
    }

    #[test]
    fn rejects_bad_time_and_image() {
        let errors = UpcomingExamDraft {
            time: "9.30am".into(),
            image_url: "not a url".into(),
            ..draft()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.message_for("time"), Some("Time must be HH:MM"));
        assert!(errors.message_for("image_url").is_some());
    }

    #[test]
    fn draft_round_trips_through_an_exam() {
        let exam = draft()
            .validate()
            .unwrap()
            .into_exam(UpcomingExamId::new("e1"));
        assert_eq!(exam.time, "09:30");
        assert_eq!(exam.description, None);
        assert_eq!(exam.to_draft(), draft());
    }

    #[test]
    fn filter_combines_tab_and_search() {
        let science = draft().validate().unwrap().into_exam(UpcomingExamId::new("1"));
        let mut maths = science.clone();
        maths.id = UpcomingExamId::new("2");
        maths.title = "Maths Olympiad".into();
        maths.subject = "Maths".into();
        let exams = vec![science.toggled(), maths];

        let filter = UpcomingExamFilter {
            search: String::new(),
            recommendation: RecommendationFilter::Recommended,
        };
        assert_eq!(filter.apply(&exams)[0].id, UpcomingExamId::new("1"));
        let filter = UpcomingExamFilter {
            search: "MATHS".into(),
            recommendation: RecommendationFilter::NotRecommended,
        };
        assert_eq!(filter.apply(&exams).len(), 1);
        let filter = UpcomingExamFilter {
            search: "maths".into(),
            recommendation: RecommendationFilter::Recommended,
        };
        assert!(filter.apply(&exams).is_empty());
    }
}
