use std::fmt;

use chrono::NaiveDate;

/// Letter grade shown next to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    APlus,
    A,
    BPlus,
    B,
    C,
    F,
}

impl Grade {
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        match percentage {
            p if p >= 90.0 => Self::APlus,
            p if p >= 80.0 => Self::A,
            p if p >= 70.0 => Self::BPlus,
            p if p >= 60.0 => Self::B,
            p if p >= 50.0 => Self::C,
            _ => Self::F,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::C => "C",
            Self::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One past exam on a student's results page.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamResult {
    pub exam_title: String,
    pub subject: String,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    /// `None` until the exam is graded.
    pub percentage: Option<f64>,
    pub certificate_url: Option<String>,
}

impl ExamResult {
    /// Ungraded results count as zero, matching the score column.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.percentage.unwrap_or(0.0)
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        Grade::from_percentage(self.score())
    }

    /// `"72/100"` or `"N/A"` for ungraded results.
    #[must_use]
    pub fn score_label(&self) -> String {
        match self.percentage {
            Some(pct) => format!("{}/100", pct.round()),
            None => "N/A".to_string(),
        }
    }
}

/// Summary cards above the results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultStats {
    pub total: usize,
    /// Rounded mean of all scores.
    pub average: u32,
    pub best: u32,
}

impl ResultStats {
    #[must_use]
    pub fn from_results(results: &[ExamResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }
        let sum: f64 = results.iter().map(ExamResult::score).sum();
        let best = results.iter().map(ExamResult::score).fold(0.0_f64, f64::max);
        #[allow(clippy::cast_precision_loss)]
        let average = sum / results.len() as f64;
        Self {
            total: results.len(),
            average: to_whole(average),
            best: to_whole(best),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_whole(value: f64) -> u32 {
    value.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(pct: Option<f64>) -> ExamResult {
        ExamResult {
            exam_title: "Science Olympiad".into(),
            subject: "Science".into(),
            date: None,
            time: None,
            percentage: pct,
            certificate_url: None,
        }
    }

    #[test]
    fn grade_bands() {
        assert_eq!(Grade::from_percentage(90.0), Grade::APlus);
        assert_eq!(Grade::from_percentage(89.9), Grade::A);
        assert_eq!(Grade::from_percentage(70.0), Grade::BPlus);
        assert_eq!(Grade::from_percentage(60.0), Grade::B);
        assert_eq!(Grade::from_percentage(50.0), Grade::C);
        assert_eq!(Grade::from_percentage(49.0), Grade::F);
        assert_eq!(result(None).grade(), Grade::F);
    }

    #[test]
    fn stats_round_average_and_track_best() {
        let stats = ResultStats::from_results(&[result(Some(80.0)), result(Some(65.0)), result(None)]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.average, 48);
        assert_eq!(stats.best, 80);
        assert_eq!(ResultStats::from_results(&[]), ResultStats::default());
    }

    #[test]
    fn score_label_marks_ungraded() {
        assert_eq!(result(None).score_label(), "N/A");
        assert_eq!(result(Some(72.4)).score_label(), "72/100");
    }
}
