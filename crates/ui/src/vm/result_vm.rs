use olympiad_core::model::{ExamResult, Grade};

use super::time_fmt::format_date;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRowVm {
    pub exam_title: String,
    pub subject: String,
    pub date: String,
    pub time: String,
    pub score: String,
    pub grade: &'static str,
    pub grade_class: &'static str,
    pub certificate_url: Option<String>,
}

fn grade_class(grade: Grade) -> &'static str {
    match grade {
        Grade::APlus | Grade::A => "grade-high",
        Grade::BPlus | Grade::B => "grade-mid",
        Grade::C => "grade-low",
        Grade::F => "grade-fail",
    }
}

impl From<&ExamResult> for ResultRowVm {
    fn from(result: &ExamResult) -> Self {
        let grade = result.grade();
        Self {
            exam_title: result.exam_title.clone(),
            subject: result.subject.clone(),
            date: format_date(result.date),
            time: result.time.clone().unwrap_or_else(|| "-".to_string()),
            score: result.score_label(),
            grade: grade.as_str(),
            grade_class: grade_class(grade),
            certificate_url: result.certificate_url.clone(),
        }
    }
}

#[must_use]
pub fn map_result_rows(results: &[ExamResult]) -> Vec<ResultRowVm> {
    results.iter().map(ResultRowVm::from).collect()
}
