use olympiad_core::model::QuestionStatus;
use services::{CompletedAttempt, MockTestSession};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub index: usize,
    pub letter: char,
    pub text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub index: usize,
    pub number: usize,
    pub total: usize,
    pub text: String,
    pub options: Vec<OptionVm>,
    pub marked: bool,
    pub is_first: bool,
    pub is_last: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteItemVm {
    pub index: usize,
    pub number: usize,
    pub class: &'static str,
    pub title: &'static str,
    pub current: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionHeaderVm {
    pub title: String,
    pub subject: String,
    pub timer: String,
    pub low_time: bool,
    pub answered: usize,
    pub total: usize,
    pub progress_percent: u8,
}

fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|offset| b'A'.checked_add(offset))
        .map_or('?', char::from)
}

#[must_use]
pub fn question_vm(session: &MockTestSession) -> Option<QuestionVm> {
    let index = session.current_index();
    let question = session.current_question()?;
    let selected = session.sheet().answer(index);
    Some(QuestionVm {
        index,
        number: index + 1,
        total: session.exam().question_count(),
        text: question.text().to_string(),
        options: question
            .options()
            .iter()
            .enumerate()
            .map(|(option, text)| OptionVm {
                index: option,
                letter: option_letter(option),
                text: text.clone(),
                selected: selected == Some(option),
            })
            .collect(),
        marked: session.sheet().is_marked(index),
        is_first: session.is_first(),
        is_last: session.is_last(),
    })
}

#[must_use]
pub fn palette(session: &MockTestSession) -> Vec<PaletteItemVm> {
    (0..session.exam().question_count())
        .map(|index| {
            let status: QuestionStatus = session.status(index);
            PaletteItemVm {
                index,
                number: index + 1,
                class: status.css_class(),
                title: status.label(),
                current: index == session.current_index(),
            }
        })
        .collect()
}

#[must_use]
pub fn header_vm(session: &MockTestSession) -> SessionHeaderVm {
    let countdown = session.countdown();
    SessionHeaderVm {
        title: session.exam().title().to_string(),
        subject: session.exam().subject().to_string(),
        timer: countdown.display(),
        low_time: countdown.is_low(),
        answered: session.sheet().answered_count(),
        total: session.exam().question_count(),
        progress_percent: session.sheet().progress_percent(),
    }
}

/// `"12m 05s"`.
#[must_use]
pub fn format_time_spent(seconds: u32) -> String {
    format!("{}m {:02}s", seconds / 60, seconds % 60)
}

/// Result card after a submission.
#[derive(Clone, Debug, PartialEq)]
pub struct AttemptVm {
    pub exam_title: String,
    pub total: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub unanswered: u32,
    pub percentage_label: String,
    pub status: String,
    pub passed: bool,
    pub time_spent: String,
    pub auto_submitted: bool,
}

impl From<&CompletedAttempt> for AttemptVm {
    fn from(attempt: &CompletedAttempt) -> Self {
        let result = &attempt.result;
        Self {
            exam_title: attempt.exam_title.clone(),
            total: result.total_questions,
            correct: result.correct_answers,
            incorrect: result.incorrect_answers,
            unanswered: result.unanswered(),
            percentage_label: format!("{:.1}%", result.percentage),
            status: result.result_status.clone(),
            passed: result.result_status.eq_ignore_ascii_case("pass"),
            time_spent: format_time_spent(attempt.time_spent_seconds),
            auto_submitted: attempt.automatic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use olympiad_core::model::{ExamSession, MatchSetId, Question, QuestionId, UserId};

    fn session() -> MockTestSession {
        let questions = (1..=3)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    vec!["one".into(), "two".into(), "three".into()],
                )
            })
            .collect();
        let exam =
            ExamSession::new(MatchSetId::new(1), "Mock", "Science", None, Some(5), questions)
                .unwrap();
        let mut session = MockTestSession::new(exam, UserId::new(1));
        session.start().unwrap();
        session
    }

    #[test]
    fn question_vm_marks_selected_option() {
        let mut session = session();
        session.select_answer(0, 1).unwrap();
        let vm = question_vm(&session).unwrap();
        assert_eq!(vm.number, 1);
        assert_eq!(vm.options[1].letter, 'B');
        assert!(vm.options[1].selected);
        assert!(!vm.options[0].selected);
        assert!(vm.is_first);
    }

    #[test]
    fn palette_reflects_statuses() {
        let mut session = session();
        session.select_answer(0, 0).unwrap();
        session.go_to(1).unwrap();
        session.toggle_review(1).unwrap();
        let items = palette(&session);
        assert_eq!(items[0].class, "status-answered");
        assert_eq!(items[1].class, "status-marked");
        assert!(items[1].current);
        assert_eq!(items[2].class, "status-not-visited");
    }

    #[test]
    fn header_shows_full_timer_before_first_tick() {
        let vm = header_vm(&session());
        assert_eq!(vm.timer, "00:05:00");
        assert!(!vm.low_time);
        assert_eq!(vm.total, 3);
    }

    #[test]
    fn time_spent_is_minutes_and_padded_seconds() {
        assert_eq!(format_time_spent(725), "12m 05s");
        assert_eq!(format_time_spent(0), "0m 00s");
    }
}
