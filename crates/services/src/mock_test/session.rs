use std::fmt;

use olympiad_core::model::{
    AnswerSheet, Countdown, ExamSession, MatchSetId, Question, QuestionStatus, SubmissionResult,
    SubmittedAnswer, UserId,
};
use storage::repository::SavedProgress;

use crate::error::{MockTestError, SubmitError};

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Where an attempt is in its lifecycle.
///
/// `Instructions → InProgress → Submitting → Submitted`; a failed submission
/// goes back to `InProgress`, and the timer reaching zero moves `InProgress`
/// to `AutoSubmitting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Instructions,
    InProgress,
    Submitting,
    AutoSubmitting,
    Submitted,
}

/// Browser-level side effects the view must perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    RequestFullscreen,
    ExitFullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer is not running in the current phase.
    Idle,
    Running { seconds_remaining: u32 },
    /// Time ran out on this tick; the caller must submit.
    Expired,
}

/// Counts shown in the submit confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitSummary {
    pub answered: usize,
    pub not_answered: usize,
    pub marked: usize,
}

/// Everything needed to post an attempt, captured when submission begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub exam_id: MatchSetId,
    pub exam_title: String,
    pub student: UserId,
    pub answers: Vec<SubmittedAnswer>,
    pub total_questions: usize,
    pub time_spent_seconds: u32,
    pub automatic: bool,
}

/// One student's attempt at one mock test.
///
/// Pure state: persistence and network calls live in `MockTestService`.
#[derive(Clone, PartialEq)]
pub struct MockTestSession {
    exam: ExamSession,
    student: UserId,
    sheet: AnswerSheet,
    current: usize,
    countdown: Countdown,
    phase: Phase,
    result: Option<SubmissionResult>,
    submit_error: Option<String>,
    restored: bool,
}

impl MockTestSession {
    #[must_use]
    pub fn new(exam: ExamSession, student: UserId) -> Self {
        let sheet = AnswerSheet::new(exam.question_count());
        let countdown = Countdown::new(exam.duration_seconds());
        Self {
            exam,
            student,
            sheet,
            current: 0,
            countdown,
            phase: Phase::Instructions,
            result: None,
            submit_error: None,
            restored: false,
        }
    }

    /// Reapplies saved answers, flags and position.
    ///
    /// # Errors
    ///
    /// Returns `MockTestError::Sheet` when the saved vectors or option indices
    /// do not match the exam; the session is left untouched.
    pub fn restore(&mut self, saved: SavedProgress) -> Result<(), MockTestError> {
        let option_counts: Vec<usize> = self
            .exam
            .questions()
            .iter()
            .map(|question| question.options().len())
            .collect();
        let sheet = AnswerSheet::restore(&option_counts, saved.answers, saved.marked)?;
        self.sheet = sheet;
        self.current = saved.current.min(self.exam.question_count().saturating_sub(1));
        let _ = self.sheet.visit(self.current);
        self.restored = true;
        Ok(())
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn exam(&self) -> &ExamSession {
        &self.exam
    }

    #[must_use]
    pub fn exam_id(&self) -> MatchSetId {
        self.exam.exam_id()
    }

    #[must_use]
    pub fn student(&self) -> UserId {
        self.student
    }

    #[must_use]
    pub fn sheet(&self) -> &AnswerSheet {
        &self.sheet
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.exam.question(self.current)
    }

    #[must_use]
    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    #[must_use]
    pub fn result(&self) -> Option<&SubmissionResult> {
        self.result.as_ref()
    }

    /// Message from the last failed submission, cleared on the next attempt.
    #[must_use]
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    #[must_use]
    pub fn was_restored(&self) -> bool {
        self.restored
    }

    #[must_use]
    pub fn status(&self, index: usize) -> QuestionStatus {
        self.sheet.status(index)
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.exam.question_count()
    }

    /// The page should warn before unloading.
    #[must_use]
    pub fn guards_unload(&self) -> bool {
        matches!(
            self.phase,
            Phase::InProgress | Phase::Submitting | Phase::AutoSubmitting
        )
    }

    #[must_use]
    pub fn time_spent_seconds(&self) -> u32 {
        self.exam
            .duration_seconds()
            .saturating_sub(self.countdown.seconds_remaining())
    }

    #[must_use]
    pub fn submit_summary(&self) -> SubmitSummary {
        SubmitSummary {
            answered: self.sheet.answered_count(),
            not_answered: self.sheet.unanswered_count(),
            marked: self.sheet.marked_count(),
        }
    }

    /// Snapshot written to local storage after every change.
    #[must_use]
    pub fn progress(&self) -> SavedProgress {
        SavedProgress {
            answers: self.sheet.answers().to_vec(),
            marked: self.sheet.marked().to_vec(),
            current: self.current,
        }
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    fn require(&self, phase: Phase) -> Result<(), MockTestError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(MockTestError::WrongPhase(self.phase))
        }
    }

    /// Dismisses the instructions and starts the clock.
    ///
    /// # Errors
    ///
    /// Returns `MockTestError::WrongPhase` unless the instructions are showing.
    pub fn start(&mut self) -> Result<SessionEffect, MockTestError> {
        self.require(Phase::Instructions)?;
        self.phase = Phase::InProgress;
        let _ = self.sheet.visit(self.current);
        Ok(SessionEffect::RequestFullscreen)
    }

    /// # Errors
    ///
    /// Returns `MockTestError` outside `InProgress` or for out-of-range indices.
    pub fn select_answer(&mut self, question: usize, option: usize) -> Result<(), MockTestError> {
        self.require(Phase::InProgress)?;
        let option_count = self
            .exam
            .question(question)
            .map_or(0, |q| q.options().len());
        self.sheet.set_answer(question, option, option_count)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `MockTestError` outside `InProgress` or for an out-of-range index.
    pub fn clear_answer(&mut self, question: usize) -> Result<(), MockTestError> {
        self.require(Phase::InProgress)?;
        self.sheet.clear_answer(question)?;
        Ok(())
    }

    /// Flips the review flag and returns its new value.
    ///
    /// # Errors
    ///
    /// Returns `MockTestError` outside `InProgress` or for an out-of-range index.
    pub fn toggle_review(&mut self, question: usize) -> Result<bool, MockTestError> {
        self.require(Phase::InProgress)?;
        Ok(self.sheet.toggle_marked(question)?)
    }

    /// # Errors
    ///
    /// Returns `MockTestError` outside `InProgress` or for an out-of-range index.
    pub fn go_to(&mut self, question: usize) -> Result<(), MockTestError> {
        self.require(Phase::InProgress)?;
        self.sheet.visit(question)?;
        self.current = question;
        Ok(())
    }

    /// Moves forward; stays put on the last question.
    ///
    /// # Errors
    ///
    /// Returns `MockTestError::WrongPhase` outside `InProgress`.
    pub fn next(&mut self) -> Result<(), MockTestError> {
        if self.is_last() {
            return self.require(Phase::InProgress);
        }
        self.go_to(self.current + 1)
    }

    /// # Errors
    ///
    /// Returns `MockTestError::WrongPhase` outside `InProgress`.
    pub fn previous(&mut self) -> Result<(), MockTestError> {
        if self.is_first() {
            return self.require(Phase::InProgress);
        }
        self.go_to(self.current - 1)
    }

    /// Advances the timer by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != Phase::InProgress {
            return TickOutcome::Idle;
        }
        if self.countdown.tick() {
            self.phase = Phase::AutoSubmitting;
            return TickOutcome::Expired;
        }
        if self.countdown.is_expired() {
            // A failed auto-submit leaves the clock at zero; the student submits manually.
            return TickOutcome::Idle;
        }
        TickOutcome::Running {
            seconds_remaining: self.countdown.seconds_remaining(),
        }
    }

    /// Freezes the attempt and builds the payload to post.
    ///
    /// Accepted from `InProgress` (manual) and `AutoSubmitting` (timer).
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::AlreadySubmitted` once submitted or while a
    /// manual submission is in flight, `MockTestError::WrongPhase` before start.
    pub fn begin_submit(&mut self) -> Result<SubmissionRequest, SubmitError> {
        let automatic = match self.phase {
            Phase::InProgress => {
                self.phase = Phase::Submitting;
                false
            }
            Phase::AutoSubmitting => true,
            Phase::Submitting | Phase::Submitted => return Err(SubmitError::AlreadySubmitted),
            Phase::Instructions => return Err(MockTestError::WrongPhase(self.phase).into()),
        };
        self.submit_error = None;

        let answers = self
            .exam
            .questions()
            .iter()
            .enumerate()
            .filter_map(|(idx, question)| {
                let option = self.sheet.answer(idx)?;
                Some(SubmittedAnswer {
                    question_id: question.id(),
                    selected_answer: question.option(option)?.to_string(),
                })
            })
            .collect();

        Ok(SubmissionRequest {
            exam_id: self.exam.exam_id(),
            exam_title: self.exam.title().to_string(),
            student: self.student,
            answers,
            total_questions: self.exam.question_count(),
            time_spent_seconds: self.time_spent_seconds(),
            automatic,
        })
    }

    /// Records the graded result.
    ///
    /// # Errors
    ///
    /// Returns `MockTestError::WrongPhase` unless a submission is in flight.
    pub fn complete_submit(
        &mut self,
        result: SubmissionResult,
    ) -> Result<SessionEffect, MockTestError> {
        match self.phase {
            Phase::Submitting | Phase::AutoSubmitting => {
                self.phase = Phase::Submitted;
                self.result = Some(result);
                Ok(SessionEffect::ExitFullscreen)
            }
            other => Err(MockTestError::WrongPhase(other)),
        }
    }

    /// Rolls a failed submission back to `InProgress`, keeping every answer.
    pub fn fail_submit(&mut self, message: impl Into<String>) {
        if matches!(self.phase, Phase::Submitting | Phase::AutoSubmitting) {
            self.phase = Phase::InProgress;
            self.submit_error = Some(message.into());
        }
    }
}

impl fmt::Debug for MockTestSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTestSession")
            .field("exam_id", &self.exam.exam_id())
            .field("questions", &self.exam.question_count())
            .field("current", &self.current)
            .field("phase", &self.phase)
            .field("seconds_remaining", &self.countdown.seconds_remaining())
            .field("answered", &self.sheet.answered_count())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
