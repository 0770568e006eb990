use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SheetError {
    #[error("question index {index} out of range (exam has {len})")]
    QuestionOutOfRange { index: usize, len: usize },

    #[error("option index {option} out of range for question {index}")]
    OptionOutOfRange { index: usize, option: usize },

    #[error("saved progress has {found} slots, exam has {expected}")]
    LengthMismatch { expected: usize, found: usize },
}

/// Palette state for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionStatus {
    NotVisited,
    Answered,
    NotAnswered,
    Marked,
    AnsweredAndMarked,
}

impl QuestionStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NotVisited => "Not Visited",
            Self::Answered => "Answered",
            Self::NotAnswered => "Not Answered",
            Self::Marked => "Marked for Review",
            Self::AnsweredAndMarked => "Answered & Marked",
        }
    }

    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::NotVisited => "status-not-visited",
            Self::Answered => "status-answered",
            Self::NotAnswered => "status-not-answered",
            Self::Marked => "status-marked",
            Self::AnsweredAndMarked => "status-answered-marked",
        }
    }
}

/// Answers and review flags for one attempt.
///
/// All three vectors always have one slot per question; every mutator checks
/// bounds and leaves the sheet untouched on error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: Vec<Option<usize>>,
    marked: Vec<bool>,
    visited: Vec<bool>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new(question_count: usize) -> Self {
        Self {
            answers: vec![None; question_count],
            marked: vec![false; question_count],
            visited: vec![false; question_count],
        }
    }

    /// Rebuilds a sheet from persisted progress.
    ///
    /// Visited flags are not persisted; any answered or marked slot counts as
    /// visited.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::LengthMismatch` when either vector disagrees with
    /// the number of questions, `SheetError::OptionOutOfRange` when a saved
    /// answer points past its question's options.
    pub fn restore(
        option_counts: &[usize],
        answers: Vec<Option<usize>>,
        marked: Vec<bool>,
    ) -> Result<Self, SheetError> {
        let question_count = option_counts.len();
        for found in [answers.len(), marked.len()] {
            if found != question_count {
                return Err(SheetError::LengthMismatch {
                    expected: question_count,
                    found,
                });
            }
        }
        for (index, (answer, count)) in answers.iter().zip(option_counts).enumerate() {
            if let Some(option) = *answer {
                if option >= *count {
                    return Err(SheetError::OptionOutOfRange { index, option });
                }
            }
        }
        let visited = answers
            .iter()
            .zip(&marked)
            .map(|(answer, flag)| answer.is_some() || *flag)
            .collect();
        Ok(Self {
            answers,
            marked,
            visited,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn marked(&self) -> &[bool] {
        &self.marked
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<usize> {
        self.answers.get(index).copied().flatten()
    }

    #[must_use]
    pub fn is_marked(&self, index: usize) -> bool {
        self.marked.get(index).copied().unwrap_or(false)
    }

    fn check(&self, index: usize) -> Result<(), SheetError> {
        if index < self.len() {
            Ok(())
        } else {
            Err(SheetError::QuestionOutOfRange {
                index,
                len: self.len(),
            })
        }
    }

    /// Overwrites the answer for `index`.
    ///
    /// # Errors
    ///
    /// Returns `SheetError` when `index` or `option` is out of range.
    pub fn set_answer(
        &mut self,
        index: usize,
        option: usize,
        option_count: usize,
    ) -> Result<(), SheetError> {
        self.check(index)?;
        if option >= option_count {
            return Err(SheetError::OptionOutOfRange { index, option });
        }
        self.answers[index] = Some(option);
        self.visited[index] = true;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SheetError::QuestionOutOfRange` for a bad index.
    pub fn clear_answer(&mut self, index: usize) -> Result<(), SheetError> {
        self.check(index)?;
        self.answers[index] = None;
        Ok(())
    }

    /// Flips the review flag and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::QuestionOutOfRange` for a bad index.
    pub fn toggle_marked(&mut self, index: usize) -> Result<bool, SheetError> {
        self.check(index)?;
        let flag = !self.marked[index];
        self.marked[index] = flag;
        self.visited[index] = true;
        Ok(flag)
    }

    /// # Errors
    ///
    /// Returns `SheetError::QuestionOutOfRange` for a bad index.
    pub fn visit(&mut self, index: usize) -> Result<(), SheetError> {
        self.check(index)?;
        self.visited[index] = true;
        Ok(())
    }

    #[must_use]
    pub fn status(&self, index: usize) -> QuestionStatus {
        let answered = self.answer(index).is_some();
        let marked = self.is_marked(index);
        match (answered, marked) {
            (true, true) => QuestionStatus::AnsweredAndMarked,
            (true, false) => QuestionStatus::Answered,
            (false, true) => QuestionStatus::Marked,
            (false, false) if self.visited.get(index).copied().unwrap_or(false) => {
                QuestionStatus::NotAnswered
            }
            (false, false) => QuestionStatus::NotVisited,
        }
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|slot| slot.is_some()).count()
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.len() - self.answered_count()
    }

    #[must_use]
    pub fn marked_count(&self) -> usize {
        self.marked.iter().filter(|flag| **flag).count()
    }

    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        if self.is_empty() {
            return 0;
        }
        let pct = self.answered_count() * 100 / self.len();
        u8::try_from(pct).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_follow_answers_and_flags() {
        let mut sheet = AnswerSheet::new(4);
        sheet.set_answer(0, 2, 4).unwrap();
        sheet.set_answer(3, 0, 4).unwrap();
        sheet.toggle_marked(1).unwrap();
        assert_eq!(sheet.answered_count(), 2);
        assert_eq!(sheet.unanswered_count(), 2);
        assert_eq!(sheet.marked_count(), 1);
        assert_eq!(sheet.progress_percent(), 50);
    }

    #[test]
    fn out_of_range_leaves_sheet_unchanged() {
        let mut sheet = AnswerSheet::new(2);
        let before = sheet.clone();
        assert!(matches!(
            sheet.set_answer(2, 0, 4),
            Err(SheetError::QuestionOutOfRange { index: 2, len: 2 })
        ));
        assert!(matches!(
            sheet.set_answer(0, 4, 4),
            Err(SheetError::OptionOutOfRange { .. })
        ));
        assert!(sheet.toggle_marked(5).is_err());
        assert_eq!(sheet, before);
    }

    #[test]
    fn restore_refuses_wrong_length() {
        let err = AnswerSheet::restore(&[4; 3], vec![None, Some(1)], vec![false; 3]).unwrap_err();
        assert_eq!(err, SheetError::LengthMismatch {
            expected: 3,
            found: 2
        });
        let err = AnswerSheet::restore(&[4; 2], vec![None, None], vec![true]).unwrap_err();
        assert!(matches!(err, SheetError::LengthMismatch { found: 1, .. }));
    }

    #[test]
    fn restore_refuses_unknown_option() {
        let err = AnswerSheet::restore(&[4; 3], vec![Some(9), None, Some(1)], vec![false; 3])
            .unwrap_err();
        assert_eq!(err, SheetError::OptionOutOfRange {
            index: 0,
            option: 9
        });
        let err = AnswerSheet::restore(&[4, 2], vec![Some(3), Some(2)], vec![false; 2]).unwrap_err();
        assert_eq!(err, SheetError::OptionOutOfRange {
            index: 1,
            option: 2
        });
    }

    #[test]
    fn palette_status_combines_answer_mark_and_visit() {
        let mut sheet = AnswerSheet::restore(&[4; 4], vec![Some(1), Some(0), None, None], vec![
            false, true, true, false,
        ])
        .unwrap();
        assert_eq!(sheet.status(0), QuestionStatus::Answered);
        assert_eq!(sheet.status(1), QuestionStatus::AnsweredAndMarked);
        assert_eq!(sheet.status(2), QuestionStatus::Marked);
        assert_eq!(sheet.status(3), QuestionStatus::NotVisited);
        sheet.visit(3).unwrap();
        assert_eq!(sheet.status(3), QuestionStatus::NotAnswered);
    }

    #[test]
    fn clearing_keeps_visit() {
        let mut sheet = AnswerSheet::new(1);
        sheet.set_answer(0, 1, 2).unwrap();
        sheet.clear_answer(0).unwrap();
        assert_eq!(sheet.answer(0), None);
        assert_eq!(sheet.status(0), QuestionStatus::NotAnswered);
    }
}
