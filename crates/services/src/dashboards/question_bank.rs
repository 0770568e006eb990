use std::sync::Arc;

use olympiad_core::model::{
    Capability, DraftErrors, MatchSetDraft, MatchSetId, MatchSetSummary, NewQuestion, QuestionDraft,
    SessionUser,
};
use storage::repository::MatchSetRepository;
use tracing::{debug, info};

use super::authorize;
use crate::error::DashboardError;

/// Download name for `QUESTION_TEMPLATE_CSV`.
pub const QUESTION_TEMPLATE_FILE_NAME: &str = "questions_template.csv";

/// Sample upload file: header plus two rows.
pub const QUESTION_TEMPLATE_CSV: &str = "Question,Option A,Option B,Option C,Option D,Correct Answer\n\
\"What is 2+2?\",\"2\",\"3\",\"4\",\"5\",\"4\"\n\
\"Capital of France?\",\"London\",\"Berlin\",\"Paris\",\"Madrid\",\"Paris\"\n";

/// A CSV row that did not become a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line in the file, header included.
    pub line: u64,
    pub reason: String,
}

/// Questions read from an upload file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionImport {
    pub questions: Vec<NewQuestion>,
    pub skipped: Vec<SkippedRow>,
}

/// Admin authoring of mock tests and their questions.
#[derive(Clone)]
pub struct MockTestAdminService {
    match_sets: Arc<dyn MatchSetRepository>,
}

impl MockTestAdminService {
    #[must_use]
    pub fn new(match_sets: Arc<dyn MatchSetRepository>) -> Self {
        Self { match_sets }
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` or `DashboardError::Api`.
    pub async fn list(&self, viewer: &SessionUser) -> Result<Vec<MatchSetSummary>, DashboardError> {
        authorize(viewer, Capability::ManageMockTests, "Only admins can manage mock tests")?;
        Ok(self.match_sets.list_match_sets().await?)
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Invalid`, `DashboardError::Forbidden` or
    /// `DashboardError::Api`.
    pub async fn create(
        &self,
        viewer: &SessionUser,
        draft: MatchSetDraft,
    ) -> Result<MatchSetSummary, DashboardError> {
        authorize(viewer, Capability::ManageMockTests, "Only admins can create mock tests")?;
        let valid = draft.validate()?;
        let summary = self.match_sets.create_match_set(&valid).await?;
        info!(match_set_id = %summary.id, "mock test created");
        Ok(summary)
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` or `DashboardError::Api`.
    pub async fn remove(&self, viewer: &SessionUser, id: MatchSetId) -> Result<(), DashboardError> {
        authorize(viewer, Capability::ManageMockTests, "Only admin users can delete mock tests")?;
        self.match_sets.delete_match_set(id).await?;
        info!(match_set_id = %id, "mock test deleted");
        Ok(())
    }

    /// Upload a batch of questions in one request.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Invalid` for an empty batch, or the role and
    /// request errors of `create`.
    pub async fn upload_questions(
        &self,
        viewer: &SessionUser,
        id: MatchSetId,
        questions: &[NewQuestion],
    ) -> Result<(), DashboardError> {
        authorize(viewer, Capability::ManageMockTests, "Only admins can upload questions")?;
        if questions.is_empty() {
            let mut errors = DraftErrors::new();
            errors.push("questions", "Add at least one question before uploading");
            return Err(errors.into());
        }
        self.match_sets.add_questions(id, questions).await?;
        info!(match_set_id = %id, count = questions.len(), "questions uploaded");
        Ok(())
    }

    /// Validate the single-question form for the pending batch.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Invalid` with every field message.
    pub fn stage_question(draft: QuestionDraft) -> Result<NewQuestion, DashboardError> {
        Ok(draft.validate()?)
    }

    /// Read `Question, Option A..D, Correct Answer` rows after a header line.
    ///
    /// Rows with a blank cell or an answer naming none of the options are
    /// skipped and reported.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Import` if the text is not readable CSV.
    pub fn parse_question_csv(text: &str) -> Result<QuestionImport, DashboardError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());
        let mut import = QuestionImport::default();
        for record in reader.records() {
            let record = record.map_err(import_error)?;
            let line = record.position().map_or(0, csv::Position::line);
            if record.iter().all(str::is_empty) {
                continue;
            }
            let cell = |index: usize| record.get(index).unwrap_or_default().to_string();
            let draft = QuestionDraft {
                text: cell(0),
                options: [cell(1), cell(2), cell(3), cell(4)],
                correct_answer: cell(5),
            };
            match draft.validate() {
                Ok(question) => import.questions.push(question),
                Err(errors) => {
                    debug!(line, reason = %errors, "skipping question row");
                    import.skipped.push(SkippedRow {
                        line,
                        reason: errors.to_string(),
                    });
                }
            }
        }
        Ok(import)
    }
}

fn import_error(err: impl std::fmt::Display) -> DashboardError {
    DashboardError::Import(err.to_string())
}
