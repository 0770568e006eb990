use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use olympiad_core::model::{
    ActiveStatus, Blog, BlogId, BlogImage, Credentials, ExamResult, ExamSession, LoginIdentifier,
    MatchSetId, MatchSetSummary, NewQuestion, Question, QuestionId, Role, SalesPerson,
    SalesPersonId, School, SchoolId, SessionUser, SubmissionResult, SubmittedAnswer, Task,
    TaskAssignee, TaskId, UpcomingExam, UpcomingExamId, UserAccount, UserId, UserUpdate, ValidBlog,
    ValidMatchSet, ValidNewUser, ValidSalesPerson, ValidSchool, ValidTask, ValidUpcomingExam,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    /// Non-success HTTP status; `message` is the response body when present.
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Text suitable for an error banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } if !message.trim().is_empty() => message.trim().to_string(),
            Self::Status { status, .. } => format!("Request failed with status {status}"),
            Self::NotFound => "Not found".to_string(),
            Self::Conflict => "Already exists".to_string(),
            Self::Connection(_) => "Could not reach the server. Check your connection.".to_string(),
            Self::Serialization(_) => "The server sent an unexpected response.".to_string(),
        }
    }
}

//
// ─── REMOTE API ────────────────────────────────────────────────────────────────
//

/// Mock-test catalogue, exam payloads and grading.
#[async_trait]
pub trait MatchSetRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the catalogue cannot be fetched.
    async fn list_match_sets(&self) -> Result<Vec<MatchSetSummary>, StorageError>;

    /// Fetch a match set with its questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown ids, or other storage errors.
    async fn get_match_set(&self, id: MatchSetId) -> Result<ExamSession, StorageError>;

    /// Post answers for grading.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the submission is rejected or cannot be sent.
    async fn submit_answers(
        &self,
        id: MatchSetId,
        student: UserId,
        answers: &[SubmittedAnswer],
    ) -> Result<SubmissionResult, StorageError>;

    /// Create an empty match set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the match set is rejected.
    async fn create_match_set(
        &self,
        match_set: &ValidMatchSet,
    ) -> Result<MatchSetSummary, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown ids, or other storage errors.
    async fn delete_match_set(&self, id: MatchSetId) -> Result<(), StorageError>;

    /// Append questions to a match set in one request.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown ids, or other storage errors.
    async fn add_questions(
        &self,
        id: MatchSetId,
        questions: &[NewQuestion],
    ) -> Result<(), StorageError>;
}

/// The upcoming-exams board.
#[async_trait]
pub trait UpcomingExamRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be fetched.
    async fn list_exams(&self) -> Result<Vec<UpcomingExam>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the exam is rejected.
    async fn create_exam(&self, exam: &ValidUpcomingExam) -> Result<UpcomingExam, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown ids, or other storage errors.
    async fn update_exam(
        &self,
        id: &UpcomingExamId,
        exam: &ValidUpcomingExam,
    ) -> Result<UpcomingExam, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown ids, or other storage errors.
    async fn delete_exam(&self, id: &UpcomingExamId) -> Result<(), StorageError>;

    /// Flip the recommended flag on the server.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown ids, or other storage errors.
    async fn toggle_recommended(&self, id: &UpcomingExamId) -> Result<(), StorageError>;
}

/// Tasks assigned to the sales team.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be fetched.
    async fn list_tasks(&self) -> Result<Vec<Task>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown assignee, or other
    /// storage errors.
    async fn assign_task(&self, task: &ValidTask) -> Result<Task, StorageError>;
}

#[async_trait]
pub trait SchoolRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be fetched.
    async fn list_schools(&self, active_only: bool) -> Result<Vec<School>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the school is rejected.
    async fn create_school(&self, school: &ValidSchool) -> Result<School, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown ids, or other storage errors.
    async fn update_school(&self, id: &SchoolId, school: &ValidSchool)
    -> Result<School, StorageError>;

    /// Flip active/inactive on the server and return the new record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown ids, or other storage errors.
    async fn toggle_school_status(&self, id: &SchoolId) -> Result<School, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown ids, or other storage errors.
    async fn delete_school(&self, id: &SchoolId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait SalesRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be fetched.
    async fn list_sales_people(&self) -> Result<Vec<SalesPerson>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` for a duplicate email, or other storage errors.
    async fn register_sales_person(
        &self,
        person: &ValidSalesPerson,
    ) -> Result<SalesPerson, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown ids, or other storage errors.
    async fn set_sales_status(
        &self,
        id: SalesPersonId,
        status: ActiveStatus,
    ) -> Result<(), StorageError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be fetched.
    async fn list_users(&self) -> Result<Vec<UserAccount>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` for a duplicate email, or other storage errors.
    async fn create_user(&self, user: &ValidNewUser) -> Result<UserAccount, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown ids, or other storage errors.
    async fn update_user(&self, id: UserId, user: &UserUpdate)
    -> Result<UserAccount, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown ids, or other storage errors.
    async fn delete_user(&self, id: UserId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be fetched.
    async fn list_blogs(&self) -> Result<Vec<Blog>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the blog or image is rejected.
    async fn create_blog(
        &self,
        blog: &ValidBlog,
        image: Option<&BlogImage>,
    ) -> Result<Blog, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown ids, or other storage errors.
    async fn update_blog(
        &self,
        id: &BlogId,
        blog: &ValidBlog,
        image: Option<&BlogImage>,
    ) -> Result<Blog, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown ids, or other storage errors.
    async fn delete_blog(&self, id: &BlogId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ExamResultRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the results cannot be fetched.
    async fn results_for_user(&self, id: UserId) -> Result<Vec<ExamResult>, StorageError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Exchange credentials for the account they belong to.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Status` with 401 for bad credentials, or other
    /// storage errors.
    async fn login(&self, credentials: &Credentials) -> Result<SessionUser, StorageError>;
}

//
// ─── LOCAL PERSISTENCE ─────────────────────────────────────────────────────────
//

/// Raw string key/value store backing local persistence.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    async fn remove_value(&self, key: &str) -> Result<(), StorageError>;

    /// Writes every pair or none of them.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the values cannot be written.
    async fn set_values(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError>;

    /// Removes every key or none of them.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    async fn remove_values(&self, keys: &[&str]) -> Result<(), StorageError>;
}

/// In-progress answers for one mock test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedProgress {
    pub answers: Vec<Option<usize>>,
    pub marked: Vec<bool>,
    pub current: usize,
}

/// The three keys one attempt is stored under.
#[must_use]
pub fn progress_keys(exam_id: MatchSetId) -> [String; 3] {
    [
        format!("mocktest_{exam_id}_answers"),
        format!("mocktest_{exam_id}_marked"),
        format!("mocktest_{exam_id}_current"),
    ]
}

/// Key the remembered login lives under.
pub const SESSION_USER_KEY: &str = "user";

/// Persistence adapter for mock-test progress.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Progress is only returned when all three keys are present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for unreadable values, or other
    /// storage errors.
    async fn load_progress(&self, exam_id: MatchSetId)
    -> Result<Option<SavedProgress>, StorageError>;

    /// All three keys are written together.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the progress cannot be written.
    async fn save_progress(
        &self,
        exam_id: MatchSetId,
        progress: &SavedProgress,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the keys cannot be removed.
    async fn clear_progress(&self, exam_id: MatchSetId) -> Result<(), StorageError>;
}

/// Stored shape of the remembered login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl SessionRecord {
    #[must_use]
    pub fn from_user(user: &SessionUser) -> Self {
        Self {
            id: user.id().value(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            role: user.role().as_str().to_string(),
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` when the stored role is unknown.
    pub fn into_user(self) -> Result<SessionUser, StorageError> {
        let role =
            Role::parse(&self.role).map_err(|err| StorageError::Serialization(err.to_string()))?;
        Ok(SessionUser::new(UserId::new(self.id), self.name, self.email, role))
    }
}

/// Persistence adapter for the remembered login.
#[async_trait]
pub trait SessionRecordRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for an unreadable record, or other
    /// storage errors.
    async fn load_user(&self) -> Result<Option<SessionRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    async fn save_user(&self, record: &SessionRecord) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be removed.
    async fn clear_user(&self) -> Result<(), StorageError>;
}

fn decode<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(|err| StorageError::Serialization(err.to_string()))
}

fn encode<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|err| StorageError::Serialization(err.to_string()))
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> ProgressRepository for T {
    async fn load_progress(
        &self,
        exam_id: MatchSetId,
    ) -> Result<Option<SavedProgress>, StorageError> {
        let [answers_key, marked_key, current_key] = progress_keys(exam_id);
        let answers = self.get_value(&answers_key).await?;
        let marked = self.get_value(&marked_key).await?;
        let current = self.get_value(&current_key).await?;
        let (Some(answers), Some(marked), Some(current)) = (answers, marked, current) else {
            return Ok(None);
        };
        Ok(Some(SavedProgress {
            answers: decode(&answers)?,
            marked: decode(&marked)?,
            current: decode(&current)?,
        }))
    }

    async fn save_progress(
        &self,
        exam_id: MatchSetId,
        progress: &SavedProgress,
    ) -> Result<(), StorageError> {
        let [answers_key, marked_key, current_key] = progress_keys(exam_id);
        let answers = encode(&progress.answers)?;
        let marked = encode(&progress.marked)?;
        let current = progress.current.to_string();
        self.set_values(&[
            (answers_key.as_str(), answers.as_str()),
            (marked_key.as_str(), marked.as_str()),
            (current_key.as_str(), current.as_str()),
        ])
        .await
    }

    async fn clear_progress(&self, exam_id: MatchSetId) -> Result<(), StorageError> {
        let [answers_key, marked_key, current_key] = progress_keys(exam_id);
        self.remove_values(&[
            answers_key.as_str(),
            marked_key.as_str(),
            current_key.as_str(),
        ])
        .await
    }
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> SessionRecordRepository for T {
    async fn load_user(&self) -> Result<Option<SessionRecord>, StorageError> {
        match self.get_value(SESSION_USER_KEY).await? {
            Some(raw) => decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    async fn save_user(&self, record: &SessionRecord) -> Result<(), StorageError> {
        self.set_value(SESSION_USER_KEY, &encode(record)?).await
    }

    async fn clear_user(&self) -> Result<(), StorageError> {
        self.remove_value(SESSION_USER_KEY).await
    }
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// A match set as the fake backend holds it; it may have no questions yet.
struct StoredMatchSet {
    summary: MatchSetSummary,
    questions: Vec<Question>,
}

impl StoredMatchSet {
    fn summary(&self) -> MatchSetSummary {
        MatchSetSummary {
            question_count: u32::try_from(self.questions.len()).unwrap_or(u32::MAX),
            ..self.summary.clone()
        }
    }

    fn to_exam(&self) -> Result<ExamSession, StorageError> {
        ExamSession::new(
            self.summary.id,
            self.summary.title.clone(),
            self.summary.subject.clone(),
            self.summary.date,
            Some(self.summary.duration_minutes),
            self.questions.clone(),
        )
        .map_err(|err| StorageError::Serialization(err.to_string()))
    }
}

#[derive(Default)]
struct Backend {
    values: HashMap<String, String>,
    match_sets: Vec<StoredMatchSet>,
    exams: Vec<UpcomingExam>,
    tasks: Vec<Task>,
    schools: Vec<School>,
    sales: Vec<SalesPerson>,
    users: Vec<UserAccount>,
    passwords: HashMap<String, String>,
    phones: HashMap<String, String>,
    accounts: Vec<SessionUser>,
    blogs: Vec<Blog>,
    results: HashMap<UserId, Vec<ExamResult>>,
    submissions: Vec<(MatchSetId, UserId, Vec<SubmittedAnswer>)>,
}

/// In-memory stand-in for both the remote API and local storage.
///
/// Ids are assigned from one counter. `set_offline(true)` makes every remote
/// call fail with a connection error.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<Backend>>,
    next_id: Arc<AtomicU64>,
    offline: Arc<AtomicBool>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(Backend::default())),
            next_id: Arc::new(AtomicU64::new(1)),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, Backend>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    fn remote(&self) -> Result<MutexGuard<'_, Backend>, StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("offline".into()));
        }
        self.lock()
    }

    fn allocate(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Seed a match set; grading uses the questions' answer keys.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing lock is poisoned.
    pub fn insert_match_set(&self, exam: ExamSession) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard
            .match_sets
            .retain(|existing| existing.summary.id != exam.exam_id());
        guard.match_sets.push(StoredMatchSet {
            summary: summary_of(&exam),
            questions: exam.questions().to_vec(),
        });
        Ok(())
    }

    /// Seed a login account.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing lock is poisoned.
    pub fn insert_account(
        &self,
        user: SessionUser,
        phone: Option<&str>,
        password: &str,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard
            .passwords
            .insert(user.email().to_string(), password.to_string());
        if let Some(phone) = phone {
            guard.passwords.insert(phone.to_string(), password.to_string());
            guard.phones.insert(phone.to_string(), user.email().to_string());
        }
        guard.accounts.push(user);
        Ok(())
    }

    /// Seed past results for a student.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing lock is poisoned.
    pub fn insert_results(&self, user: UserId, results: Vec<ExamResult>) -> Result<(), StorageError> {
        self.lock()?.results.insert(user, results);
        Ok(())
    }

    /// Submissions received so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing lock is poisoned.
    pub fn submissions(
        &self,
    ) -> Result<Vec<(MatchSetId, UserId, Vec<SubmittedAnswer>)>, StorageError> {
        Ok(self.lock()?.submissions.clone())
    }
}

fn summary_of(exam: &ExamSession) -> MatchSetSummary {
    MatchSetSummary {
        id: exam.exam_id(),
        title: exam.title().to_string(),
        subject: exam.subject().to_string(),
        date: exam.date(),
        duration_minutes: exam.duration_seconds() / 60,
        question_count: u32::try_from(exam.question_count()).unwrap_or(u32::MAX),
    }
}

fn grade(questions: &[Question], answers: &[SubmittedAnswer]) -> SubmissionResult {
    let total = questions.len();
    let mut correct = 0_u32;
    let mut incorrect = 0_u32;
    for answer in answers {
        let Some(question) = questions
            .iter()
            .find(|question| question.id() == answer.question_id)
        else {
            continue;
        };
        let key = question
            .correct_answer()
            .and_then(|idx| question.option(idx));
        if key == Some(answer.selected_answer.as_str()) {
            correct += 1;
        } else {
            incorrect += 1;
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let percentage = if total == 0 {
        0.0
    } else {
        f64::from(correct) * 100.0 / total as f64
    };
    SubmissionResult {
        total_questions: u32::try_from(total).unwrap_or(u32::MAX),
        correct_answers: correct,
        incorrect_answers: incorrect,
        percentage,
        result_status: if percentage >= 50.0 { "PASS" } else { "FAIL" }.to_string(),
    }
}

#[async_trait]
impl MatchSetRepository for InMemoryRepository {
    async fn list_match_sets(&self) -> Result<Vec<MatchSetSummary>, StorageError> {
        Ok(self
            .remote()?
            .match_sets
            .iter()
            .map(StoredMatchSet::summary)
            .collect())
    }

    async fn get_match_set(&self, id: MatchSetId) -> Result<ExamSession, StorageError> {
        self.remote()?
            .match_sets
            .iter()
            .find(|stored| stored.summary.id == id)
            .ok_or(StorageError::NotFound)?
            .to_exam()
    }

    async fn submit_answers(
        &self,
        id: MatchSetId,
        student: UserId,
        answers: &[SubmittedAnswer],
    ) -> Result<SubmissionResult, StorageError> {
        let mut guard = self.remote()?;
        let result = guard
            .match_sets
            .iter()
            .find(|stored| stored.summary.id == id)
            .map(|stored| grade(&stored.questions, answers))
            .ok_or(StorageError::NotFound)?;
        guard.submissions.push((id, student, answers.to_vec()));
        Ok(result)
    }

    async fn create_match_set(
        &self,
        match_set: &ValidMatchSet,
    ) -> Result<MatchSetSummary, StorageError> {
        let id = MatchSetId::new(self.allocate());
        let summary = MatchSetSummary {
            id,
            title: match_set.title.clone(),
            subject: match_set.subject.clone(),
            date: Some(match_set.date),
            duration_minutes: match_set.duration_minutes,
            question_count: 0,
        };
        self.remote()?.match_sets.push(StoredMatchSet {
            summary: summary.clone(),
            questions: Vec::new(),
        });
        Ok(summary)
    }

    async fn delete_match_set(&self, id: MatchSetId) -> Result<(), StorageError> {
        let mut guard = self.remote()?;
        let before = guard.match_sets.len();
        guard.match_sets.retain(|stored| stored.summary.id != id);
        if guard.match_sets.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn add_questions(
        &self,
        id: MatchSetId,
        questions: &[NewQuestion],
    ) -> Result<(), StorageError> {
        let ids: Vec<u64> = questions.iter().map(|_| self.allocate()).collect();
        let mut guard = self.remote()?;
        let stored = guard
            .match_sets
            .iter_mut()
            .find(|stored| stored.summary.id == id)
            .ok_or(StorageError::NotFound)?;
        for (raw_id, question) in ids.into_iter().zip(questions) {
            let key = Question::resolve_answer_key(&question.options, &question.correct_answer);
            stored.questions.push(
                Question::new(
                    QuestionId::new(raw_id),
                    question.text.clone(),
                    question.options.clone(),
                )
                .with_correct_answer(key),
            );
        }
        Ok(())
    }
}

#[async_trait]
impl UpcomingExamRepository for InMemoryRepository {
    async fn list_exams(&self) -> Result<Vec<UpcomingExam>, StorageError> {
        Ok(self.remote()?.exams.clone())
    }

    async fn create_exam(&self, exam: &ValidUpcomingExam) -> Result<UpcomingExam, StorageError> {
        let id = UpcomingExamId::new(self.allocate().to_string());
        let created = exam.clone().into_exam(id);
        self.remote()?.exams.push(created.clone());
        Ok(created)
    }

    async fn update_exam(
        &self,
        id: &UpcomingExamId,
        exam: &ValidUpcomingExam,
    ) -> Result<UpcomingExam, StorageError> {
        let mut guard = self.remote()?;
        let slot = guard
            .exams
            .iter_mut()
            .find(|existing| &existing.id == id)
            .ok_or(StorageError::NotFound)?;
        *slot = exam.clone().into_exam(id.clone());
        Ok(slot.clone())
    }

    async fn delete_exam(&self, id: &UpcomingExamId) -> Result<(), StorageError> {
        let mut guard = self.remote()?;
        let before = guard.exams.len();
        guard.exams.retain(|existing| &existing.id != id);
        if guard.exams.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn toggle_recommended(&self, id: &UpcomingExamId) -> Result<(), StorageError> {
        let mut guard = self.remote()?;
        let slot = guard
            .exams
            .iter_mut()
            .find(|existing| &existing.id == id)
            .ok_or(StorageError::NotFound)?;
        slot.recommended = !slot.recommended;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryRepository {
    async fn list_tasks(&self) -> Result<Vec<Task>, StorageError> {
        Ok(self.remote()?.tasks.clone())
    }

    async fn assign_task(&self, task: &ValidTask) -> Result<Task, StorageError> {
        let id = TaskId::new(self.allocate().to_string());
        let mut guard = self.remote()?;
        let assignee = guard
            .sales
            .iter()
            .find(|person| person.id == task.assignee)
            .map(|person| TaskAssignee {
                id: person.id,
                name: person.name.clone(),
                email: Some(person.email.clone()),
            })
            .ok_or(StorageError::NotFound)?;
        let created = task.clone().into_task(id, assignee);
        guard.tasks.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl SchoolRepository for InMemoryRepository {
    async fn list_schools(&self, active_only: bool) -> Result<Vec<School>, StorageError> {
        Ok(self
            .remote()?
            .schools
            .iter()
            .filter(|school| !active_only || school.status.is_active())
            .cloned()
            .collect())
    }

    async fn create_school(&self, school: &ValidSchool) -> Result<School, StorageError> {
        let id = SchoolId::new(self.allocate().to_string());
        let mut guard = self.remote()?;
        if guard.schools.iter().any(|existing| existing.email == school.email()) {
            return Err(StorageError::Conflict);
        }
        let created = school.clone().into_school(id, ActiveStatus::Inactive);
        guard.schools.push(created.clone());
        Ok(created)
    }

    async fn update_school(
        &self,
        id: &SchoolId,
        school: &ValidSchool,
    ) -> Result<School, StorageError> {
        let mut guard = self.remote()?;
        let slot = guard
            .schools
            .iter_mut()
            .find(|existing| &existing.id == id)
            .ok_or(StorageError::NotFound)?;
        *slot = school.clone().into_school(id.clone(), slot.status);
        Ok(slot.clone())
    }

    async fn toggle_school_status(&self, id: &SchoolId) -> Result<School, StorageError> {
        let mut guard = self.remote()?;
        let slot = guard
            .schools
            .iter_mut()
            .find(|existing| &existing.id == id)
            .ok_or(StorageError::NotFound)?;
        slot.status = slot.status.toggled();
        Ok(slot.clone())
    }

    async fn delete_school(&self, id: &SchoolId) -> Result<(), StorageError> {
        let mut guard = self.remote()?;
        let before = guard.schools.len();
        guard.schools.retain(|existing| &existing.id != id);
        if guard.schools.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl SalesRepository for InMemoryRepository {
    async fn list_sales_people(&self) -> Result<Vec<SalesPerson>, StorageError> {
        Ok(self.remote()?.sales.clone())
    }

    async fn register_sales_person(
        &self,
        person: &ValidSalesPerson,
    ) -> Result<SalesPerson, StorageError> {
        let id = SalesPersonId::new(self.allocate());
        let mut guard = self.remote()?;
        if guard.sales.iter().any(|existing| existing.email == person.email()) {
            return Err(StorageError::Conflict);
        }
        let created = SalesPerson {
            id,
            name: person.name().to_string(),
            email: person.email().to_string(),
            status: ActiveStatus::Inactive,
        };
        guard.sales.push(created.clone());
        guard
            .passwords
            .insert(person.email().to_string(), person.password().to_string());
        Ok(created)
    }

    async fn set_sales_status(
        &self,
        id: SalesPersonId,
        status: ActiveStatus,
    ) -> Result<(), StorageError> {
        let mut guard = self.remote()?;
        let slot = guard
            .sales
            .iter_mut()
            .find(|existing| existing.id == id)
            .ok_or(StorageError::NotFound)?;
        slot.status = status;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn list_users(&self) -> Result<Vec<UserAccount>, StorageError> {
        Ok(self.remote()?.users.clone())
    }

    async fn create_user(&self, user: &ValidNewUser) -> Result<UserAccount, StorageError> {
        let raw_id = self.allocate();
        let mut guard = self.remote()?;
        if guard.users.iter().any(|existing| existing.email == user.email) {
            return Err(StorageError::Conflict);
        }
        let created = UserAccount {
            id: UserId::new(raw_id),
            user_code: format!("user{raw_id}"),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            school: user.school.clone(),
            user_class: user.user_class.clone(),
            registered_exams: Vec::new(),
        };
        guard.users.push(created.clone());
        guard
            .passwords
            .insert(user.email.clone(), user.password.clone());
        Ok(created)
    }

    async fn update_user(
        &self,
        id: UserId,
        user: &UserUpdate,
    ) -> Result<UserAccount, StorageError> {
        let mut guard = self.remote()?;
        let slot = guard
            .users
            .iter_mut()
            .find(|existing| existing.id == id)
            .ok_or(StorageError::NotFound)?;
        let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());
        slot.name.clone_from(&user.name);
        slot.email.clone_from(&user.email);
        slot.phone = optional(&user.phone);
        slot.school = optional(&user.school);
        slot.user_class = optional(&user.user_class);
        Ok(slot.clone())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StorageError> {
        let mut guard = self.remote()?;
        let before = guard.users.len();
        guard.users.retain(|existing| existing.id != id);
        if guard.users.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

fn stored_image_url(blog: &ValidBlog, image: Option<&BlogImage>) -> Option<String> {
    match image {
        Some(image) => Some(format!("/uploads/{}", image.file_name())),
        None => blog.image_url.clone(),
    }
}

#[async_trait]
impl BlogRepository for InMemoryRepository {
    async fn list_blogs(&self) -> Result<Vec<Blog>, StorageError> {
        Ok(self.remote()?.blogs.clone())
    }

    async fn create_blog(
        &self,
        blog: &ValidBlog,
        image: Option<&BlogImage>,
    ) -> Result<Blog, StorageError> {
        let id = BlogId::new(self.allocate().to_string());
        let mut valid = blog.clone();
        valid.image_url = stored_image_url(blog, image);
        let created = valid.into_blog(id, None);
        self.remote()?.blogs.push(created.clone());
        Ok(created)
    }

    async fn update_blog(
        &self,
        id: &BlogId,
        blog: &ValidBlog,
        image: Option<&BlogImage>,
    ) -> Result<Blog, StorageError> {
        let mut guard = self.remote()?;
        let slot = guard
            .blogs
            .iter_mut()
            .find(|existing| &existing.id == id)
            .ok_or(StorageError::NotFound)?;
        let mut valid = blog.clone();
        valid.image_url = stored_image_url(blog, image).or_else(|| slot.image_url.clone());
        *slot = valid.into_blog(id.clone(), slot.published_date);
        Ok(slot.clone())
    }

    async fn delete_blog(&self, id: &BlogId) -> Result<(), StorageError> {
        let mut guard = self.remote()?;
        let before = guard.blogs.len();
        guard.blogs.retain(|existing| &existing.id != id);
        if guard.blogs.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ExamResultRepository for InMemoryRepository {
    async fn results_for_user(&self, id: UserId) -> Result<Vec<ExamResult>, StorageError> {
        Ok(self.remote()?.results.get(&id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl AuthRepository for InMemoryRepository {
    async fn login(&self, credentials: &Credentials) -> Result<SessionUser, StorageError> {
        let guard = self.remote()?;
        let email = match credentials.identifier() {
            LoginIdentifier::Email(email) => email.clone(),
            LoginIdentifier::Phone(phone) => guard.phones.get(phone).cloned().unwrap_or_default(),
        };
        let unauthorized = || StorageError::Status {
            status: 401,
            message: "Invalid credentials".into(),
        };
        if guard.passwords.get(&email).map(String::as_str) != Some(credentials.password()) {
            return Err(unauthorized());
        }
        guard
            .accounts
            .iter()
            .find(|account| account.email() == email)
            .cloned()
            .ok_or_else(unauthorized)
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.values.get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_value(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.values.remove(key);
        Ok(())
    }

    async fn set_values(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        for (key, value) in pairs {
            guard.values.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    async fn remove_values(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        for key in keys {
            guard.values.remove(*key);
        }
        Ok(())
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Every repository the services need, behind trait objects.
#[derive(Clone)]
pub struct Storage {
    pub match_sets: Arc<dyn MatchSetRepository>,
    pub schools: Arc<dyn SchoolRepository>,
    pub sales: Arc<dyn SalesRepository>,
    pub users: Arc<dyn UserRepository>,
    pub blogs: Arc<dyn BlogRepository>,
    pub results: Arc<dyn ExamResultRepository>,
    pub exams: Arc<dyn UpcomingExamRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub auth: Arc<dyn AuthRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub session_record: Arc<dyn SessionRecordRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_in_memory(&InMemoryRepository::new())
    }

    /// Wraps an existing in-memory repository so tests can seed it.
    #[must_use]
    pub fn from_in_memory(repo: &InMemoryRepository) -> Self {
        Self {
            match_sets: Arc::new(repo.clone()),
            schools: Arc::new(repo.clone()),
            sales: Arc::new(repo.clone()),
            users: Arc::new(repo.clone()),
            blogs: Arc::new(repo.clone()),
            results: Arc::new(repo.clone()),
            exams: Arc::new(repo.clone()),
            tasks: Arc::new(repo.clone()),
            auth: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            session_record: Arc::new(repo.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use olympiad_core::model::{
        MatchSetDraft, QuestionDraft, SalesPersonDraft, SchoolDraft, TaskDraft, TaskStatus,
    };

    fn exam() -> ExamSession {
        let options = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        let questions = (1..=3)
            .map(|id| {
                Question::new(QuestionId::new(id), format!("Q{id}"), options.clone())
                    .with_correct_answer(Some(1))
            })
            .collect();
        ExamSession::new(MatchSetId::new(9), "Mock 1", "Maths", None, Some(30), questions)
            .unwrap()
    }

    #[tokio::test]
    async fn progress_requires_all_three_keys() {
        let repo = InMemoryRepository::new();
        let id = MatchSetId::new(4);
        let progress = SavedProgress {
            answers: vec![Some(2), None],
            marked: vec![false, true],
            current: 1,
        };
        repo.save_progress(id, &progress).await.unwrap();
        assert_eq!(repo.load_progress(id).await.unwrap(), Some(progress));
        assert_eq!(
            repo.get_value("mocktest_4_current").await.unwrap().as_deref(),
            Some("1")
        );

        repo.remove_value("mocktest_4_marked").await.unwrap();
        assert_eq!(repo.load_progress(id).await.unwrap(), None);

        repo.clear_progress(id).await.unwrap();
        assert_eq!(repo.get_value("mocktest_4_answers").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_progress_is_a_serialization_error() {
        let repo = InMemoryRepository::new();
        for key in progress_keys(MatchSetId::new(1)) {
            repo.set_value(&key, "{not json").await.unwrap();
        }
        let err = repo.load_progress(MatchSetId::new(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn grades_by_option_text() {
        let repo = InMemoryRepository::new();
        repo.insert_match_set(exam()).unwrap();
        let answers = vec![
            SubmittedAnswer {
                question_id: QuestionId::new(1),
                selected_answer: "2".into(),
            },
            SubmittedAnswer {
                question_id: QuestionId::new(2),
                selected_answer: "3".into(),
            },
        ];
        let result = repo
            .submit_answers(MatchSetId::new(9), UserId::new(5), &answers)
            .await
            .unwrap();
        assert_eq!(result.total_questions, 3);
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.incorrect_answers, 1);
        assert_eq!(result.unanswered(), 1);
        assert_eq!(repo.submissions().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn offline_fails_remote_calls_but_not_local() {
        let repo = InMemoryRepository::new();
        repo.set_offline(true);
        assert!(matches!(
            repo.list_schools(false).await,
            Err(StorageError::Connection(_))
        ));
        repo.set_value("k", "v").await.unwrap();
    }

    #[tokio::test]
    async fn school_toggle_and_active_filter() {
        let repo = InMemoryRepository::new();
        let valid = SchoolDraft {
            name: "Sunrise".into(),
            address: "1 Road".into(),
            email: "a@sunrise.org".into(),
            admin_name: "Admin".into(),
            phone: "9999999999".into(),
            ..SchoolDraft::default()
        }
        .validate()
        .unwrap();
        let school = repo.create_school(&valid).await.unwrap();
        assert!(repo.list_schools(true).await.unwrap().is_empty());
        let toggled = repo.toggle_school_status(&school.id).await.unwrap();
        assert_eq!(toggled.status, ActiveStatus::Active);
        assert_eq!(repo.list_schools(true).await.unwrap().len(), 1);
        assert_eq!(repo.create_school(&valid).await, Err(StorageError::Conflict));
    }

    #[tokio::test]
    async fn login_by_phone_and_bad_password() {
        let repo = InMemoryRepository::new();
        let user = SessionUser::new(UserId::new(3), "Asha", "asha@mail.com", Role::Student);
        repo.insert_account(user.clone(), Some("9876543210"), "secret")
            .unwrap();
        let creds = Credentials::parse("9876543210", "secret").unwrap();
        assert_eq!(repo.login(&creds).await.unwrap(), user);
        let wrong = Credentials::parse("asha@mail.com", "nope").unwrap();
        assert!(matches!(
            repo.login(&wrong).await,
            Err(StorageError::Status { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn batch_writes_replace_and_clear_together() {
        let repo = InMemoryRepository::new();
        repo.set_values(&[("a", "1"), ("b", "2")]).await.unwrap();
        repo.set_values(&[("a", "3")]).await.unwrap();
        assert_eq!(repo.get_value("a").await.unwrap().as_deref(), Some("3"));
        assert_eq!(repo.get_value("b").await.unwrap().as_deref(), Some("2"));
        repo.remove_values(&["a", "b", "missing"]).await.unwrap();
        assert_eq!(repo.get_value("a").await.unwrap(), None);
        assert_eq!(repo.get_value("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn authored_match_set_becomes_playable() {
        let repo = InMemoryRepository::new();
        let valid = MatchSetDraft {
            title: "Mock 2".into(),
            subject: "Science".into(),
            date: "2026-02-01".into(),
            ..MatchSetDraft::default()
        }
        .validate()
        .unwrap();
        let summary = repo.create_match_set(&valid).await.unwrap();
        assert_eq!(summary.question_count, 0);
        assert!(matches!(
            repo.get_match_set(summary.id).await,
            Err(StorageError::Serialization(_))
        ));

        let question = QuestionDraft {
            text: "2 + 2?".into(),
            options: ["2".into(), "3".into(), "4".into(), "5".into()],
            correct_answer: "4".into(),
        }
        .validate()
        .unwrap();
        repo.add_questions(summary.id, &[question.clone(), question])
            .await
            .unwrap();
        let listed = repo.list_match_sets().await.unwrap();
        assert_eq!(listed[0].question_count, 2);
        let exam = repo.get_match_set(summary.id).await.unwrap();
        assert_eq!(exam.duration_seconds(), 3_600);
        assert_eq!(exam.questions()[0].correct_answer(), Some(2));

        repo.delete_match_set(summary.id).await.unwrap();
        assert!(repo.list_match_sets().await.unwrap().is_empty());
        assert_eq!(
            repo.add_questions(summary.id, &[]).await,
            Err(StorageError::NotFound)
        );
    }

    #[tokio::test]
    async fn tasks_need_a_known_assignee() {
        let repo = InMemoryRepository::new();
        let person = SalesPersonDraft {
            name: "Ravi".into(),
            email: "ravi@sales.in".into(),
            password: "secret12".into(),
        }
        .validate()
        .unwrap();
        let person = repo.register_sales_person(&person).await.unwrap();
        let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let draft = TaskDraft {
            title: "Visit".into(),
            assignee: Some(person.id),
            due_date: "2026-10-09".into(),
            ..TaskDraft::default()
        };
        let task = repo
            .assign_task(&draft.clone().validate("Admin", today).unwrap())
            .await
            .unwrap();
        assert_eq!(task.assigned_to.name, "Ravi");
        assert_eq!(task.status, TaskStatus::Pending);

        let stranger = TaskDraft {
            assignee: Some(SalesPersonId::new(999)),
            ..draft
        };
        assert_eq!(
            repo.assign_task(&stranger.validate("Admin", today).unwrap())
                .await,
            Err(StorageError::NotFound)
        );
    }

    #[test]
    fn status_message_prefers_body() {
        let err = StorageError::Status {
            status: 409,
            message: "Email already registered".into(),
        };
        assert_eq!(err.user_message(), "Email already registered");
        let err = StorageError::Status {
            status: 500,
            message: " ".into(),
        };
        assert_eq!(err.user_message(), "Request failed with status 500");
    }
}
