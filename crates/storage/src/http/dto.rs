//! Wire shapes of the REST API and their mapping onto domain types.

use chrono::NaiveDate;
use olympiad_core::model::{
    ActiveStatus, Blog, BlogId, ExamResult, ExamSession, MatchSetId, MatchSetSummary, NewQuestion,
    Question, QuestionId, RegisteredExam, Role, SalesPerson, SalesPersonId, School, SchoolId,
    SessionUser, SubmissionResult, SubmittedAnswer, Task, TaskAssignee, TaskComment, TaskId,
    TaskPriority, TaskStatus, UpcomingExam, UpcomingExamId, UserAccount, UserId, UserUpdate,
    ValidBlog, ValidMatchSet, ValidNewUser, ValidSchool, ValidTask, ValidUpcomingExam,
};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Ids arrive as numbers from some endpoints and strings from others.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Number(u64),
    Text(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }

    fn into_u64(self, field: &'static str) -> Result<u64, StorageError> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| StorageError::Serialization(format!("{field} is not numeric: {s}"))),
        }
    }
}

/// Dates are ISO `YYYY-MM-DD`; anything else is treated as absent.
fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|value| {
        let day = value.get(..10).unwrap_or(value);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|val| !val.trim().is_empty())
}

//
// ─── MATCH SETS ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MatchSetSummaryDto {
    id: WireId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    subject: String,
    date: Option<String>,
    duration_minutes: Option<u32>,
    question_count: Option<u32>,
}

impl MatchSetSummaryDto {
    pub(crate) fn into_domain(self) -> Result<MatchSetSummary, StorageError> {
        Ok(MatchSetSummary {
            id: MatchSetId::new(self.id.into_u64("matchSetId")?),
            title: self.title,
            subject: self.subject,
            date: parse_date(self.date.as_deref()),
            duration_minutes: self
                .duration_minutes
                .unwrap_or(olympiad_core::model::DEFAULT_DURATION_MINUTES),
            question_count: self.question_count.unwrap_or(0),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionDto {
    id: WireId,
    question_text: String,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MatchSetDetailsDto {
    id: Option<WireId>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    subject: String,
    date: Option<String>,
    duration_minutes: Option<u32>,
    #[serde(default)]
    questions: Vec<QuestionDto>,
}

impl MatchSetDetailsDto {
    /// A payload that fails exam validation is reported as a serialization error.
    pub(crate) fn into_domain(self, requested: MatchSetId) -> Result<ExamSession, StorageError> {
        let exam_id = match self.id {
            Some(id) => MatchSetId::new(id.into_u64("matchSetId")?),
            None => requested,
        };
        let mut questions = Vec::with_capacity(self.questions.len());
        for dto in self.questions {
            let key = dto
                .correct_answer
                .as_deref()
                .and_then(|raw| Question::resolve_answer_key(&dto.options, raw));
            questions.push(
                Question::new(
                    QuestionId::new(dto.id.into_u64("questionId")?),
                    dto.question_text,
                    dto.options,
                )
                .with_correct_answer(key),
            );
        }
        ExamSession::new(
            exam_id,
            self.title,
            self.subject,
            parse_date(self.date.as_deref()),
            self.duration_minutes,
            questions,
        )
        .map_err(ser)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnswerDto<'a> {
    question_id: u64,
    selected_answer: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitDto<'a> {
    match_set_id: u64,
    student_id: u64,
    answers: Vec<AnswerDto<'a>>,
}

impl<'a> SubmitDto<'a> {
    pub(crate) fn new(id: MatchSetId, student: UserId, answers: &'a [SubmittedAnswer]) -> Self {
        Self {
            match_set_id: id.value(),
            student_id: student.value(),
            answers: answers
                .iter()
                .map(|answer| AnswerDto {
                    question_id: answer.question_id.value(),
                    selected_answer: &answer.selected_answer,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResultDto {
    total_questions: u32,
    correct_answers: u32,
    incorrect_answers: u32,
    percentage: f64,
    #[serde(default)]
    result_status: String,
}

impl From<ResultDto> for SubmissionResult {
    fn from(dto: ResultDto) -> Self {
        Self {
            total_questions: dto.total_questions,
            correct_answers: dto.correct_answers,
            incorrect_answers: dto.incorrect_answers,
            percentage: dto.percentage,
            result_status: dto.result_status,
        }
    }
}

//
// ─── SCHOOLS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SchoolDto {
    school_registration_id: WireId,
    #[serde(default)]
    school_name: String,
    #[serde(default)]
    school_address: String,
    #[serde(default)]
    school_email: String,
    #[serde(default)]
    your_name: Option<String>,
    #[serde(default)]
    school_phone: Option<String>,
    school_city: Option<String>,
    school_state: Option<String>,
    status: Option<String>,
}

impl From<SchoolDto> for School {
    fn from(dto: SchoolDto) -> Self {
        Self {
            id: SchoolId::new(dto.school_registration_id.into_string()),
            name: dto.school_name,
            address: dto.school_address,
            email: dto.school_email,
            admin_name: dto.your_name.unwrap_or_default(),
            phone: dto.school_phone.unwrap_or_default(),
            city: non_blank(dto.school_city),
            state: non_blank(dto.school_state),
            status: ActiveStatus::from_wire(dto.status.as_deref()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SchoolPayload<'a> {
    school_name: &'a str,
    school_address: &'a str,
    school_email: &'a str,
    your_name: &'a str,
    school_phone: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    school_city: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    school_state: Option<&'a str>,
}

impl<'a> From<&'a ValidSchool> for SchoolPayload<'a> {
    fn from(school: &'a ValidSchool) -> Self {
        Self {
            school_name: school.name(),
            school_address: school.address(),
            school_email: school.email(),
            your_name: school.admin_name(),
            school_phone: school.phone(),
            school_city: school.city(),
            school_state: school.state(),
        }
    }
}

//
// ─── SALES ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct SalesPersonDto {
    id: WireId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    status: Option<String>,
}

impl SalesPersonDto {
    pub(crate) fn into_domain(self) -> Result<SalesPerson, StorageError> {
        Ok(SalesPerson {
            id: SalesPersonId::new(self.id.into_u64("salesmanId")?),
            name: self.name,
            email: self.email,
            status: ActiveStatus::from_wire(self.status.as_deref()),
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SalesPersonPayload<'a> {
    pub(crate) name: &'a str,
    pub(crate) email: &'a str,
    pub(crate) password: &'a str,
}

//
// ─── USERS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct RegisteredExamDto {
    #[serde(default)]
    title: String,
    #[serde(default)]
    subject: String,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserDto {
    id: WireId,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    phone: Option<String>,
    school: Option<String>,
    user_class: Option<String>,
    #[serde(default)]
    registered_exams: Vec<RegisteredExamDto>,
}

impl UserDto {
    pub(crate) fn into_domain(self) -> Result<UserAccount, StorageError> {
        let id = self.id.into_u64("userId")?;
        Ok(UserAccount {
            id: UserId::new(id),
            user_code: self.user_id.unwrap_or_else(|| format!("user{id}")),
            name: self.name,
            email: self.email,
            phone: non_blank(self.phone),
            school: non_blank(self.school),
            user_class: non_blank(self.user_class),
            registered_exams: self
                .registered_exams
                .into_iter()
                .map(|exam| RegisteredExam {
                    title: exam.title,
                    subject: exam.subject,
                    date: parse_date(exam.date.as_deref()),
                })
                .collect(),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewUserPayload<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    school: &'a str,
    user_class: &'a str,
    password: &'a str,
}

impl<'a> From<&'a ValidNewUser> for NewUserPayload<'a> {
    fn from(user: &'a ValidNewUser) -> Self {
        Self {
            name: &user.name,
            email: &user.email,
            phone: user.phone.as_deref().unwrap_or_default(),
            school: user.school.as_deref().unwrap_or_default(),
            user_class: user.user_class.as_deref().unwrap_or_default(),
            password: &user.password,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserUpdatePayload<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    school: &'a str,
    user_class: &'a str,
}

impl<'a> From<&'a UserUpdate> for UserUpdatePayload<'a> {
    fn from(user: &'a UserUpdate) -> Self {
        Self {
            name: &user.name,
            email: &user.email,
            phone: &user.phone,
            school: &user.school,
            user_class: &user.user_class,
        }
    }
}

//
// ─── BLOGS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BlogDto {
    id: WireId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    author: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    tags: Option<Vec<String>>,
    image_url: Option<String>,
    featured: Option<bool>,
    read_time: Option<String>,
    published_date: Option<String>,
}

impl From<BlogDto> for Blog {
    fn from(dto: BlogDto) -> Self {
        Self {
            id: BlogId::new(dto.id.into_string()),
            title: dto.title,
            slug: dto.slug,
            content: dto.content,
            excerpt: dto.excerpt.unwrap_or_default(),
            author: dto.author,
            category: dto.category,
            tags: dto.tags.unwrap_or_default(),
            image_url: non_blank(dto.image_url),
            featured: dto.featured.unwrap_or(false),
            read_time: non_blank(dto.read_time),
            published_date: parse_date(dto.published_date.as_deref()),
        }
    }
}

/// The JSON part of a multipart blog write.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BlogPayload<'a> {
    title: &'a str,
    content: &'a str,
    excerpt: &'a str,
    author: &'a str,
    category: &'a str,
    tags: &'a [String],
    featured: bool,
    read_time: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
}

impl<'a> From<&'a ValidBlog> for BlogPayload<'a> {
    fn from(blog: &'a ValidBlog) -> Self {
        Self {
            title: &blog.title,
            content: &blog.content,
            excerpt: &blog.excerpt,
            author: &blog.author,
            category: &blog.category,
            tags: &blog.tags,
            featured: blog.featured,
            read_time: blog.read_time.as_deref().unwrap_or_default(),
            image_url: blog.image_url.as_deref(),
        }
    }
}

//
// ─── QUESTION BANK ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MatchSetPayload<'a> {
    title: &'a str,
    subject: &'a str,
    date: String,
    duration_minutes: u32,
}

impl<'a> From<&'a ValidMatchSet> for MatchSetPayload<'a> {
    fn from(match_set: &'a ValidMatchSet) -> Self {
        Self {
            title: &match_set.title,
            subject: &match_set.subject,
            date: match_set.date.format("%Y-%m-%d").to_string(),
            duration_minutes: match_set.duration_minutes,
        }
    }
}

/// One element of the bulk question upload array.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionPayload<'a> {
    question_text: &'a str,
    options: &'a [String],
    correct_answer: &'a str,
}

impl<'a> From<&'a NewQuestion> for QuestionPayload<'a> {
    fn from(question: &'a NewQuestion) -> Self {
        Self {
            question_text: &question.text,
            options: &question.options,
            correct_answer: &question.correct_answer,
        }
    }
}

//
// ─── UPCOMING EXAMS ────────────────────────────────────────────────────────────
//

const RECOMMENDED: &str = "recommended";

#[derive(Debug, Deserialize)]
pub(crate) struct UpcomingExamDto {
    id: WireId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    subject: String,
    date: Option<String>,
    time: Option<String>,
    description: Option<String>,
    image: Option<String>,
    status: Option<String>,
    /// Free text, but some rows carry a bare number.
    duration: Option<WireId>,
}

impl From<UpcomingExamDto> for UpcomingExam {
    fn from(dto: UpcomingExamDto) -> Self {
        Self {
            id: UpcomingExamId::new(dto.id.into_string()),
            title: dto.title,
            subject: dto.subject,
            date: parse_date(dto.date.as_deref()),
            time: dto.time.map(|time| time.trim().to_string()).unwrap_or_default(),
            description: non_blank(dto.description),
            image_url: non_blank(dto.image),
            duration: non_blank(dto.duration.map(WireId::into_string)),
            recommended: dto
                .status
                .is_some_and(|status| status.trim().eq_ignore_ascii_case(RECOMMENDED)),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UpcomingExamPayload<'a> {
    title: &'a str,
    subject: &'a str,
    date: String,
    time: String,
    description: Option<&'a str>,
    image: Option<&'a str>,
    duration: Option<&'a str>,
    status: Option<&'static str>,
}

impl<'a> From<&'a ValidUpcomingExam> for UpcomingExamPayload<'a> {
    fn from(exam: &'a ValidUpcomingExam) -> Self {
        Self {
            title: &exam.title,
            subject: &exam.subject,
            date: exam.date.format("%Y-%m-%d").to_string(),
            time: exam.time_text(),
            description: exam.description.as_deref(),
            image: exam.image_url.as_deref(),
            duration: exam.duration.as_deref(),
            status: exam.recommended.then_some(RECOMMENDED),
        }
    }
}

//
// ─── TASKS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct TaskAssigneeDto {
    id: WireId,
    #[serde(default)]
    name: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskCommentDto {
    #[serde(default)]
    author: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    timestamp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskDto {
    id: WireId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    assigned_by: String,
    assigned_to: Option<TaskAssigneeDto>,
    assigned_date: Option<String>,
    due_date: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    #[serde(default)]
    comments: Vec<TaskCommentDto>,
    school_id: Option<WireId>,
    school_name: Option<String>,
}

impl TaskDto {
    /// A task nobody is assigned to cannot be shown on either board.
    pub(crate) fn into_domain(self) -> Result<Task, StorageError> {
        let assignee = self
            .assigned_to
            .ok_or_else(|| StorageError::Serialization("task has no assignee".into()))?;
        Ok(Task {
            id: TaskId::new(self.id.into_string()),
            title: self.title,
            description: self.description,
            assigned_by: self.assigned_by,
            assigned_to: TaskAssignee {
                id: SalesPersonId::new(assignee.id.into_u64("assignedTo.id")?),
                name: assignee.name,
                email: non_blank(assignee.email),
            },
            assigned_date: parse_date(self.assigned_date.as_deref()),
            due_date: parse_date(self.due_date.as_deref()),
            priority: self.priority.as_deref().and_then(TaskPriority::parse),
            status: TaskStatus::from_wire(self.status.as_deref()),
            comments: self
                .comments
                .into_iter()
                .filter(|comment| !comment.text.trim().is_empty())
                .map(|comment| TaskComment {
                    author: comment.author,
                    text: comment.text,
                    posted_at: comment.timestamp,
                })
                .collect(),
            school_id: self.school_id.map(|id| SchoolId::new(id.into_string())),
            school_name: non_blank(self.school_name),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskPayload<'a> {
    title: &'a str,
    description: &'a str,
    assigned_by: &'a str,
    assigned_date: String,
    due_date: String,
    priority: &'static str,
    status: &'static str,
    comments: &'static [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    school_name: Option<&'a str>,
}

impl<'a> From<&'a ValidTask> for TaskPayload<'a> {
    fn from(task: &'a ValidTask) -> Self {
        Self {
            title: &task.title,
            description: &task.description,
            assigned_by: &task.assigned_by,
            assigned_date: task.assigned_date.format("%Y-%m-%d").to_string(),
            due_date: task.due_date.format("%Y-%m-%d").to_string(),
            priority: task.priority.as_str(),
            status: task.status.as_str(),
            comments: &[],
            school_name: task.school_name.as_deref(),
        }
    }
}

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExamResultDto {
    #[serde(default)]
    exam_title: String,
    #[serde(default)]
    subject: String,
    date: Option<String>,
    time: Option<String>,
    percentage: Option<f64>,
    certificate_url: Option<String>,
}

impl From<ExamResultDto> for ExamResult {
    fn from(dto: ExamResultDto) -> Self {
        Self {
            exam_title: dto.exam_title,
            subject: dto.subject,
            date: parse_date(dto.date.as_deref()),
            time: non_blank(dto.time),
            percentage: dto.percentage,
            certificate_url: non_blank(dto.certificate_url),
        }
    }
}

//
// ─── AUTH ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub(crate) struct LoginPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) phone: Option<&'a str>,
    pub(crate) password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginAccountDto {
    id: WireId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponseDto {
    role: String,
    data: LoginAccountDto,
}

impl LoginResponseDto {
    /// Unknown roles are rejected rather than guessed.
    pub(crate) fn into_domain(self) -> Result<SessionUser, StorageError> {
        let role = Role::parse(&self.role).map_err(ser)?;
        Ok(SessionUser::new(
            UserId::new(self.data.id.into_u64("id")?),
            self.data.name,
            self.data.email,
            role,
        ))
    }
}
