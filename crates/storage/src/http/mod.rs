//! REST API client implementing the remote repositories.

use std::time::Duration;

use async_trait::async_trait;
use olympiad_core::model::{
    ActiveStatus, Blog, BlogId, BlogImage, Credentials, ExamResult, ExamSession, LoginIdentifier,
    MatchSetId, MatchSetSummary, NewQuestion, SalesPerson, SalesPersonId, School, SchoolId,
    SessionUser, SubmissionResult, SubmittedAnswer, Task, UpcomingExam, UpcomingExamId,
    UserAccount, UserId, UserUpdate, ValidBlog, ValidMatchSet, ValidNewUser, ValidSalesPerson,
    ValidSchool, ValidTask, ValidUpcomingExam,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::repository::{
    AuthRepository, BlogRepository, ExamResultRepository, MatchSetRepository, SalesRepository,
    SchoolRepository, StorageError, TaskRepository, UpcomingExamRepository, UserRepository,
};

mod dto;

use dto::{
    BlogDto, BlogPayload, ExamResultDto, LoginPayload, LoginResponseDto, MatchSetDetailsDto,
    MatchSetPayload, MatchSetSummaryDto, NewUserPayload, QuestionPayload, ResultDto,
    SalesPersonDto, SalesPersonPayload, SchoolDto, SchoolPayload, SubmitDto, TaskDto, TaskPayload,
    UpcomingExamDto, UpcomingExamPayload, UserDto, UserUpdatePayload,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ApiConfigError {
    #[error("API base URL is required")]
    Missing,
    #[error("invalid API base URL: {0}")]
    InvalidUrl(String),
    #[error("API base URL must use http or https, got {0}")]
    UnsupportedScheme(String),
}

/// The one configured API endpoint every remote call goes through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
    timeout: Duration,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `ApiConfigError` for blank, unparseable or non-HTTP URLs.
    pub fn new(base_url: &str) -> Result<Self, ApiConfigError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ApiConfigError::Missing);
        }
        let url = Url::parse(trimmed).map_err(|err| ApiConfigError::InvalidUrl(err.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ApiConfigError::UnsupportedScheme(other.to_string())),
        }
        Ok(Self {
            base_url: url,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `path` is relative to the base, e.g. `api/schools`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Clone)]
pub struct HttpRepository {
    client: Client,
    config: ApiConfig,
}

impl HttpRepository {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "falling back to default HTTP client");
                Client::new()
            });
        Self { client, config }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StorageError> {
        let response = request
            .send()
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), %message, "request failed");
        Err(match status.as_u16() {
            404 if message.trim().is_empty() => StorageError::NotFound,
            409 if message.trim().is_empty() => StorageError::Conflict,
            code => StorageError::Status {
                status: code,
                message,
            },
        })
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StorageError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let url = self.config.endpoint(path);
        debug!(%url, "GET");
        self.client.get(url)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let url = self.config.endpoint(path);
        debug!(%url, "POST");
        self.client.post(url)
    }

    fn put(&self, path: &str) -> RequestBuilder {
        let url = self.config.endpoint(path);
        debug!(%url, "PUT");
        self.client.put(url)
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        let url = self.config.endpoint(path);
        debug!(%url, "DELETE");
        self.client.delete(url)
    }
}

/// Multipart body with a `blog` JSON part and an optional `image` file part.
fn blog_form(blog: &ValidBlog, image: Option<&BlogImage>) -> Result<Form, StorageError> {
    let json = serde_json::to_string(&BlogPayload::from(blog))
        .map_err(|err| StorageError::Serialization(err.to_string()))?;
    let blog_part = Part::text(json)
        .mime_str("application/json")
        .map_err(|err| StorageError::Serialization(err.to_string()))?;
    let mut form = Form::new().part("blog", blog_part);
    if let Some(image) = image {
        let image_part = Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.content_type())
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        form = form.part("image", image_part);
    }
    Ok(form)
}

#[async_trait]
impl MatchSetRepository for HttpRepository {
    async fn list_match_sets(&self) -> Result<Vec<MatchSetSummary>, StorageError> {
        let rows: Vec<MatchSetSummaryDto> = self.json(self.get("api/matchsets")).await?;
        rows.into_iter().map(MatchSetSummaryDto::into_domain).collect()
    }

    async fn get_match_set(&self, id: MatchSetId) -> Result<ExamSession, StorageError> {
        let dto: MatchSetDetailsDto = self
            .json(self.get(&format!("api/matchsets/{id}/details")))
            .await?;
        dto.into_domain(id)
    }

    async fn submit_answers(
        &self,
        id: MatchSetId,
        student: UserId,
        answers: &[SubmittedAnswer],
    ) -> Result<SubmissionResult, StorageError> {
        let body = SubmitDto::new(id, student, answers);
        let result: ResultDto = self
            .json(self.post("api/matchsets/submit").json(&body))
            .await?;
        Ok(result.into())
    }

    async fn create_match_set(
        &self,
        match_set: &ValidMatchSet,
    ) -> Result<MatchSetSummary, StorageError> {
        let dto: MatchSetSummaryDto = self
            .json(
                self.post("api/matchsets")
                    .json(&MatchSetPayload::from(match_set)),
            )
            .await?;
        dto.into_domain()
    }

    async fn delete_match_set(&self, id: MatchSetId) -> Result<(), StorageError> {
        self.send(self.delete(&format!("api/matchsets/{id}"))).await?;
        Ok(())
    }

    async fn add_questions(
        &self,
        id: MatchSetId,
        questions: &[NewQuestion],
    ) -> Result<(), StorageError> {
        let body: Vec<QuestionPayload<'_>> = questions.iter().map(QuestionPayload::from).collect();
        self.send(
            self.post(&format!("api/matchsets/{id}/questions/bulk"))
                .json(&body),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl UpcomingExamRepository for HttpRepository {
    async fn list_exams(&self) -> Result<Vec<UpcomingExam>, StorageError> {
        let rows: Vec<UpcomingExamDto> = self.json(self.get("api/exams")).await?;
        Ok(rows.into_iter().map(UpcomingExam::from).collect())
    }

    async fn create_exam(&self, exam: &ValidUpcomingExam) -> Result<UpcomingExam, StorageError> {
        let dto: UpcomingExamDto = self
            .json(self.post("api/exams").json(&UpcomingExamPayload::from(exam)))
            .await?;
        Ok(dto.into())
    }

    async fn update_exam(
        &self,
        id: &UpcomingExamId,
        exam: &ValidUpcomingExam,
    ) -> Result<UpcomingExam, StorageError> {
        let dto: UpcomingExamDto = self
            .json(
                self.put(&format!("api/exams/{id}"))
                    .json(&UpcomingExamPayload::from(exam)),
            )
            .await?;
        Ok(dto.into())
    }

    async fn delete_exam(&self, id: &UpcomingExamId) -> Result<(), StorageError> {
        self.send(self.delete(&format!("api/exams/{id}"))).await?;
        Ok(())
    }

    async fn toggle_recommended(&self, id: &UpcomingExamId) -> Result<(), StorageError> {
        let request = self
            .post("api/recommend")
            .query(&[("examId", id.as_str())]);
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for HttpRepository {
    async fn list_tasks(&self) -> Result<Vec<Task>, StorageError> {
        let rows: Vec<TaskDto> = self.json(self.get("api/tasks")).await?;
        rows.into_iter().map(TaskDto::into_domain).collect()
    }

    async fn assign_task(&self, task: &ValidTask) -> Result<Task, StorageError> {
        let dto: TaskDto = self
            .json(
                self.post(&format!("api/tasks/assign/{}", task.assignee))
                    .json(&TaskPayload::from(task)),
            )
            .await?;
        dto.into_domain()
    }
}

#[async_trait]
impl SchoolRepository for HttpRepository {
    async fn list_schools(&self, active_only: bool) -> Result<Vec<School>, StorageError> {
        let path = if active_only {
            "api/schools/active"
        } else {
            "api/schools"
        };
        let rows: Vec<SchoolDto> = self.json(self.get(path)).await?;
        Ok(rows.into_iter().map(School::from).collect())
    }

    async fn create_school(&self, school: &ValidSchool) -> Result<School, StorageError> {
        let dto: SchoolDto = self
            .json(
                self.post("api/schools/register")
                    .json(&SchoolPayload::from(school)),
            )
            .await?;
        Ok(dto.into())
    }

    async fn update_school(
        &self,
        id: &SchoolId,
        school: &ValidSchool,
    ) -> Result<School, StorageError> {
        let dto: SchoolDto = self
            .json(
                self.put(&format!("api/schools/{id}"))
                    .json(&SchoolPayload::from(school)),
            )
            .await?;
        Ok(dto.into())
    }

    async fn toggle_school_status(&self, id: &SchoolId) -> Result<School, StorageError> {
        let dto: SchoolDto = self
            .json(self.put(&format!("api/schools/toggle-status/{id}")))
            .await?;
        Ok(dto.into())
    }

    async fn delete_school(&self, id: &SchoolId) -> Result<(), StorageError> {
        self.send(self.delete(&format!("api/schools/{id}"))).await?;
        Ok(())
    }
}

#[async_trait]
impl SalesRepository for HttpRepository {
    async fn list_sales_people(&self) -> Result<Vec<SalesPerson>, StorageError> {
        let rows: Vec<SalesPersonDto> = self.json(self.get("api/salesman/all")).await?;
        rows.into_iter().map(SalesPersonDto::into_domain).collect()
    }

    async fn register_sales_person(
        &self,
        person: &ValidSalesPerson,
    ) -> Result<SalesPerson, StorageError> {
        let body = SalesPersonPayload {
            name: person.name(),
            email: person.email(),
            password: person.password(),
        };
        let dto: SalesPersonDto = self
            .json(self.post("api/salesman/register").json(&body))
            .await?;
        dto.into_domain()
    }

    async fn set_sales_status(
        &self,
        id: SalesPersonId,
        status: ActiveStatus,
    ) -> Result<(), StorageError> {
        let request = self
            .put(&format!("api/salesman/{id}/status"))
            .query(&[("status", status.as_str())]);
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for HttpRepository {
    async fn list_users(&self) -> Result<Vec<UserAccount>, StorageError> {
        let rows: Vec<UserDto> = self.json(self.get("api/getallUsers")).await?;
        rows.into_iter().map(UserDto::into_domain).collect()
    }

    async fn create_user(&self, user: &ValidNewUser) -> Result<UserAccount, StorageError> {
        let dto: UserDto = self
            .json(self.post("api/signup").json(&NewUserPayload::from(user)))
            .await?;
        dto.into_domain()
    }

    async fn update_user(
        &self,
        id: UserId,
        user: &UserUpdate,
    ) -> Result<UserAccount, StorageError> {
        let dto: UserDto = self
            .json(
                self.put(&format!("api/users/{id}"))
                    .json(&UserUpdatePayload::from(user)),
            )
            .await?;
        dto.into_domain()
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StorageError> {
        self.send(self.delete(&format!("api/users/{id}"))).await?;
        Ok(())
    }
}

#[async_trait]
impl BlogRepository for HttpRepository {
    async fn list_blogs(&self) -> Result<Vec<Blog>, StorageError> {
        let rows: Vec<BlogDto> = self.json(self.get("api/blogs")).await?;
        Ok(rows.into_iter().map(Blog::from).collect())
    }

    async fn create_blog(
        &self,
        blog: &ValidBlog,
        image: Option<&BlogImage>,
    ) -> Result<Blog, StorageError> {
        let form = blog_form(blog, image)?;
        let dto: BlogDto = self.json(self.post("api/blogs").multipart(form)).await?;
        Ok(dto.into())
    }

    async fn update_blog(
        &self,
        id: &BlogId,
        blog: &ValidBlog,
        image: Option<&BlogImage>,
    ) -> Result<Blog, StorageError> {
        let form = blog_form(blog, image)?;
        let dto: BlogDto = self
            .json(self.put(&format!("api/blogs/{id}")).multipart(form))
            .await?;
        Ok(dto.into())
    }

    async fn delete_blog(&self, id: &BlogId) -> Result<(), StorageError> {
        self.send(self.delete(&format!("api/blogs/{id}"))).await?;
        Ok(())
    }
}

#[async_trait]
impl ExamResultRepository for HttpRepository {
    async fn results_for_user(&self, id: UserId) -> Result<Vec<ExamResult>, StorageError> {
        let rows: Vec<ExamResultDto> = self
            .json(self.get(&format!("api/users/{id}/exam-results")))
            .await?;
        Ok(rows.into_iter().map(ExamResult::from).collect())
    }
}

#[async_trait]
impl AuthRepository for HttpRepository {
    async fn login(&self, credentials: &Credentials) -> Result<SessionUser, StorageError> {
        let body = match credentials.identifier() {
            LoginIdentifier::Email(email) => LoginPayload {
                email: Some(email),
                phone: None,
                password: credentials.password(),
            },
            LoginIdentifier::Phone(phone) => LoginPayload {
                email: None,
                phone: Some(phone),
                password: credentials.password(),
            },
        };
        let dto: LoginResponseDto = self.json(self.post("api/login").json(&body)).await?;
        dto.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_requires_http_url() {
        assert_eq!(ApiConfig::new("  "), Err(ApiConfigError::Missing));
        assert!(matches!(
            ApiConfig::new("not a url"),
            Err(ApiConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiConfig::new("ftp://example.org"),
            Err(ApiConfigError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ApiConfig::new("https://api.example.org/").unwrap();
        assert_eq!(
            config.endpoint("/api/schools"),
            "https://api.example.org/api/schools"
        );
        let nested = ApiConfig::new("http://localhost:8081/backend").unwrap();
        assert_eq!(
            nested.endpoint("api/blogs"),
            "http://localhost:8081/backend/api/blogs"
        );
    }

    #[test]
    fn blog_form_accepts_image_part() {
        let blog = olympiad_core::model::BlogDraft {
            title: "T".into(),
            content: "C".into(),
            author: "A".into(),
            category: "News".into(),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let image = BlogImage::new("cover.png", vec![0x89, b'P', b'N', b'G']).unwrap();
        assert!(blog_form(&blog, Some(&image)).is_ok());
        assert!(blog_form(&blog, None).is_ok());
    }
}
