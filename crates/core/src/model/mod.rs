mod answer_sheet;
mod blog;
mod exam;
mod ids;
mod question_bank;
mod result;
mod role;
mod sales;
mod school;
mod session_user;
mod status;
mod task;
mod timer;
mod upcoming_exam;
mod user;
mod validation;

pub use answer_sheet::{AnswerSheet, QuestionStatus, SheetError};
pub use blog::{
    Blog, BlogDraft, BlogFilter, BlogImage, FeaturedFilter, ReaderFilter, ValidBlog, find_by_slug,
    related,
};
pub use exam::{
    DEFAULT_DURATION_MINUTES, ExamError, ExamSession, MatchSetSummary, Question,
    SubmissionResult, SubmittedAnswer, default_instructions,
};
pub use ids::{
    BlogId, MatchSetId, ParseIdError, QuestionId, SalesPersonId, SchoolId, TaskId,
    UpcomingExamId, UserId,
};
pub use question_bank::{
    MatchSetDraft, NewQuestion, QUESTION_OPTION_COUNT, QuestionDraft, ValidMatchSet,
};
pub use result::{ExamResult, Grade, ResultStats};
pub use role::{Capability, Role, RoleError};
pub use sales::{SalesPerson, SalesPersonDraft, ValidSalesPerson};
pub use school::{School, SchoolDraft, ValidSchool};
pub use session_user::{Credentials, LoginIdentifier, Persistence, SessionUser};
pub use status::ActiveStatus;
pub use task::{
    Task, TaskAssignee, TaskComment, TaskDraft, TaskFilter, TaskPriority, TaskStatus, TaskUpdate,
    ValidTask,
};
pub use timer::Countdown;
pub use upcoming_exam::{
    RecommendationFilter, UpcomingExam, UpcomingExamDraft, UpcomingExamFilter, ValidUpcomingExam,
};
pub use user::{
    MIN_SIGNUP_PASSWORD_LEN, NewUserDraft, RegisteredExam, RegistrationDraft, SchoolChoice, UserAccount,
    UserFilter, UserUpdate, ValidNewUser,
};
pub use validation::{DraftErrors, FieldError, is_valid_email, is_valid_phone};
