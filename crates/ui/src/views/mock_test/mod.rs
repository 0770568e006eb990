mod list;
mod result;
mod scripts;
mod session;

pub use list::MockTestListView;
pub use result::MockTestResultView;
pub use session::{ExamRunner, LoadedAttempt, MockTestView};
