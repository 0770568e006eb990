mod session;
mod workflow;

pub use crate::error::{LoadError, MockTestError, SubmitError};
pub use session::{
    MockTestSession, Phase, SessionEffect, SubmissionRequest, SubmitSummary, TickOutcome,
};
pub use workflow::{CompletedAttempt, MockTestService};
