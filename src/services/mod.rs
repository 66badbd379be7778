pub mod api;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::attempt::{AttemptResult, QuizSubmission};
use crate::models::quiz::QuizDefinition;

/// Serves the quiz definition for an attempt.
#[async_trait]
pub trait QuizContentService: Send + Sync {
    async fn fetch_quiz(&self, quiz_id: i32) -> Result<QuizDefinition>;
}

/// Accepts a completed set of selections and returns the graded outcome.
#[async_trait]
pub trait AttemptSubmissionService: Send + Sync {
    async fn submit_attempt(
        &self,
        quiz_id: i32,
        submission: QuizSubmission,
    ) -> Result<AttemptResult>;
}

/// Looks up the most recent attempt for a quiz, if any. Used by the screens
/// around an attempt (start vs. restart), never by the controller itself.
#[async_trait]
pub trait AttemptHistoryService: Send + Sync {
    async fn last_attempt(&self, quiz_id: i32) -> Result<Option<AttemptResult>>;
}
