use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::{AttemptHistoryService, AttemptSubmissionService, QuizContentService};
use crate::error::{Error, Result};
use crate::models::attempt::{AttemptResult, QuizSubmission};
use crate::models::quiz::QuizDefinition;

/// HTTP implementation of the quiz collaborators, speaking the e-learning
/// backend's JSON API under `/api/modules`.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    fn quiz_url(&self, quiz_id: i32) -> String {
        format!("{}/api/modules/quizzes/{}", self.base_url, quiz_id)
    }
}

#[async_trait]
impl QuizContentService for ApiClient {
    async fn fetch_quiz(&self, quiz_id: i32) -> Result<QuizDefinition> {
        let url = self.quiz_url(quiz_id);
        debug!(%url, "fetching quiz definition");
        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::NotFound(format!(
                "quiz {} does not exist",
                quiz_id
            ))),
            status if status.is_success() => Ok(response.json().await?),
            status => Err(Error::Server(format!(
                "quiz fetch failed with status {}",
                status
            ))),
        }
    }
}

#[async_trait]
impl AttemptSubmissionService for ApiClient {
    async fn submit_attempt(
        &self,
        quiz_id: i32,
        submission: QuizSubmission,
    ) -> Result<AttemptResult> {
        let url = format!("{}/submit", self.quiz_url(quiz_id));
        debug!(%url, answers = submission.attempt_answers.len(), "posting attempt");
        let response = self.client.post(url).json(&submission).send().await?;
        match response.status() {
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::Validation(format!("submission rejected: {}", body)))
            }
            status if status.is_success() => Ok(response.json().await?),
            status => Err(Error::Server(format!(
                "submission failed with status {}",
                status
            ))),
        }
    }
}

#[async_trait]
impl AttemptHistoryService for ApiClient {
    async fn last_attempt(&self, quiz_id: i32) -> Result<Option<AttemptResult>> {
        let url = format!("{}/attempt", self.quiz_url(quiz_id));
        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(Error::Server(format!(
                "attempt lookup failed with status {}",
                status
            ))),
        }
    }
}
