#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use elearn_quiz_client::attempt::AttemptController;
use elearn_quiz_client::error::{Error, Result};
use elearn_quiz_client::models::attempt::{AttemptResult, QuizSubmission};
use elearn_quiz_client::models::quiz::{Answer, Question, QuizDefinition};
use elearn_quiz_client::services::{AttemptSubmissionService, QuizContentService};
use rand::rngs::StdRng;
use rand::SeedableRng;

mockall::mock! {
    pub Content {}

    #[async_trait]
    impl QuizContentService for Content {
        async fn fetch_quiz(&self, quiz_id: i32) -> Result<QuizDefinition>;
    }
}

/// Quiz with sequential question ids 1..=n and answer ids `q * 100 + a`.
pub fn sample_quiz(
    question_count: usize,
    answers_per_question: usize,
    duration_in_minutes: Option<u32>,
) -> QuizDefinition {
    let questions = (0..question_count)
        .map(|q| {
            let question_id = (q as i32) + 1;
            Question {
                id: question_id,
                question_text: format!("Question {}", question_id),
                answers: (0..answers_per_question)
                    .map(|a| Answer {
                        id: question_id * 100 + (a as i32) + 1,
                        answer_text: format!("Answer {}", (a as i32) + 1),
                    })
                    .collect(),
            }
        })
        .collect();

    QuizDefinition {
        id: 7,
        title: "Sample quiz".to_string(),
        passing_score: 70,
        duration_in_minutes,
        question_count: question_count as i32,
        questions,
    }
}

pub fn passing_result() -> AttemptResult {
    AttemptResult {
        attempt_id: 1,
        student_id: 3,
        quiz_id: 7,
        attempt_number: 1,
        score: 80.0,
        passed: true,
        duration_seconds: 47,
    }
}

/// Submission double that counts calls and records every payload it receives.
pub struct RecordingSubmissionService {
    calls: AtomicUsize,
    failures_remaining: AtomicUsize,
    payloads: Mutex<Vec<QuizSubmission>>,
    response: AttemptResult,
}

impl RecordingSubmissionService {
    pub fn new(response: AttemptResult) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures_remaining: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
            response,
        }
    }

    /// Fails the first `failures` calls with a server error, then succeeds.
    pub fn failing_first(response: AttemptResult, failures: usize) -> Self {
        let service = Self::new(response);
        service.failures_remaining.store(failures, Ordering::SeqCst);
        service
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<QuizSubmission> {
        self.payloads.lock().expect("payload lock").clone()
    }
}

#[async_trait]
impl AttemptSubmissionService for RecordingSubmissionService {
    async fn submit_attempt(
        &self,
        _quiz_id: i32,
        submission: QuizSubmission,
    ) -> Result<AttemptResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().expect("payload lock").push(submission);
        let should_fail = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(Error::Server("submission endpoint unavailable".to_string()));
        }
        Ok(self.response.clone())
    }
}

/// Controller already loaded with `quiz`, shuffled with a fixed seed.
pub async fn loaded_controller(
    quiz: QuizDefinition,
    submission: Arc<RecordingSubmissionService>,
) -> AttemptController {
    let quiz_id = quiz.id;
    let mut content = MockContent::new();
    content
        .expect_fetch_quiz()
        .returning(move |_| Ok(quiz.clone()));

    let controller = AttemptController::new(quiz_id, Arc::new(content), submission);
    controller
        .load_with_rng(&mut StdRng::seed_from_u64(42))
        .await
        .expect("load");
    controller
}
