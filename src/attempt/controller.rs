use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};
use tracing::{debug, error, info, warn};

use super::shuffle;
use crate::error::Result;
use crate::models::attempt::{AttemptPhase, AttemptResult, QuizSubmission, StudentAnswer};
use crate::models::quiz::QuizDefinition;
use crate::services::{AttemptSubmissionService, QuizContentService};

/// Owns the lifecycle of one quiz attempt, from load through submission.
///
/// The countdown is a task tied to this controller: it starts when the
/// attempt becomes active and is aborted on teardown or drop. A submit that
/// is already on the wire is never aborted; its outcome just goes unobserved
/// once the controller is gone.
pub struct AttemptController {
    inner: Arc<Inner>,
    timer: std::sync::Mutex<Option<JoinHandle<()>>>,
}

struct Inner {
    quiz_id: i32,
    content: Arc<dyn QuizContentService>,
    submission: Arc<dyn AttemptSubmissionService>,
    state: Mutex<AttemptState>,
}

struct AttemptState {
    phase: AttemptPhase,
    quiz: Option<QuizDefinition>,
    selections: HashMap<i32, i32>,
    started: Option<Instant>,
    started_at: Option<DateTime<Utc>>,
    remaining_seconds: Option<u64>,
    // set under the lock before the network await, so a concurrent second
    // submit (timer expiry racing a click) never dispatches
    submit_dispatched: bool,
    pending_submission: Option<QuizSubmission>,
    result: Option<AttemptResult>,
    error: Option<String>,
}

impl AttemptState {
    fn new() -> Self {
        Self {
            phase: AttemptPhase::Loading,
            quiz: None,
            selections: HashMap::new(),
            started: None,
            started_at: None,
            remaining_seconds: None,
            submit_dispatched: false,
            pending_submission: None,
            result: None,
            error: None,
        }
    }

    /// Selections re-expressed in question display order, with the elapsed
    /// wall-clock seconds. Unanswered questions are simply absent.
    fn build_submission(&self) -> QuizSubmission {
        let attempt_answers = self
            .quiz
            .as_ref()
            .map(|quiz| {
                quiz.questions
                    .iter()
                    .filter_map(|question| {
                        self.selections.get(&question.id).map(|answer_id| StudentAnswer {
                            question_id: question.id,
                            answer_id: *answer_id,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        QuizSubmission {
            attempt_answers,
            duration: self.elapsed_seconds(),
        }
    }

    fn elapsed_seconds(&self) -> u64 {
        self.started.map(|s| s.elapsed().as_secs()).unwrap_or(0)
    }
}

impl AttemptController {
    pub fn new(
        quiz_id: i32,
        content: Arc<dyn QuizContentService>,
        submission: Arc<dyn AttemptSubmissionService>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                quiz_id,
                content,
                submission,
                state: Mutex::new(AttemptState::new()),
            }),
            timer: std::sync::Mutex::new(None),
        }
    }

    /// Fetches the quiz, shuffles each question's answers and moves the
    /// attempt to `Active`. A fetch failure leaves the controller in `Error`;
    /// recovery is a fresh controller, not a retry on this one.
    pub async fn load(&self) -> Result<()> {
        self.load_with_rng(&mut StdRng::from_entropy()).await
    }

    pub async fn load_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<()> {
        {
            let state = self.inner.state.lock().await;
            if state.phase != AttemptPhase::Loading {
                return Ok(());
            }
        }

        let mut quiz = match self.inner.content.fetch_quiz(self.inner.quiz_id).await {
            Ok(quiz) => quiz,
            Err(err) => {
                let mut state = self.inner.state.lock().await;
                state.phase = AttemptPhase::Error;
                state.error = Some(err.to_string());
                error!(quiz_id = self.inner.quiz_id, error = %err, "failed to load quiz");
                return Err(err);
            }
        };
        shuffle::shuffle_answers(&mut quiz, rng);

        let timed = {
            let mut state = self.inner.state.lock().await;
            let limit = quiz.duration_in_minutes.map(|m| u64::from(m) * 60);
            info!(
                quiz_id = quiz.id,
                title = %quiz.title,
                questions = quiz.questions.len(),
                timed = limit.is_some(),
                "quiz attempt started"
            );
            state.remaining_seconds = limit;
            state.started = Some(Instant::now());
            state.started_at = Some(crate::utils::time::now());
            state.quiz = Some(quiz);
            state.phase = AttemptPhase::Active;
            limit.is_some()
        };

        if timed {
            self.set_timer(Some(spawn_countdown(Arc::clone(&self.inner))));
        }
        Ok(())
    }

    /// Records an answer for a question. Ignored outside the active phase and
    /// for ids that are not part of the loaded quiz. A later selection for
    /// the same question overwrites the earlier one.
    pub async fn select_answer(&self, question_id: i32, answer_id: i32) {
        let mut state = self.inner.state.lock().await;
        if state.phase != AttemptPhase::Active {
            debug!(question_id, "selection ignored outside the active phase");
            return;
        }
        let Some(quiz) = state.quiz.as_ref() else {
            return;
        };
        let known = quiz
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .map_or(false, |q| q.answers.iter().any(|a| a.id == answer_id));
        if !known {
            debug!(question_id, answer_id, "selection ignored, not part of the loaded quiz");
            return;
        }
        state.selections.insert(question_id, answer_id);
    }

    /// Sends the current selections. Returns `Ok(None)` when the submit was a
    /// no-op: already submitted, already on the wire, or not yet loaded.
    /// At most one submission is ever dispatched per successful outcome, no
    /// matter how submit and the expiry timer interleave.
    pub async fn submit(&self) -> Result<Option<AttemptResult>> {
        let outcome = Inner::submit(&self.inner).await;
        if matches!(outcome, Ok(Some(_))) {
            self.set_timer(None);
        }
        outcome
    }

    /// After a submission failure, re-sends the exact payload that failed.
    /// The quiz is not reloaded and nothing is reshuffled.
    pub async fn retry_submit(&self) -> Result<Option<AttemptResult>> {
        self.submit().await
    }

    /// Cancels the countdown. Called on drop; an in-flight submit keeps
    /// running in the background.
    pub fn teardown(&self) {
        self.set_timer(None);
    }

    pub async fn phase(&self) -> AttemptPhase {
        self.inner.state.lock().await.phase
    }

    /// The loaded quiz with answers in display (shuffled) order.
    pub async fn quiz(&self) -> Option<QuizDefinition> {
        self.inner.state.lock().await.quiz.clone()
    }

    pub async fn selected_answer(&self, question_id: i32) -> Option<i32> {
        self.inner
            .state
            .lock()
            .await
            .selections
            .get(&question_id)
            .copied()
    }

    pub async fn remaining_seconds(&self) -> Option<u64> {
        self.inner.state.lock().await.remaining_seconds
    }

    pub async fn elapsed_seconds(&self) -> u64 {
        self.inner.state.lock().await.elapsed_seconds()
    }

    pub async fn started_at(&self) -> Option<DateTime<Utc>> {
        self.inner.state.lock().await.started_at
    }

    pub async fn result(&self) -> Option<AttemptResult> {
        self.inner.state.lock().await.result.clone()
    }

    pub async fn error_message(&self) -> Option<String> {
        self.inner.state.lock().await.error.clone()
    }

    fn set_timer(&self, handle: Option<JoinHandle<()>>) {
        let mut slot = match self.timer.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(old) = slot.take() {
            old.abort();
        }
        *slot = handle;
    }
}

impl Drop for AttemptController {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl Inner {
    async fn submit(inner: &Arc<Inner>) -> Result<Option<AttemptResult>> {
        let payload = {
            let mut state = inner.state.lock().await;
            if state.submit_dispatched {
                return Ok(None);
            }
            let payload = match state.phase {
                AttemptPhase::Active | AttemptPhase::Expired => state.build_submission(),
                // a failed submission keeps its payload for retry
                AttemptPhase::Error => match state.pending_submission.clone() {
                    Some(payload) => payload,
                    None => return Ok(None),
                },
                _ => return Ok(None),
            };
            state.submit_dispatched = true;
            state.pending_submission = Some(payload.clone());
            payload
        };

        info!(
            quiz_id = inner.quiz_id,
            answers = payload.attempt_answers.len(),
            duration = payload.duration,
            "submitting attempt"
        );
        match inner
            .submission
            .submit_attempt(inner.quiz_id, payload)
            .await
        {
            Ok(result) => {
                let mut state = inner.state.lock().await;
                state.phase = AttemptPhase::Submitted;
                state.pending_submission = None;
                state.error = None;
                state.result = Some(result.clone());
                info!(score = result.score, passed = result.passed, "attempt submitted");
                Ok(Some(result))
            }
            Err(err) => {
                let mut state = inner.state.lock().await;
                if state.phase != AttemptPhase::Submitted {
                    state.phase = AttemptPhase::Error;
                    state.submit_dispatched = false;
                    state.error = Some(err.to_string());
                }
                error!(quiz_id = inner.quiz_id, error = %err, "attempt submission failed");
                Err(err)
            }
        }
    }
}

/// Decrements the countdown once per second. At zero the attempt expires and
/// whatever is selected at that instant is submitted, on a detached task so
/// that aborting the countdown never cancels the submission itself.
fn spawn_countdown(inner: Arc<Inner>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(Duration::from_secs(1));
        // the first tick resolves immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let expired = {
                let mut state = inner.state.lock().await;
                if state.phase != AttemptPhase::Active {
                    return;
                }
                let Some(remaining) = state.remaining_seconds.as_mut() else {
                    return;
                };
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    state.phase = AttemptPhase::Expired;
                    true
                } else {
                    false
                }
            };
            if expired {
                warn!(quiz_id = inner.quiz_id, "time expired, submitting automatically");
                let inner = Arc::clone(&inner);
                tokio::spawn(async move {
                    if let Err(err) = Inner::submit(&inner).await {
                        error!(quiz_id = inner.quiz_id, error = %err, "automatic submission failed");
                    }
                });
                return;
            }
        }
    })
}
