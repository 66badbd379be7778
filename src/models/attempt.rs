use serde::{Deserialize, Serialize};

/// Lifecycle of one quiz attempt.
///
/// `Loading -> Active -> Expired -> Submitted` for a timed attempt that runs
/// out, `Loading -> Active -> Submitted` for a manual submit. `Error` is
/// reached from a failed load or a failed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    Loading,
    Active,
    Expired,
    Submitted,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAnswer {
    pub question_id: i32,
    pub answer_id: i32,
}

/// Wire payload for `POST /api/modules/quizzes/{id}/submit`. `duration` is
/// elapsed wall-clock seconds, not the countdown remainder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    pub attempt_answers: Vec<StudentAnswer>,
    pub duration: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    #[serde(default)]
    pub attempt_id: i32,
    #[serde(default)]
    pub student_id: i32,
    #[serde(default)]
    pub quiz_id: i32,
    #[serde(default)]
    pub attempt_number: i32,
    pub score: f64,
    pub passed: bool,
    #[serde(default)]
    pub duration_seconds: u64,
}
