use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDefinition {
    pub id: i32,
    pub title: String,
    /// Percentage 1-100 a student must reach to pass.
    pub passing_score: i32,
    /// Absent means the attempt is untimed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_in_minutes: Option<u32>,
    /// How many questions are presented out of the full pool. Selection
    /// happens server-side; the `questions` vector is what was selected.
    #[serde(default)]
    pub question_count: i32,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i32,
    pub question_text: String,
    pub answers: Vec<Answer>,
}

/// The served definition never carries a correctness flag; grading is a
/// server-side concern and anything extra in the payload is ignored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: i32,
    pub answer_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_deserializes_from_backend_shape() {
        let raw = serde_json::json!({
            "id": 12,
            "title": "Ownership basics",
            "passingScore": 70,
            "durationInMinutes": 5,
            "questionCount": 2,
            "questions": [
                {
                    "id": 1,
                    "questionText": "What does Drop do?",
                    "answers": [
                        { "id": 10, "answerText": "Frees resources", "correct": true },
                        { "id": 11, "answerText": "Clones the value" }
                    ]
                }
            ]
        });

        let quiz: QuizDefinition = serde_json::from_value(raw).unwrap();
        assert_eq!(quiz.duration_in_minutes, Some(5));
        assert_eq!(quiz.questions[0].answers.len(), 2);
        // stray grading fields from the server are dropped on the floor
        assert_eq!(quiz.questions[0].answers[0].answer_text, "Frees resources");
    }

    #[test]
    fn missing_duration_means_untimed() {
        let raw = serde_json::json!({
            "id": 3,
            "title": "Untimed",
            "passingScore": 50,
            "questions": []
        });

        let quiz: QuizDefinition = serde_json::from_value(raw).unwrap();
        assert_eq!(quiz.duration_in_minutes, None);
        assert_eq!(quiz.question_count, 0);
    }
}
