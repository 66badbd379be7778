use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::quiz::QuizDefinition;

/// Shuffles each question's answers in place, independently per question.
/// Question order is left untouched. The random source is injected so tests
/// can seed it; production uses entropy.
pub fn shuffle_answers<R: Rng + ?Sized>(quiz: &mut QuizDefinition, rng: &mut R) {
    for question in &mut quiz.questions {
        question.answers.shuffle(rng);
    }
}
