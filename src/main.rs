use std::sync::Arc;

use elearn_quiz_client::attempt::AttemptController;
use elearn_quiz_client::config::init_config;
use elearn_quiz_client::models::attempt::{AttemptPhase, AttemptResult};
use elearn_quiz_client::services::AttemptHistoryService;
use elearn_quiz_client::utils::time::format_time;
use elearn_quiz_client::AppContext;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;

    let quiz_id: i32 = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: elearn-quiz-client <quiz-id>"))?
        .parse()?;

    let ctx = AppContext::new();

    if let Some(previous) = ctx.api.last_attempt(quiz_id).await? {
        println!(
            "Previous attempt #{}: {} in {}",
            previous.attempt_number,
            outcome_line(&previous),
            format_time(previous.duration_seconds),
        );
        println!("Starting a new attempt...\n");
    }

    let controller = AttemptController::new(
        quiz_id,
        Arc::new(ctx.api.clone()),
        Arc::new(ctx.api.clone()),
    );
    controller.load().await?;

    let quiz = controller
        .quiz()
        .await
        .ok_or_else(|| anyhow::anyhow!("quiz definition missing after load"))?;

    println!("{}", quiz.title);
    println!("Passing score: {} / 100", quiz.passing_score);
    if let Some(minutes) = quiz.duration_in_minutes {
        println!("Time limit: {} minute(s)", minutes);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    for (index, question) in quiz.questions.iter().enumerate() {
        if controller.phase().await != AttemptPhase::Active {
            println!("\nTime is up.");
            break;
        }
        println!();
        if let Some(remaining) = controller.remaining_seconds().await {
            println!("Time remaining: {}", format_time(remaining));
        }
        println!("{}. {}", index + 1, question.question_text);
        for (position, answer) in question.answers.iter().enumerate() {
            println!("  {}) {}", position + 1, answer.answer_text);
        }
        println!("Pick an answer (1-{}), or press enter to skip:", question.answers.len());

        let Some(choice) = read_choice(&mut lines).await? else {
            continue;
        };
        match question.answers.get(choice.wrapping_sub(1)) {
            Some(answer) => controller.select_answer(question.id, answer.id).await,
            None => println!("No such option, skipping."),
        }
    }

    match controller.submit().await {
        Ok(Some(result)) => report(&controller, &result).await,
        Ok(None) => {
            // the expiry timer already submitted for us; give it a moment
            for _ in 0..10 {
                if controller.result().await.is_some() {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }
            match controller.result().await {
                Some(result) => {
                    println!("\nTime was up, your answers were submitted automatically.");
                    report(&controller, &result).await;
                }
                None => eprintln!("The attempt could not be submitted."),
            }
        }
        Err(err) => {
            eprintln!("Submission failed: {}. Retrying...", err);
            match controller.retry_submit().await {
                Ok(Some(result)) => report(&controller, &result).await,
                _ => eprintln!("Could not submit the attempt; your answers were not recorded."),
            }
        }
    }

    Ok(())
}

async fn read_choice(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<Option<usize>> {
    let Some(line) = lines.next_line().await? else {
        return Ok(None);
    };
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(trimmed.parse().ok())
}

async fn report(controller: &AttemptController, result: &AttemptResult) {
    println!();
    println!("Score: {:.0} / 100 ({})", result.score, pass_label(result.passed));
    println!("Time taken: {}", format_time(controller.elapsed_seconds().await));
}

fn outcome_line(result: &AttemptResult) -> String {
    format!("score {:.0}/100, {}", result.score, pass_label(result.passed))
}

fn pass_label(passed: bool) -> &'static str {
    if passed {
        "passed"
    } else {
        "failed"
    }
}
