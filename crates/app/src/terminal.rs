//! Plain-text rendering and the interactive quiz loop.

use std::error::Error;
use std::time::Duration;

use quiz_core::model::{Quiz, QuizResult, QuizSummary, Subject, SubmitReason, TaskReport};
use services::{
    AppServices, AttemptError, CreationFailure, CreationOutcome, Notifier, PageSize, QuizAttempt,
    Severity, SubmitReceipt, TaskObserver, TickOutcome, progress_percent,
};
use tokio::io::{AsyncBufReadExt, BufReader};

pub fn print_snackbar(notifier: &Notifier) {
    let snackbar = notifier.current();
    if !snackbar.open {
        return;
    }
    match snackbar.severity {
        Severity::Error | Severity::Warning => {
            eprintln!("[{}] {}", snackbar.severity.as_str(), snackbar.message);
        }
        Severity::Info | Severity::Success => println!("{}", snackbar.message),
    }
    notifier.hide();
}

pub fn print_subjects(subjects: &[Subject]) {
    if subjects.is_empty() {
        println!("No subjects found.");
        return;
    }
    for subject in subjects {
        println!("{:>6}  {}", subject.id, subject.title);
    }
}

pub fn print_quizzes(quizzes: &[QuizSummary], has_more: bool) {
    if quizzes.is_empty() {
        println!("No quizzes found.");
        return;
    }
    for quiz in quizzes {
        println!(
            "{:>6}  {}  [{}]  {} questions",
            quiz.id, quiz.title, quiz.subject_title, quiz.number_of_questions
        );
        if !quiz.description.is_empty() {
            println!("        {}", quiz.description);
        }
    }
    if has_more {
        println!("(more available, rerun with --more)");
    }
}

pub fn print_quiz(quiz: &Quiz) {
    println!("{}  [{}]", quiz.title(), quiz.subject().title);
    if !quiz.description().is_empty() {
        println!("{}", quiz.description());
    }
    println!(
        "{} questions, {} minutes, pass at {}%",
        quiz.questions().len(),
        quiz.duration_secs() / 60,
        quiz.success_percentage()
    );
    for (i, question) in quiz.questions().iter().enumerate() {
        println!();
        println!("{}. {}", i + 1, question.title());
        for choice in question.choices() {
            let mark = if choice.id == question.correct_choice().id {
                '*'
            } else {
                ' '
            };
            println!("   {mark} {}", choice.title);
        }
    }
}

pub fn print_result(result: &QuizResult) {
    println!(
        "Score {}/{} ({:.2}%), {} (pass mark {}%)",
        result.score(),
        result.total(),
        result.percentage(),
        if result.passed() { "passed" } else { "failed" },
        result.success_percentage
    );
    for (i, question) in result.questions.iter().enumerate() {
        let verdict = if question.is_correct() { "ok " } else { "bad" };
        println!();
        println!("{verdict} {}. {}", i + 1, question.title());
        let selected = question
            .selected()
            .map_or("(no answer)", |choice| choice.title.as_str());
        println!("      your answer: {selected}");
        if !question.is_correct() {
            println!("      correct:     {}", question.correct().title);
        }
    }
}

/// Prints generation progress on one line.
#[derive(Default)]
pub struct ProgressPrinter {
    last: Option<u32>,
}

impl TaskObserver for ProgressPrinter {
    fn on_progress(&mut self, completed: u32, total: u32) {
        if completed == 0 {
            if self.last.take().is_some() {
                println!();
            }
            return;
        }
        if self.last == Some(completed) {
            return;
        }
        self.last = Some(completed);
        print!(
            "\rGenerated {completed}/{total} questions ({}%)",
            progress_percent(completed, total)
        );
        let _ = std::io::Write::flush(&mut std::io::stdout());
    }

    fn on_success(&mut self, _report: &TaskReport) {}

    fn on_failure(&mut self, _message: &str) {}

    fn on_close(&mut self) {}
}

pub fn report_creation(outcome: &CreationOutcome, notifier: &Notifier) {
    let (message, severity) = match outcome {
        CreationOutcome::Created { quiz_id } => (
            format!("Quiz {quiz_id} created. Start it with `app take {quiz_id}`."),
            Severity::Success,
        ),
        CreationOutcome::PartiallyCreated { quiz_id, missing } => (
            format!("Quiz {quiz_id} created, but {missing} questions could not be generated."),
            Severity::Warning,
        ),
        CreationOutcome::MaterialTooShort => (
            "The material is too short for the requested number of questions.".to_string(),
            Severity::Error,
        ),
        CreationOutcome::Failed(failure) => {
            let message = match failure {
                CreationFailure::IncorrectApiKey => failure.user_message().to_string(),
                CreationFailure::ServerError { message } => {
                    format!("{} ({message})", failure.user_message())
                }
            };
            (message, Severity::Error)
        }
        CreationOutcome::UnknownCompletion => (
            "Generation finished, but the server did not say which quiz it created.".to_string(),
            Severity::Warning,
        ),
        CreationOutcome::Cancelled => (
            "Stopped waiting; generation continues on the server.".to_string(),
            Severity::Info,
        ),
    };
    notifier.show(message, severity);
}

enum Input {
    Render,
    Submit,
    Message(String),
}

fn handle_input(attempt: &mut QuizAttempt, line: &str) -> Input {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Input::Render;
    };

    match head {
        "n" => {
            if !attempt.next_question() {
                return Input::Message("Already at the last question.".into());
            }
        }
        "p" => {
            if !attempt.prev_question() {
                return Input::Message("Already at the first question.".into());
            }
        }
        ">" => attempt.next_page(),
        "<" => attempt.prev_page(),
        "g" => {
            let target = parts.next().and_then(|raw| raw.parse::<usize>().ok());
            match target {
                Some(n) if n >= 1 && attempt.go_to_question(n - 1) => {}
                _ => return Input::Message(format!("Use g <1-{}>.", attempt.len())),
            }
        }
        "s" => return Input::Submit,
        "?" | "h" => {
            return Input::Message(
                "<number> answer, n/p next/previous question, g <i> go to question, \
                 </> page the navigator, s submit"
                    .into(),
            );
        }
        raw => {
            let choice = raw.parse::<usize>().ok().and_then(|n| {
                let question = attempt.current()?.question();
                n.checked_sub(1)
                    .and_then(|i| question.choices().get(i))
                    .map(|choice| choice.id)
            });
            match choice {
                Some(id) => attempt.select(id),
                None => return Input::Message(format!("Unknown input: {raw} (? for help)")),
            }
        }
    }
    Input::Render
}

fn render(attempt: &QuizAttempt) {
    let Some(current) = attempt.current() else {
        return;
    };

    let start = attempt.page() * attempt.page_size();
    let navigator: Vec<String> = attempt
        .displayed()
        .iter()
        .enumerate()
        .map(|(offset, question)| {
            let n = start + offset + 1;
            if question.index() == attempt.current_index() {
                format!("[{n}]")
            } else if question.is_answered() {
                format!("+{n}")
            } else {
                format!(" {n}")
            }
        })
        .collect();

    println!();
    println!(
        "{}  [{}]  time {}  answered {}/{}",
        attempt.title(),
        attempt.subject_title(),
        attempt.format_time(),
        attempt.answered_count(),
        attempt.len()
    );
    println!(
        "page {}/{}: {}",
        attempt.page() + 1,
        attempt.total_pages(),
        navigator.join(" ")
    );
    println!();
    println!("{}. {}", current.index() + 1, current.question().title());
    for (i, choice) in current.question().choices().iter().enumerate() {
        let mark = if current.selected() == Some(choice.id) {
            'x'
        } else {
            ' '
        };
        println!("  {}. [{mark}] {}", i + 1, choice.title);
    }
    if attempt.is_last_question() {
        println!("(last question, s to submit)");
    }
}

/// Run an attempt on the terminal until it is submitted.
///
/// # Errors
///
/// Returns an error if stdin closes first or a time-ended submission fails.
pub async fn take_quiz(
    services: &AppServices,
    quiz: Quiz,
    page_size: PageSize,
) -> Result<SubmitReceipt, Box<dyn Error>> {
    let api = services.api();
    let notifier = services.notifier();
    let mut attempt = QuizAttempt::new(quiz, page_size);
    if attempt.is_empty() {
        return Err("quiz has no questions".into());
    }

    render(&attempt);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await;

    loop {
        let reason = tokio::select! {
            _ = ticker.tick() => match attempt.tick() {
                TickOutcome::Expired => {
                    println!("Time is up, submitting.");
                    Some(SubmitReason::TimeEnded)
                }
                TickOutcome::Running => {
                    let left = attempt.time_left();
                    if left % 60 == 0 || left == 30 || left <= 5 {
                        println!("time left {}", attempt.format_time());
                    }
                    None
                }
                TickOutcome::Paused => None,
            },
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Err("input closed before the quiz was submitted".into());
                };
                match handle_input(&mut attempt, line.trim()) {
                    Input::Render => {
                        render(&attempt);
                        None
                    }
                    Input::Submit => Some(SubmitReason::UserSubmit),
                    Input::Message(message) => {
                        println!("{message}");
                        None
                    }
                }
            }
        };

        let Some(reason) = reason else {
            continue;
        };
        match attempt.submit(reason, api.as_ref()).await {
            Ok(receipt) => {
                println!("{}", receipt.message);
                return Ok(receipt);
            }
            Err(AttemptError::Unanswered { missing }) => {
                let missing: Vec<String> = missing.iter().map(|i| (i + 1).to_string()).collect();
                println!(
                    "Answer all questions before submitting. Unanswered: {}",
                    missing.join(", ")
                );
            }
            Err(err) if reason == SubmitReason::TimeEnded => return Err(err.into()),
            Err(err) => {
                tracing::warn!(error = %err, "submission failed");
                notifier.server_error();
                print_snackbar(&notifier);
            }
        }
    }
}
