//! Interactive chat surface over the query path.
//!
//! A thin REPL: read a question, answer it against the current snapshot,
//! print the result, repeat. The transcript is an append-only sequence of
//! turns owned by this layer for display only — it is never folded back into
//! prompts (multi-turn memory is out of scope).

use std::io::{BufRead, Write};

use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use askbase_core::AnswerGenerator;
use askbase_core::pipeline::AskConfig;

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    User,
    Assistant,
}

/// One entry in the append-only chat transcript.
#[derive(Debug, Clone)]
pub(crate) struct ChatTurn {
    pub role: Role,
    pub text: String,
    #[allow(dead_code)] // kept for transcript export
    pub at: DateTime<Utc>,
}

impl ChatTurn {
    fn now(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

/// Run the chat REPL until EOF or an exit command.
pub(crate) async fn run(config: &AskConfig, generator: &AnswerGenerator) -> Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut history: Vec<ChatTurn> = Vec::new();

    println!("askbase chat — ask about your ingested sources. Type 'exit' to quit.");

    loop {
        write!(stdout, "you> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question == "exit" || question == "quit" {
            break;
        }

        history.push(ChatTurn::now(Role::User, question));

        let spinner = thinking_spinner();
        let result = askbase_core::pipeline::ask(question, config, generator).await;
        spinner.finish_and_clear();

        match result {
            Ok(answer) => {
                println!("askbase> {answer}");
                history.push(ChatTurn::now(Role::Assistant, answer));
            }
            Err(e) => {
                // A generation failure is rendered as such, never as an
                // answer; the user can simply re-ask.
                warn!(error = %e, "answer generation failed");
                eprintln!("error: {e} (try again)");
            }
        }
    }

    println!("bye ({} turns)", history.len());
    Ok(())
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.set_message("Thinking...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_is_append_only() {
        let mut history = Vec::new();
        history.push(ChatTurn::now(Role::User, "which laptop?"));
        history.push(ChatTurn::now(Role::Assistant, "Laptop B."));
        history.push(ChatTurn::now(Role::User, "and the price?"));

        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);
        assert!(history[0].at <= history[2].at);
    }
}
