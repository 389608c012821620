//! Command handler for REPL built-in commands
//!
//! Slash commands for progress, recommendations, insights, history and
//! explicit feedback. Anything not starting with `/` is a question.

use crate::assistant::Sensei;
use crate::repl::display;
use crate::storage::KeyValueStore;
use anyhow::Result;
use colored::*;

const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Canonical command spellings, offered for tab completion
pub const COMMAND_NAMES: &[&str] = &[
    "/help",
    "/progress",
    "/recommend",
    "/insights",
    "/history",
    "/clear-history",
    "/feedback",
    "/reset",
    "/exit",
];

/// REPL command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Progress,
    Recommend { top: Option<usize> },
    Insights,
    History { limit: Option<usize> },
    ClearHistory,
    Feedback { topic_id: String, helpful: bool },
    Reset,
    Exit,
    /// Recognized command with bad arguments
    Usage { usage: &'static str },
    Unknown { input: String },
}

/// Check whether input is a slash command
pub fn is_command(input: &str) -> bool {
    input.trim().starts_with('/')
}

/// Parse input string into a command
pub fn parse(input: &str) -> Command {
    let trimmed = input.trim();

    let Some(body) = trimmed.strip_prefix('/') else {
        return Command::Unknown {
            input: input.to_string(),
        };
    };

    let parts: Vec<&str> = body.split_whitespace().collect();
    if parts.is_empty() {
        return Command::Unknown {
            input: input.to_string(),
        };
    }

    match parts[0].to_lowercase().as_str() {
        "help" | "h" => Command::Help,
        "exit" | "quit" | "q" => Command::Exit,
        "progress" => Command::Progress,
        "recommend" | "rec" => Command::Recommend {
            top: parts.get(1).and_then(|s| s.parse().ok()),
        },
        "insights" => Command::Insights,
        "history" => Command::History {
            limit: parts.get(1).and_then(|s| s.parse().ok()),
        },
        "clear-history" => Command::ClearHistory,
        "feedback" => parse_feedback(&parts[1..]),
        "reset" => Command::Reset,
        _ => Command::Unknown {
            input: input.to_string(),
        },
    }
}

fn parse_feedback(args: &[&str]) -> Command {
    const USAGE: &str = "/feedback <topic-id> <helpful|unhelpful>";

    let helpful = match args.get(1).map(|s| s.to_lowercase()) {
        Some(word) if matches!(word.as_str(), "helpful" | "yes" | "up" | "+") => true,
        Some(word) if matches!(word.as_str(), "unhelpful" | "no" | "down" | "-") => false,
        _ => return Command::Usage { usage: USAGE },
    };

    match args.first() {
        Some(topic_id) if args.len() == 2 => Command::Feedback {
            topic_id: topic_id.to_string(),
            helpful,
        },
        _ => Command::Usage { usage: USAGE },
    }
}

/// Execute a command against the session
///
/// Returns true if REPL should continue, false if should exit
pub fn execute<S: KeyValueStore>(command: Command, sensei: &mut Sensei<S>) -> Result<bool> {
    match command {
        Command::Help => {
            show_help();
        }
        Command::Exit => {
            println!("{}", "Goodbye! Keep practicing.".green());
            return Ok(false);
        }
        Command::Progress => {
            display::show_progress(sensei.progress(), sensei.knowledge());
        }
        Command::Recommend { top } => {
            let recommendations = sensei.recommendations(top);
            display::show_recommendations(&recommendations);
        }
        Command::Insights => {
            let insights = sensei.insights();
            display::show_insights(&insights);
        }
        Command::History { limit } => {
            let entries = sensei.history(limit.unwrap_or(DEFAULT_HISTORY_LIMIT));
            display::show_history(&entries);
        }
        Command::ClearHistory => {
            sensei.clear_history()?;
            println!("{}", "Question history cleared.".yellow());
        }
        Command::Feedback { topic_id, helpful } => match sensei.feedback(&topic_id, helpful) {
            Ok(report) => {
                let verdict = if helpful { "helpful" } else { "unhelpful" };
                println!("{}", format!("Noted: '{}' was {}.", topic_id, verdict).cyan());
                if let Some(report) = report {
                    println!(
                        "{}",
                        format!(
                            "Model retrained on {} examples ({} epochs)",
                            report.examples, report.epochs_run
                        )
                        .dimmed()
                    );
                }
            }
            Err(e) => display::show_error(&e.to_string()),
        },
        Command::Reset => {
            sensei.reset()?;
            println!("{}", "Progress and learned preferences reset.".yellow());
        }
        Command::Usage { usage } => {
            println!("Usage: {}", usage.cyan());
        }
        Command::Unknown { input } => {
            println!("{}", format!("Unknown command: {}", input).red());
            println!("Type {} for available commands", "/help".cyan());
        }
    }
    Ok(true)
}

/// Display help information
fn show_help() {
    println!("\n{}", "Available Commands:".bold().cyan());
    println!("{}", "=".repeat(60).cyan());

    let commands = [
        ("/help, /h", "Show this help message"),
        ("/progress", "Show per-topic progress and streak"),
        ("/recommend [n]", "Suggest topics to study next"),
        ("/insights", "Show learning style, strengths and gaps"),
        ("/history [n]", "Show last n questions (default: 10)"),
        ("/clear-history", "Delete your question history"),
        ("/feedback <id> <helpful|unhelpful>", "Rate a topic's answer"),
        ("/reset", "Forget progress and learned preferences"),
        ("/exit, /quit, /q", "Exit REPL"),
    ];

    for (cmd, desc) in commands {
        println!("  {:<36} {}", cmd.green(), desc);
    }

    println!("\n{}", "Usage:".bold());
    println!("  - Type your question directly (no / prefix)");
    println!("  - Use {} for input history", "UP/DOWN arrows".cyan());
    println!("  - Press {} or {} to exit", "Ctrl-D".cyan(), "/exit".cyan());
    println!();
}
