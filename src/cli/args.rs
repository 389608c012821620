//! Command-line argument parsing for CodeSensei
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CodeSensei - a terminal tutor for programming fundamentals
#[derive(Parser, Debug)]
#[command(name = "codesensei")]
#[command(version)]
#[command(about = "Ask programming questions and get topic recommendations that adapt to you", long_about = None)]
pub struct Args {
    /// Question to answer (omit to use a subcommand)
    #[arg(value_name = "QUESTION")]
    pub question: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// State directory (overrides the configured one)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// User whose query history is used
    #[arg(short, long, default_value = "guest")]
    pub user: String,

    /// Verbosity level: -v (info), -vv (debug), -vvv (trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start interactive REPL mode
    Start,

    /// Show per-topic progress
    Progress,

    /// Suggest topics to study next
    Recommend {
        /// Number of recommendations
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Summarize learning style, strengths and gaps
    Insights,

    /// Show recent questions
    History {
        /// Number of entries to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Delete the history instead of showing it
        #[arg(long)]
        clear: bool,
    },

    /// Forget progress and the learned model
    Reset,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
    Trace,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                2 => Verbosity::VeryVerbose,
                _ => Verbosity::Trace,
            }
        }
    }

    /// Check that exactly one of question and subcommand is present
    pub fn validate(&self) -> Result<(), String> {
        if self.command.is_none() && self.question.is_none() {
            return Err(
                "Question required. Use 'codesensei <QUESTION>' or run a subcommand.".to_string(),
            );
        }

        if self.command.is_some() && self.question.is_some() {
            return Err("Cannot specify a question with a subcommand.".to_string());
        }

        Ok(())
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
            Verbosity::Trace => "trace",
        }
    }

    /// Default `tracing` filter directive for this level
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
            Verbosity::Trace => "trace",
        }
    }

    /// Check if decorative output (banners, hints) should be printed
    pub fn show_hints(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
