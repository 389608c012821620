//! REPL (Read-Eval-Print Loop) for interactive tutoring
//!
//! Components:
//! - Input: rustyline editing, input history and tab completion
//! - Commands: slash command parsing and execution
//! - Display: colored rendering of answers, progress and insights

pub mod commands;
pub mod display;
pub mod input;

use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

use crate::assistant::Sensei;
use crate::repl::commands::is_command;
use crate::repl::input::InputHandler;
use crate::storage::KeyValueStore;

/// REPL session coordinator
pub struct ReplSession<S: KeyValueStore> {
    input_handler: InputHandler,
    sensei: Sensei<S>,
}

impl<S: KeyValueStore> ReplSession<S> {
    pub fn new(sensei: Sensei<S>) -> Result<Self> {
        Ok(ReplSession {
            input_handler: InputHandler::new(topic_ids(&sensei))?,
            sensei,
        })
    }

    /// Create REPL session with persistent input history
    pub fn with_history(sensei: Sensei<S>, history_path: PathBuf) -> Result<Self> {
        Ok(ReplSession {
            input_handler: InputHandler::with_history(topic_ids(&sensei), history_path)?,
            sensei,
        })
    }

    pub fn sensei(&self) -> &Sensei<S> {
        &self.sensei
    }

    /// Read, answer and print until the user exits
    pub fn run(&mut self, version: &str) -> Result<()> {
        display::show_banner(version, self.sensei.user());

        while let Some(line) = self.input_handler.read_line()? {
            if !self.handle_input(&line)? {
                break;
            }
        }

        self.save()
    }

    /// Handle user input (command or question)
    ///
    /// Returns true if session should continue, false to exit
    pub fn handle_input(&mut self, input: &str) -> Result<bool> {
        if input.trim().is_empty() {
            return Ok(true);
        }

        if is_command(input) {
            let command = commands::parse(input);
            debug!("REPL command: {:?}", command);
            return commands::execute(command, &mut self.sensei);
        }

        let outcome = self.sensei.handle_query(input);
        display::show_outcome(&outcome);
        Ok(true)
    }

    /// Save input history and session state
    pub fn save(&mut self) -> Result<()> {
        self.input_handler.save_history()?;
        self.sensei.save()?;
        Ok(())
    }
}

fn topic_ids<S: KeyValueStore>(sensei: &Sensei<S>) -> Vec<String> {
    sensei
        .knowledge()
        .topics()
        .iter()
        .map(|topic| topic.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn session() -> ReplSession<MemoryStore> {
        ReplSession::new(Sensei::with_defaults(MemoryStore::new()).unwrap()).unwrap()
    }

    #[test]
    fn test_handle_command() {
        let mut session = session();
        assert!(session.handle_input("/help").unwrap());
        assert!(!session.handle_input("/exit").unwrap());
    }

    #[test]
    fn test_handle_empty_input() {
        let mut session = session();
        assert!(session.handle_input("").unwrap());
        assert!(session.handle_input("   ").unwrap());
        assert!(session.sensei().history(10).is_empty());
    }

    #[test]
    fn test_handle_question() {
        let mut session = session();
        assert!(session.handle_input("How do arrays work?").unwrap());
        assert_eq!(session.sensei().progress().questions_for("arrays"), 1);
    }
}
