//! Input handler for REPL using rustyline
//!
//! Line editing with persistent input history and tab completion of slash
//! commands, topic ids and feedback verdicts.

use anyhow::Result;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::{DefaultHistory, History};
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::path::PathBuf;

use crate::repl::commands::COMMAND_NAMES;

const PROMPT: &str = "sensei> ";

const VERDICTS: &[&str] = &["helpful", "unhelpful"];

/// Tab completion for the REPL
///
/// `/fe<TAB>` completes the command, `/feedback lo<TAB>` the topic id and
/// the word after it the verdict. Questions are left alone.
#[derive(Debug, Clone, Default)]
pub struct SenseiCompleter {
    topic_ids: Vec<String>,
}

impl SenseiCompleter {
    pub fn new(topic_ids: Vec<String>) -> Self {
        Self { topic_ids }
    }

    /// Start offset of the word under the cursor and its candidates
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let head = &line[..pos];
        if !head.starts_with('/') {
            return (pos, Vec::new());
        }

        let start = head
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = &head[start..];
        let preceding: Vec<&str> = head[..start].split_whitespace().collect();

        let pool: Vec<&str> = match preceding.as_slice() {
            [] => COMMAND_NAMES.to_vec(),
            ["/feedback"] => self.topic_ids.iter().map(String::as_str).collect(),
            ["/feedback", _] => VERDICTS.to_vec(),
            _ => Vec::new(),
        };

        let matches = pool
            .into_iter()
            .filter(|candidate| candidate.starts_with(word))
            .map(str::to_string)
            .collect();
        (start, matches)
    }
}

impl Completer for SenseiCompleter {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok(self.candidates(line, pos))
    }
}

impl Hinter for SenseiCompleter {
    type Hint = String;
}

impl Highlighter for SenseiCompleter {}

impl Validator for SenseiCompleter {}

impl Helper for SenseiCompleter {}

/// Readline interface and input history
pub struct InputHandler {
    editor: Editor<SenseiCompleter, DefaultHistory>,
    history_path: Option<PathBuf>,
}

impl InputHandler {
    /// Create an input handler completing the given topic ids
    pub fn new(topic_ids: Vec<String>) -> Result<Self> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(SenseiCompleter::new(topic_ids)));

        Ok(InputHandler {
            editor,
            history_path: None,
        })
    }

    /// Create input handler with persistent history
    pub fn with_history(topic_ids: Vec<String>, history_file: PathBuf) -> Result<Self> {
        let mut handler = Self::new(topic_ids)?;

        if history_file.exists() {
            let _ = handler.editor.load_history(&history_file);
        }
        handler.history_path = Some(history_file);

        Ok(handler)
    }

    /// Read a line of input from user
    ///
    /// Returns:
    /// - Ok(Some(input)) for normal input (empty string for blank lines)
    /// - Ok(None) for EOF (Ctrl-D) or interrupt (Ctrl-C)
    /// - Err on other readline errors
    pub fn read_line(&mut self) -> Result<Option<String>> {
        match self.editor.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return Ok(Some(String::new()));
                }

                if remember(trimmed) {
                    let _ = self.editor.add_history_entry(trimmed);
                }
                Ok(Some(trimmed.to_string()))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }

    /// Save history to disk
    pub fn save_history(&mut self) -> Result<()> {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            self.editor.save_history(path)?;
        }
        Ok(())
    }

    pub fn history_len(&self) -> usize {
        self.editor.history().len()
    }
}

/// Session-ending commands are not worth recalling
fn remember(line: &str) -> bool {
    !matches!(line, "/exit" | "/quit" | "/q")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn completer() -> SenseiCompleter {
        SenseiCompleter::new(vec![
            "loops".to_string(),
            "functions".to_string(),
            "error-handling".to_string(),
        ])
    }

    #[test]
    fn test_complete_command_name() {
        let (start, matches) = completer().candidates("/fe", 3);
        assert_eq!(start, 0);
        assert_eq!(matches, vec!["/feedback"]);

        let (_, matches) = completer().candidates("/", 1);
        assert_eq!(matches.len(), COMMAND_NAMES.len());
    }

    #[test]
    fn test_complete_feedback_topic_and_verdict() {
        let line = "/feedback lo";
        let (start, matches) = completer().candidates(line, line.len());
        assert_eq!(start, 10);
        assert_eq!(matches, vec!["loops"]);

        let line = "/feedback loops un";
        let (start, matches) = completer().candidates(line, line.len());
        assert_eq!(start, 16);
        assert_eq!(matches, vec!["unhelpful"]);
    }

    #[test]
    fn test_questions_are_not_completed() {
        let line = "what is a lo";
        let (start, matches) = completer().candidates(line, line.len());
        assert_eq!(start, line.len());
        assert!(matches.is_empty());

        let line = "/progress lo";
        assert!(completer().candidates(line, line.len()).1.is_empty());
    }

    #[test]
    fn test_exit_not_remembered() {
        assert!(!remember("/exit"));
        assert!(remember("/progress"));
        assert!(remember("what is a loop"));
    }

    #[test]
    fn test_history_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let history_path = temp_dir.path().join("repl").join("history");

        {
            let mut handler =
                InputHandler::with_history(Vec::new(), history_path.clone()).unwrap();
            let _ = handler.editor.add_history_entry("what is a loop");
            let _ = handler.editor.add_history_entry("/progress");
            handler.save_history().unwrap();
        }

        assert!(history_path.exists());

        let handler = InputHandler::with_history(Vec::new(), history_path).unwrap();
        assert_eq!(handler.history_len(), 2);
    }
}
