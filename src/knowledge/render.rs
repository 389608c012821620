//! Markdown rendering for topics

use crate::knowledge::types::Topic;
use std::fmt::Write;

/// Language hint for a fenced code block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeLanguage {
    JavaScript,
    Python,
    Plain,
}

impl CodeLanguage {
    /// Tag placed after the opening fence; empty for untagged blocks
    pub fn fence_tag(&self) -> &'static str {
        match self {
            CodeLanguage::JavaScript => "javascript",
            CodeLanguage::Python => "python",
            CodeLanguage::Plain => "",
        }
    }
}

/// Infer a language hint from simple content markers
///
/// JavaScript markers win when a snippet shows both languages.
pub fn code_language(code: &str) -> CodeLanguage {
    if code.contains("// JavaScript") || code.contains("let ") || code.contains("const ") {
        CodeLanguage::JavaScript
    } else if code.contains("# Python") || code.contains("def ") || code.contains("print(") {
        CodeLanguage::Python
    } else {
        CodeLanguage::Plain
    }
}

/// Render a topic as a Markdown answer
pub fn render_topic(topic: &Topic) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write!(out, "## {}\n\n{}\n\n", topic.title, topic.description);

    if !topic.examples.is_empty() {
        out.push_str("### Examples:\n\n");
        for example in &topic.examples {
            let _ = write!(out, "**{}**\n{}\n\n", example.title, example.description);
            if !example.code.is_empty() {
                let _ = write!(
                    out,
                    "```{}\n{}\n```\n\n",
                    code_language(&example.code).fence_tag(),
                    example.code
                );
            }
            let _ = write!(out, "{}\n\n", example.explanation);
        }
    }

    if !topic.common_questions.is_empty() {
        out.push_str("### Related Questions:\n");
        for question in &topic.common_questions {
            let _ = writeln!(out, "• {}", question);
        }
    }

    out
}
