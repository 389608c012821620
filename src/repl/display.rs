//! Terminal output for answers, progress, recommendations and insights
//!
//! Formatting helpers return plain strings; the `show_*` functions add color
//! and print. Both the REPL and the one-shot subcommands use them.

use crate::assistant::{QueryOutcome, QueryStatus};
use crate::knowledge::KnowledgeStore;
use crate::learning::{LearningInsights, Recommendation};
use crate::progress::UserProgress;
use crate::storage::HistoryEntry;
use colored::*;

const RULE_WIDTH: usize = 60;
const BAR_WIDTH: usize = 10;

fn rule() -> ColoredString {
    "=".repeat(RULE_WIDTH).cyan()
}

/// Fixed-width completion bar, e.g. `[####------]`
pub fn completion_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Model confidence as a whole percentage
pub fn confidence_percent(confidence: f64) -> u32 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// One recommendation line without color
pub fn format_recommendation(index: usize, recommendation: &Recommendation) -> String {
    format!(
        "{}. {} ({}, {}% match)",
        index + 1,
        recommendation.topic.title,
        recommendation.topic.difficulty,
        confidence_percent(recommendation.confidence)
    )
}

/// `level: description` lines for the difficulties used in the catalog
pub fn difficulty_legend(knowledge: &KnowledgeStore) -> Vec<String> {
    let mut seen = Vec::new();
    for topic in knowledge.topics() {
        if !seen.contains(&topic.difficulty) {
            seen.push(topic.difficulty);
        }
    }
    seen.into_iter()
        .map(|level| format!("{}: {}", level, knowledge.difficulty_label(level)))
        .collect()
}

/// Show welcome banner
pub fn show_banner(version: &str, user: &str) {
    println!("\n{}", rule());
    println!(
        "{}",
        format!("  CodeSensei {} - Interactive Tutor", version)
            .bold()
            .cyan()
    );
    println!("{}", format!("  User: {} | Mode: REPL", user).dimmed());
    println!("{}\n", rule());
    println!(
        "Ask a programming question (or {} for commands, {} to quit)\n",
        "/help".green(),
        "/exit".green()
    );
}

/// Print the answer to a query, followed by recommendations when present
pub fn show_outcome(outcome: &QueryOutcome) {
    match outcome.status {
        QueryStatus::Answered => {
            println!("\n{}\n", outcome.response);
            if !outcome.recommendations.is_empty() {
                show_recommendations(&outcome.recommendations);
            }
        }
        QueryStatus::NoMatch | QueryStatus::OffTopic | QueryStatus::Empty => {
            println!("{}", outcome.response.yellow());
        }
    }
}

pub fn show_recommendations(recommendations: &[Recommendation]) {
    if recommendations.is_empty() {
        println!("{}", "Nothing left to recommend. You've explored every topic!".green());
        return;
    }

    println!("{}", "Recommended next:".bold().cyan());
    for (i, recommendation) in recommendations.iter().enumerate() {
        println!("  {}", format_recommendation(i, recommendation));
        let reason = recommendation.reason();
        if !reason.is_empty() {
            println!("     {}", reason.dimmed());
        }
    }
    println!();
}

pub fn show_progress(progress: &UserProgress, knowledge: &KnowledgeStore) {
    println!("\n{}", "Learning Progress:".bold().cyan());
    println!("{}", rule());

    for topic in knowledge.topics() {
        let percent = progress.completion_percent(&topic.id);
        let line = format!(
            "  {:<28} {} {:>3.0}%  ({} questions)",
            topic.title,
            completion_bar(percent),
            percent,
            progress.questions_for(&topic.id)
        );
        if percent >= 100.0 {
            println!("{}", line.green());
        } else {
            println!("{}", line);
        }
    }

    println!();
    println!(
        "  Topics explored: {}/{}",
        progress.explored_count().to_string().cyan(),
        knowledge.len()
    );
    println!(
        "  Questions asked: {}",
        progress.total_questions.to_string().cyan()
    );
    println!("  Day streak: {}", progress.streak.to_string().cyan());
    println!();
    for line in difficulty_legend(knowledge) {
        println!("  {}", line.dimmed());
    }
    println!();
}

pub fn show_insights(insights: &LearningInsights) {
    println!("\n{}", "Learning Insights:".bold().cyan());
    println!("{}", rule());
    println!("  Learning style:       {}", insights.learning_style.green());
    println!(
        "  Preferred difficulty: {}",
        insights.preferred_difficulty.green()
    );

    if insights.strengths.is_empty() {
        println!("  Strengths:            {}", "none yet".dimmed());
    } else {
        println!("  Strengths:            {}", insights.strengths.join(", "));
    }

    if !insights.areas_for_growth.is_empty() {
        println!(
            "  Areas for growth:     {}",
            insights.areas_for_growth.join(", ").yellow()
        );
    }
    println!();

    show_recommendations(&insights.recommended_next_steps);
}

pub fn show_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("{}", "No history yet.".yellow());
        return;
    }

    println!(
        "\n{}",
        format!("Question History (last {}):", entries.len())
            .bold()
            .cyan()
    );
    println!("{}", rule());
    for entry in entries {
        println!(
            "  {} {}",
            entry.time.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            entry.query
        );
    }
    println!();
}

pub fn show_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeStore;
    use crate::learning::RecommendationReason;

    #[test]
    fn test_completion_bar() {
        assert_eq!(completion_bar(0.0), "[----------]");
        assert_eq!(completion_bar(40.0), "[####------]");
        assert_eq!(completion_bar(100.0), "[##########]");
        assert_eq!(completion_bar(250.0), "[##########]");
    }

    #[test]
    fn test_confidence_percent() {
        assert_eq!(confidence_percent(0.504), 50);
        assert_eq!(confidence_percent(1.5), 100);
        assert_eq!(confidence_percent(-0.2), 0);
    }

    #[test]
    fn test_format_recommendation() {
        let knowledge = KnowledgeStore::builtin().unwrap();
        let recommendation = Recommendation {
            topic: knowledge.get("loops").unwrap().clone(),
            score: 0.7,
            confidence: 0.62,
            reasons: vec![RecommendationReason::BeginnerFriendly],
        };

        let line = format_recommendation(0, &recommendation);
        assert!(line.starts_with("1. "));
        assert!(line.contains(&recommendation.topic.title));
        assert!(line.ends_with("62% match)"));
    }

    #[test]
    fn test_difficulty_legend_follows_catalog_order() {
        let knowledge = KnowledgeStore::builtin().unwrap();
        assert_eq!(
            difficulty_legend(&knowledge),
            vec![
                "beginner: Suitable for those new to programming".to_string(),
                "intermediate: Requires some programming experience".to_string(),
            ]
        );
    }
}
