// Colored terminal output for the generate and topics commands.

use colored::Colorize;

use crate::topics::model::{AggregatedResult, InputText, TopicList};

const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Show the text about to be analyzed.
pub fn display_input(text: &InputText) {
    println!("{}", rule().dimmed());
    println!("\n{}", "Input text:".bold());
    println!("{}", text.as_str().trim().dimmed());
    println!("{}", rule().dimmed());
}

/// Show the extracted topics as a numbered list.
pub fn display_topics(topics: &TopicList) {
    if topics.is_empty() {
        println!("No topics found in the input.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Topics ({}) ===", topics.len()).bold()
    );
    for (i, topic) in topics.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, topic.cyan());
    }
}

/// Show generated titles grouped by topic, in topic order.
pub fn display_result(result: &AggregatedResult) {
    if result.is_empty() {
        println!("No topics found, so no titles were generated.");
        return;
    }

    println!(
        "\n{}",
        format!(
            "=== Titles ({} topics, {} titles) ===",
            result.len(),
            result.title_count()
        )
        .bold()
    );

    for entry in result {
        println!("\n  {} {}", "Topic:".dimmed(), entry.topic.cyan().bold());
        if entry.titles.is_empty() {
            println!("    {}", "(model returned no titles)".yellow());
        }
        for title in &entry.titles {
            println!("    {} {}", "-".dimmed(), title);
        }
    }
    println!();
}
