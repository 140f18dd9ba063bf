//! Exercise catalog commands

use anyhow::{Context, Result};
use codetrainer_eval::{Task, TaskRegistry, TestCase};
use colored::*;

use crate::console::CliConsole;
use crate::render::{format_value, truncate_text};

/// List available exercises
pub fn list(registry: &TaskRegistry) {
    if registry.is_empty() {
        println!("No exercises found.");
        return;
    }

    println!("Available exercises:\n");
    println!("{:<22} {:<28} {:<6}", "ID", "Title", "Tests");
    println!("{:-<58}", "");

    for task in registry.iter() {
        println!(
            "{:<22} {:<28} {:<6}",
            task.id,
            truncate_text(&task.title, 28),
            task.tests.len()
        );
    }

    println!("\nTotal: {} exercises", registry.len());
}

/// Show one exercise with its test cases and starter source
pub fn show(registry: &TaskRegistry, id: &str) -> Result<()> {
    let task = registry
        .get(id)
        .with_context(|| format!("Unknown exercise '{}'", id))?;

    let console = CliConsole::new(true);
    console.print_header(&task.title);
    println!("{}", task.description);
    println!();
    println!("{} {}", "Implement:".bold(), task.target_callable_name.cyan());

    println!();
    println!("{}", "Test cases:".bold());
    for case in &task.tests {
        println!("  • {}", describe_case(task, case));
    }

    if !task.starter_source.is_empty() {
        println!();
        println!("{}", "Starter source:".bold());
        println!("{}", task.starter_source.trim_end().dimmed());
    }

    Ok(())
}

/// One-line call description, e.g. `fizz_buzz(15) == "FizzBuzz"`
fn describe_case(task: &Task, case: &TestCase) -> String {
    let mut args: Vec<String> = case.positional_args.iter().map(format_value).collect();
    args.extend(
        case.keyword_args
            .iter()
            .map(|(name, value)| format!("{}={}", name, format_value(value))),
    );

    format!(
        "{}: {}({}) == {}",
        case.description,
        task.target_callable_name,
        args.join(", "),
        format_value(&case.expected_output)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_case() {
        let case = TestCase::new("fifteen", vec![json!(15)], json!("FizzBuzz"))
            .with_kwarg("strict", json!(true));
        let task = Task::new("fizz_buzz", "FizzBuzz", "", "fizz_buzz", vec![case.clone()]);

        assert_eq!(
            describe_case(&task, &case),
            "fifteen: fizz_buzz(15, strict=true) == \"FizzBuzz\""
        );
    }

    #[test]
    fn test_show_unknown_exercise() {
        let registry = TaskRegistry::builtin().unwrap();
        let error = show(&registry, "no_such_exercise").unwrap_err();
        assert!(error.to_string().contains("no_such_exercise"));
    }
}
