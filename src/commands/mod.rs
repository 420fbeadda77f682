//! Built-in REPL commands prefixed with `/`.
//!
//! Commands implement the [`Command`] trait and are registered in a
//! [`CommandRegistry`]. The registry handles dispatch, alias resolution,
//! and dynamic help generation. Commands that change session state return
//! a [`StateChange`] the REPL applies after the command runs.

mod exams;
mod grade;
mod help;
mod image;
mod new_exam;
mod new_task;
mod open;
mod quit;
mod relevance;
mod report;
mod status;
mod task;
mod tasks;
mod tokens;
mod view;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::flows::Grader;
use crate::image::DataUri;
use crate::model::TokenUsage;
use crate::roster::{Exam, ExamStore, Task};

/// A photo loaded into the session, with the path it came from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub uri: DataUri,
    pub path: PathBuf,
}

/// Session info available to commands during execution.
pub struct SessionInfo<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    pub auth_status: &'a str,
    pub roster: &'a dyn ExamStore,
    /// Snapshot of the currently open exam, fetched fresh each turn.
    pub exam: Option<&'a Exam>,
    pub task: Option<&'a Task>,
    pub image: Option<&'a LoadedImage>,
    /// The last successfully generated report.
    pub report: Option<&'a str>,
    pub usage: TokenUsage,
    /// Grader reference for commands that call the model.
    pub grader: Option<&'a Grader>,
}

/// A state change the REPL needs to apply after a command runs.
#[derive(Debug, Clone)]
pub enum StateChange {
    /// An exam was opened (carries the exam id).
    OpenExam(String),
    /// A task was selected.
    SelectTask(Task),
    /// A photo was loaded.
    Image(LoadedImage),
    /// A report was generated and replaces the displayed one.
    Report(String),
}

/// What the REPL should do after a command runs.
pub enum CommandResult {
    /// Not a command.
    NotACommand,
    /// Command handled, continue the REPL loop.
    Handled,
    /// Command produced a state change the REPL must apply.
    StateChanged(StateChange),
    /// Exit the REPL.
    Quit,
}

/// A REPL command. Implement this trait to add new commands.
#[async_trait]
pub trait Command: Send + Sync {
    /// Primary name, e.g. `"/grade"`.
    fn name(&self) -> &str;

    /// Alternative names, e.g. `&["/h", "/?"]`.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// One-line description for `/help`.
    fn description(&self) -> &str;

    /// Run the command. `args` is everything after the command word.
    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult;
}

/// Holds registered commands. Supports runtime registration for plugins.
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create a registry with all built-in commands.
    pub fn new() -> Self {
        let commands: Vec<Arc<dyn Command>> = vec![
            Arc::new(help::HelpCommand),
            Arc::new(exams::ExamsCommand),
            Arc::new(open::OpenCommand),
            Arc::new(tasks::TasksCommand),
            Arc::new(task::TaskCommand),
            Arc::new(new_exam::NewExamCommand),
            Arc::new(new_task::NewTaskCommand),
            Arc::new(image::ImageCommand),
            Arc::new(view::ViewCommand),
            Arc::new(grade::GradeCommand),
            Arc::new(relevance::RelevanceCommand),
            Arc::new(report::ReportCommand),
            Arc::new(status::StatusCommand),
            Arc::new(tokens::TokensCommand),
            Arc::new(quit::QuitCommand),
        ];
        Self { commands }
    }

    /// Register an additional command (e.g. from a plugin).
    pub fn register(&mut self, command: Arc<dyn Command>) {
        self.commands.push(command);
    }

    /// Dispatch input to a matching command, or return `NotACommand`.
    pub async fn dispatch(&self, input: &str, info: &SessionInfo<'_>) -> CommandResult {
        let input = input.trim();
        let (head, args) = match input.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (input, ""),
        };

        for command in &self.commands {
            if head == command.name() || command.aliases().contains(&head) {
                // /help is special — it needs the registry to list all commands
                if command.name() == "/help" {
                    print!("{}", self.help_text());
                    return CommandResult::Handled;
                }
                return command.execute(args, info).await;
            }
        }

        if head.starts_with('/') {
            println!("unknown command: {head}");
            println!("type /help for available commands");
            return CommandResult::Handled;
        }

        CommandResult::NotACommand
    }

    /// Generate help text from all registered commands.
    pub fn help_text(&self) -> String {
        let entries: Vec<(String, &str)> = self
            .commands
            .iter()
            .map(|c| (format_label(c.name(), c.aliases()), c.description()))
            .collect();

        let max_width = entries
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(10);

        let mut out = String::new();
        for (label, desc) in &entries {
            out.push_str(&format!("  {label:<max_width$}  {desc}\n"));
        }
        out
    }

    /// All registered command names (for testing).
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// All registered names and aliases (for duplicate detection).
    pub fn all_triggers(&self) -> Vec<&str> {
        let mut triggers = Vec::new();
        for cmd in &self.commands {
            triggers.push(cmd.name());
            triggers.extend_from_slice(cmd.aliases());
        }
        triggers
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn format_label(name: &str, aliases: &[&str]) -> String {
    if aliases.is_empty() {
        name.to_string()
    } else {
        format!("{} ({})", name, aliases.join(", "))
    }
}

/// Split `"name -- rest"` argument syntax used by the creation commands.
fn split_double_dash(args: &str) -> (String, String) {
    match args.split_once(" -- ") {
        Some((left, right)) => (left.trim().to_string(), right.trim().to_string()),
        None => (args.trim().to_string(), String::new()),
    }
}
