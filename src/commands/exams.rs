use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct ExamsCommand;

#[async_trait]
impl Command for ExamsCommand {
    fn name(&self) -> &str {
        "/exams"
    }

    fn description(&self) -> &str {
        "list all exams"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let exams = match info.roster.list().await {
            Ok(exams) => exams,
            Err(e) => {
                eprintln!("  ✗ failed to list exams: {e}");
                return CommandResult::Handled;
            }
        };

        if exams.is_empty() {
            println!("  no exams yet — create one with /new-exam");
            return CommandResult::Handled;
        }

        for exam in &exams {
            let marker = if info.exam.map(|e| e.id.as_str()) == Some(exam.id.as_str()) {
                " ← open"
            } else {
                ""
            };
            println!(
                "  [{}] {} — {} ({} task{}){}",
                exam.id,
                exam.name,
                exam.description,
                exam.tasks.len(),
                if exam.tasks.len() == 1 { "" } else { "s" },
                marker,
            );
        }
        println!("\n  open one with /open <id>");
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_info;

    #[test]
    fn metadata() {
        assert_eq!(ExamsCommand.name(), "/exams");
        assert!(ExamsCommand.aliases().is_empty());
        assert!(!ExamsCommand.description().is_empty());
    }

    #[tokio::test]
    async fn lists_seeded_exams() {
        let info = test_info();
        assert!(matches!(
            ExamsCommand.execute("", &info).await,
            CommandResult::Handled
        ));
    }
}
