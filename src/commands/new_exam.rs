use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo, split_double_dash};
use crate::roster::Exam;

pub struct NewExamCommand;

#[async_trait]
impl Command for NewExamCommand {
    fn name(&self) -> &str {
        "/new-exam"
    }

    fn description(&self) -> &str {
        "create an exam: /new-exam <name> -- <description>"
    }

    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let (name, description) = split_double_dash(args);
        if name.is_empty() {
            eprintln!("  ✗ usage: /new-exam <name> -- <description>");
            return CommandResult::Handled;
        }

        let exam = Exam::new(&name, &description);
        let id = exam.id.clone();
        match info.roster.create_exam(exam).await {
            Ok(()) => {
                println!("  ✓ created exam {name} [{id}] — open it with /open {id}");
            }
            Err(e) => eprintln!("  ✗ failed to create exam: {e}"),
        }
        CommandResult::Handled
    }
}
