use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo, split_double_dash};
use crate::roster::Task;

pub struct NewTaskCommand;

#[async_trait]
impl Command for NewTaskCommand {
    fn name(&self) -> &str {
        "/new-task"
    }

    fn description(&self) -> &str {
        "add a task to the open exam: /new-task <name> -- <criteria>"
    }

    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let exam = match info.exam {
            Some(exam) => exam,
            None => {
                eprintln!("  ✗ no exam open — use /open <id> first");
                return CommandResult::Handled;
            }
        };

        let (name, criteria) = split_double_dash(args);
        if name.is_empty() || criteria.is_empty() {
            // Criteria feed the grading flows, so an empty string is refused here
            eprintln!("  ✗ usage: /new-task <name> -- <criteria>");
            return CommandResult::Handled;
        }

        let task = Task::new(&name, &criteria);
        let id = task.id.clone();
        match info.roster.add_task(&exam.id, task).await {
            Ok(()) => {
                println!("  ✓ added {name} [{id}] to {} — select it with /task {id}", exam.name);
            }
            Err(e) => eprintln!("  ✗ failed to add task: {e}"),
        }
        CommandResult::Handled
    }
}
