use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo, StateChange};

pub struct OpenCommand;

#[async_trait]
impl Command for OpenCommand {
    fn name(&self) -> &str {
        "/open"
    }

    fn description(&self) -> &str {
        "open an exam: /open <id>"
    }

    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult {
        if args.is_empty() {
            eprintln!("  ✗ usage: /open <exam-id>");
            return CommandResult::Handled;
        }

        let exam = match info.roster.get(args).await {
            Ok(Some(exam)) => exam,
            Ok(None) => {
                eprintln!("  ✗ unknown exam: {args} (see /exams)");
                return CommandResult::Handled;
            }
            Err(e) => {
                eprintln!("  ✗ failed to open exam: {e}");
                return CommandResult::Handled;
            }
        };

        println!("  {} — {}", exam.name, exam.description);
        if exam.tasks.is_empty() {
            println!("  no tasks yet — add one with /new-task");
        } else {
            for task in &exam.tasks {
                println!("  [{}] {} — {}", task.id, task.name, task.criteria);
            }
            println!("\n  select a task with /task <id>");
        }

        CommandResult::StateChanged(StateChange::OpenExam(exam.id))
    }
}
