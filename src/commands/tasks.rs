use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct TasksCommand;

#[async_trait]
impl Command for TasksCommand {
    fn name(&self) -> &str {
        "/tasks"
    }

    fn description(&self) -> &str {
        "list tasks in the open exam"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let exam = match info.exam {
            Some(exam) => exam,
            None => {
                eprintln!("  ✗ no exam open — use /open <id> first");
                return CommandResult::Handled;
            }
        };

        if exam.tasks.is_empty() {
            println!("  no tasks yet — add one with /new-task");
            return CommandResult::Handled;
        }

        for task in &exam.tasks {
            let marker = if info.task.map(|t| t.id.as_str()) == Some(task.id.as_str()) {
                " ← selected"
            } else {
                ""
            };
            println!("  [{}] {} — {}{}", task.id, task.name, task.criteria, marker);
        }
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_info;
    use crate::roster::Exam;

    #[test]
    fn metadata() {
        assert_eq!(TasksCommand.name(), "/tasks");
        assert!(!TasksCommand.description().is_empty());
    }

    #[tokio::test]
    async fn no_open_exam_is_handled() {
        let info = test_info();
        assert!(matches!(
            TasksCommand.execute("", &info).await,
            CommandResult::Handled
        ));
    }

    #[tokio::test]
    async fn lists_tasks_of_open_exam() {
        let exam: &'static Exam =
            Box::leak(Box::new(Exam::new("Quiz", "Weekly biology quiz")));
        let info = SessionInfo {
            exam: Some(exam),
            ..test_info()
        };
        assert!(matches!(
            TasksCommand.execute("", &info).await,
            CommandResult::Handled
        ));
    }
}
