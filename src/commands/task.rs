use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo, StateChange};

pub struct TaskCommand;

#[async_trait]
impl Command for TaskCommand {
    fn name(&self) -> &str {
        "/task"
    }

    fn description(&self) -> &str {
        "select a task: /task <id>"
    }

    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let exam = match info.exam {
            Some(exam) => exam,
            None => {
                eprintln!("  ✗ no exam open — use /open <id> first");
                return CommandResult::Handled;
            }
        };

        if args.is_empty() {
            eprintln!("  ✗ usage: /task <task-id>");
            return CommandResult::Handled;
        }

        match exam.task(args) {
            Some(task) => {
                println!("  ✓ selected {} — {}", task.name, task.criteria);
                CommandResult::StateChanged(StateChange::SelectTask(task.clone()))
            }
            None => {
                eprintln!("  ✗ no task {args} in {} (see /tasks)", exam.name);
                CommandResult::Handled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_info;
    use crate::roster::{Exam, Task};

    fn open_exam() -> &'static Exam {
        let mut exam = Exam::new("Quiz", "Weekly quiz");
        exam.tasks.push(Task {
            id: "t1".to_string(),
            name: "Q1".to_string(),
            criteria: "Explain osmosis".to_string(),
        });
        Box::leak(Box::new(exam))
    }

    #[test]
    fn metadata() {
        assert_eq!(TaskCommand.name(), "/task");
        assert!(!TaskCommand.description().is_empty());
    }

    #[tokio::test]
    async fn selects_existing_task() {
        let info = SessionInfo {
            exam: Some(open_exam()),
            ..test_info()
        };
        match TaskCommand.execute("t1", &info).await {
            CommandResult::StateChanged(StateChange::SelectTask(task)) => {
                assert_eq!(task.name, "Q1");
                assert_eq!(task.criteria, "Explain osmosis");
            }
            _ => panic!("expected SelectTask"),
        }
    }

    #[tokio::test]
    async fn unknown_task_is_handled() {
        let info = SessionInfo {
            exam: Some(open_exam()),
            ..test_info()
        };
        assert!(matches!(
            TaskCommand.execute("nope", &info).await,
            CommandResult::Handled
        ));
    }

    #[tokio::test]
    async fn requires_open_exam() {
        let info = test_info();
        assert!(matches!(
            TaskCommand.execute("t1", &info).await,
            CommandResult::Handled
        ));
    }
}
