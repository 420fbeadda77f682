use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct StatusCommand;

#[async_trait]
impl Command for StatusCommand {
    fn name(&self) -> &str {
        "/status"
    }

    fn description(&self) -> &str {
        "show provider, auth, and session selections"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        println!("  provider  {} ({})", info.provider, info.model);
        println!("  auth      {}", info.auth_status);

        match info.exam {
            Some(exam) => println!("  exam      {} — {}", exam.name, exam.description),
            None => println!("  exam      none open"),
        }
        match info.task {
            Some(task) => println!("  task      {} — {}", task.name, task.criteria),
            None => println!("  task      none selected"),
        }
        match info.image {
            Some(image) => println!(
                "  photo     {} ({}, {} bytes)",
                image.path.display(),
                image.uri.mime(),
                image.uri.byte_len(),
            ),
            None => println!("  photo     none loaded"),
        }
        println!(
            "  report    {}",
            if info.report.is_some() {
                "available (/report)"
            } else {
                "none yet"
            }
        );
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_info;

    #[test]
    fn metadata() {
        assert_eq!(StatusCommand.name(), "/status");
        assert!(!StatusCommand.description().is_empty());
    }

    #[tokio::test]
    async fn empty_session_is_handled() {
        let info = test_info();
        assert!(matches!(
            StatusCommand.execute("", &info).await,
            CommandResult::Handled
        ));
    }
}
