use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct QuitCommand;

#[async_trait]
impl Command for QuitCommand {
    fn name(&self) -> &str {
        "/quit"
    }

    fn aliases(&self) -> &[&str] {
        &["/q", "/exit"]
    }

    fn description(&self) -> &str {
        "exit the session"
    }

    async fn execute(&self, _args: &str, _info: &SessionInfo<'_>) -> CommandResult {
        CommandResult::Quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_info;

    #[test]
    fn metadata() {
        assert_eq!(QuitCommand.name(), "/quit");
        assert_eq!(QuitCommand.aliases(), &["/q", "/exit"]);
        assert!(!QuitCommand.description().is_empty());
    }

    #[tokio::test]
    async fn returns_quit() {
        assert!(matches!(
            QuitCommand.execute("", &test_info()).await,
            CommandResult::Quit
        ));
    }
}
