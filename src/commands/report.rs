use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct ReportCommand;

#[async_trait]
impl Command for ReportCommand {
    fn name(&self) -> &str {
        "/report"
    }

    fn description(&self) -> &str {
        "show the last grading report again"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        match info.report {
            Some(report) => println!("\n{report}\n"),
            None => println!("  no report yet — run /grade"),
        }
        CommandResult::Handled
    }
}
