use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo, StateChange};
use crate::flows::report::GradingRequest;
use crate::spinner::Spinner;

pub struct GradeCommand;

#[async_trait]
impl Command for GradeCommand {
    fn name(&self) -> &str {
        "/grade"
    }

    fn description(&self) -> &str {
        "generate a grading report for the loaded photo"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        // Client-side checks first: no model call happens unless both an
        // image and a task are present.
        let image = match info.image {
            Some(image) => image,
            None => {
                eprintln!("  ✗ please upload an image first (/image <path>)");
                return CommandResult::Handled;
            }
        };
        let task = match info.task {
            Some(task) => task,
            None => {
                eprintln!("  ✗ please select a task first (/task <id>)");
                return CommandResult::Handled;
            }
        };
        let grader = match info.grader {
            Some(grader) => grader,
            None => {
                eprintln!("  ✗ grading not available");
                return CommandResult::Handled;
            }
        };

        let request = GradingRequest {
            photo_data_uri: image.uri.to_string(),
            task_criteria: task.criteria.clone(),
        };

        let spinner = Spinner::start("grading");
        let result = grader.grade(&request).await;
        spinner.stop().await;

        match result {
            Ok(report) => {
                println!("\n{}\n", report.report);
                println!("  ✓ grading report generated");
                CommandResult::StateChanged(StateChange::Report(report.report))
            }
            Err(e) => {
                // Previous report stays on display
                eprintln!("  ✗ failed to generate grading report: {e}");
                CommandResult::Handled
            }
        }
    }
}
