use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};
use crate::flows::relevance::RelevanceRequest;
use crate::spinner::Spinner;

pub struct RelevanceCommand;

#[async_trait]
impl Command for RelevanceCommand {
    fn name(&self) -> &str {
        "/relevance"
    }

    fn description(&self) -> &str {
        "check whether the loaded photo matches the selected task"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
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
        // Tasks carry no description of their own; the open exam's
        // description is the closest thing the data model has.
        let exam = match info.exam {
            Some(exam) => exam,
            None => {
                eprintln!("  ✗ no exam open — use /open <id> first");
                return CommandResult::Handled;
            }
        };
        let grader = match info.grader {
            Some(grader) => grader,
            None => {
                eprintln!("  ✗ relevance check not available");
                return CommandResult::Handled;
            }
        };

        let request = RelevanceRequest {
            image_data_uri: image.uri.to_string(),
            task_criteria: task.criteria.clone(),
            task_description: exam.description.clone(),
        };

        let spinner = Spinner::start("checking relevance");
        let result = grader.check_relevance(&request).await;
        spinner.stop().await;

        match result {
            Ok(verdict) => {
                if verdict.is_relevant {
                    println!("  ✓ relevant — {}", verdict.reason);
                } else {
                    println!("  ✗ not relevant — {}", verdict.reason);
                }
            }
            Err(e) => eprintln!("  ✗ relevance check failed: {e}"),
        }
        CommandResult::Handled
    }
}
