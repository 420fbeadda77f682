use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct ViewCommand;

#[async_trait]
impl Command for ViewCommand {
    fn name(&self) -> &str {
        "/view"
    }

    fn description(&self) -> &str {
        "open the loaded photo in the system viewer"
    }

    async fn execute(&self, _args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let image = match info.image {
            Some(image) => image,
            None => {
                eprintln!("  ✗ no photo loaded — use /image <path> first");
                return CommandResult::Handled;
            }
        };

        // Silently tolerate headless environments
        match open::that(&image.path) {
            Ok(()) => println!("  ✓ opened {}", image.path.display()),
            Err(e) => eprintln!("  ✗ could not open viewer: {e}"),
        }
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_info;

    #[test]
    fn metadata() {
        assert_eq!(ViewCommand.name(), "/view");
        assert!(!ViewCommand.description().is_empty());
    }

    #[tokio::test]
    async fn no_image_is_handled() {
        let info = test_info();
        assert!(matches!(
            ViewCommand.execute("", &info).await,
            CommandResult::Handled
        ));
    }
}
