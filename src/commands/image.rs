use std::path::PathBuf;

use async_trait::async_trait;

use super::{Command, CommandResult, LoadedImage, SessionInfo, StateChange};
use crate::image::DataUri;

pub struct ImageCommand;

#[async_trait]
impl Command for ImageCommand {
    fn name(&self) -> &str {
        "/image"
    }

    fn description(&self) -> &str {
        "load a photo of student work: /image <path>"
    }

    async fn execute(&self, args: &str, _info: &SessionInfo<'_>) -> CommandResult {
        if args.is_empty() {
            eprintln!("  ✗ usage: /image <path>");
            return CommandResult::Handled;
        }

        let path = PathBuf::from(args);
        let uri = match DataUri::from_file(&path) {
            Ok(uri) => uri,
            Err(e) => {
                eprintln!("  ✗ failed to load image: {e}");
                return CommandResult::Handled;
            }
        };

        if !uri.is_image() {
            eprintln!("  ✗ {} is not an image file", path.display());
            return CommandResult::Handled;
        }

        println!(
            "  ✓ loaded {} ({}, {} bytes)",
            path.display(),
            uri.mime(),
            uri.byte_len(),
        );
        CommandResult::StateChanged(StateChange::Image(LoadedImage { uri, path }))
    }
}
