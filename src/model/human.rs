use anyhow::Result;
use async_trait::async_trait;
use std::io::{self, Write};

use super::{Model, ModelReply, ModelRequest};

/// You are the grader. Read the request at the terminal and type the JSON
/// reply yourself. Useful offline and for demos.
pub struct HumanModel;

impl HumanModel {
    fn print_request(request: &ModelRequest) {
        println!("\n{}", "=".repeat(60));
        println!("Instructions:\n{}", request.instructions);
        println!("{}", "-".repeat(60));
        println!("Prompt:\n{}", request.prompt);
        println!("{}", "-".repeat(60));
        println!(
            "Image: {} ({} bytes)",
            request.image.mime(),
            request.image.byte_len()
        );
        println!("{}", "=".repeat(60));
    }

    fn read_line(prompt: &str) -> Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }
}

#[async_trait]
impl Model for HumanModel {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply> {
        Self::print_request(request);
        let text = Self::read_line("\nJSON reply: ")?;
        Ok(ModelReply { text, usage: None })
    }
}
