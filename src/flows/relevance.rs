//! The relevance checker: does a photo pertain to a task's criteria?

use anyhow::{Context as _, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::image::DataUri;
use crate::model::{Model, ModelRequest, TokenUsage};

use super::extract_json;

const INSTRUCTIONS: &str = r#"You are an AI assistant helping teachers determine the relevance of student work images to specific tasks.

Based on the student work image and the defined criteria, determine if the image is relevant to the task. Explain your reasoning.

You MUST respond with ONLY valid JSON in this exact shape, no markdown fences, no extra text:

{"isRelevant": true, "reason": "your reasoning"}

"isRelevant" is a boolean; "reason" is a non-empty string."#;

/// Input to the relevance checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceRequest {
    /// Photo of the student's work as a `data:<mimetype>;base64,<payload>` URI.
    pub image_data_uri: String,
    /// Grading criteria for the task.
    pub task_criteria: String,
    /// Description of the task assigned to the student.
    pub task_description: String,
}

/// The checker's verdict: a flag and the reasoning behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceVerdict {
    pub is_relevant: bool,
    pub reason: String,
}

/// A relevance-determination capability the report flow can consult. The
/// model decides whether to invoke it.
#[async_trait]
pub trait RelevanceCheck: Send + Sync {
    async fn evaluate(&self, image: &DataUri, criteria: &str) -> Result<bool>;
}

/// Placeholder capability that treats every image as relevant. Swap in a
/// vision-based check here when one lands.
pub struct AlwaysRelevant;

#[async_trait]
impl RelevanceCheck for AlwaysRelevant {
    async fn evaluate(&self, _image: &DataUri, _criteria: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Ask the model whether the image is relevant to the task.
///
/// Validates the request first: a malformed data URI or an empty criteria or
/// description string is rejected without any model call.
pub async fn determine_image_relevance(
    model: &dyn Model,
    request: &RelevanceRequest,
) -> Result<(RelevanceVerdict, TokenUsage)> {
    let image = DataUri::parse(&request.image_data_uri)?;
    if request.task_criteria.trim().is_empty() {
        bail!("task criteria must not be empty");
    }
    if request.task_description.trim().is_empty() {
        bail!("task description must not be empty");
    }

    let prompt = format!(
        "Task Description: {}\nTask Criteria: {}\n\nThe student work image is attached.",
        request.task_description, request.task_criteria,
    );

    let reply = model
        .generate(&ModelRequest {
            instructions: INSTRUCTIONS.to_string(),
            prompt,
            image,
        })
        .await?;

    let verdict = parse_verdict(&reply.text)?;
    Ok((verdict, reply.usage.unwrap_or_default()))
}

fn parse_verdict(text: &str) -> Result<RelevanceVerdict> {
    let json = extract_json(text);
    let verdict: RelevanceVerdict = serde_json::from_str(json)
        .with_context(|| format!("relevance reply does not match the expected shape: {text}"))?;

    if verdict.reason.trim().is_empty() {
        bail!("relevance reply has an empty reason");
    }

    Ok(verdict)
}
