//! The report generator: a narrative grading report for a photo of student
//! work, judged against a task's criteria.
//!
//! The model may consult the injected [`RelevanceCheck`] capability before
//! answering. Tool rounds are bounded; a model that never produces a report
//! within the bound fails that request.

use anyhow::{Context as _, Result, bail};
use serde::{Deserialize, Serialize};

use crate::image::DataUri;
use crate::model::{Model, ModelRequest, TokenUsage};

use super::extract_json;
use super::relevance::RelevanceCheck;

/// Name the model uses to request the relevance capability.
pub const RELEVANCE_TOOL: &str = "check_relevance";

/// Upper bound on model calls per report request.
const MAX_TOOL_ROUNDS: usize = 3;

const INSTRUCTIONS: &str = r#"You are an AI grading assistant. Analyze the student's work in the attached image and generate a grading report in Russian based on the task criteria.

Consider the relevance of the image to the task criteria. If the image is not relevant, state that in the report. You may use the 'check_relevance' tool to determine whether the image is relevant to the task criteria.

You MUST respond with ONLY valid JSON in one of two shapes, no markdown fences, no extra text:

To call the relevance tool:
{"tool": "check_relevance"}

To deliver the final report:
{"report": "your detailed grading report in Russian"}

Generate a detailed report."#;

/// Input to the report generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingRequest {
    /// Photo of the student's work as a `data:<mimetype>;base64,<payload>` URI.
    pub photo_data_uri: String,
    /// Grading criteria for the specific task in the exam.
    pub task_criteria: String,
}

/// The generated narrative assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingReport {
    pub report: String,
}

/// What the model said in one round of the report flow.
#[derive(Debug, PartialEq)]
enum ReportReply {
    /// The model wants the relevance capability consulted.
    ToolCall,
    /// The final report.
    Report(String),
}

/// Generate a grading report for the photo against the task criteria.
///
/// Validates the request first: a malformed data URI or empty criteria is
/// rejected without any model call. The model may request the relevance
/// capability up to [`MAX_TOOL_ROUNDS`] - 1 times before delivering a report.
pub async fn generate_grading_report(
    model: &dyn Model,
    relevance: &dyn RelevanceCheck,
    request: &GradingRequest,
) -> Result<(GradingReport, TokenUsage)> {
    let image = DataUri::parse(&request.photo_data_uri)?;
    if request.task_criteria.trim().is_empty() {
        bail!("task criteria must not be empty");
    }

    let mut usage = TokenUsage::default();
    let mut tool_notes: Vec<String> = Vec::new();

    for _ in 0..MAX_TOOL_ROUNDS {
        let prompt = build_prompt(&request.task_criteria, &tool_notes);
        let reply = model
            .generate(&ModelRequest {
                instructions: INSTRUCTIONS.to_string(),
                prompt,
                image: image.clone(),
            })
            .await?;

        if let Some(u) = reply.usage {
            usage.add(u);
        }

        match parse_reply(&reply.text)? {
            ReportReply::ToolCall => {
                let relevant = relevance.evaluate(&image, &request.task_criteria).await?;
                tool_notes.push(format!("{RELEVANCE_TOOL} -> {relevant}"));
            }
            ReportReply::Report(report) => {
                return Ok((GradingReport { report }, usage));
            }
        }
    }

    bail!("model did not produce a report within {MAX_TOOL_ROUNDS} rounds")
}

fn build_prompt(criteria: &str, tool_notes: &[String]) -> String {
    let mut prompt = format!(
        "Task Criteria: {criteria}\n\nThe student work image is attached."
    );
    if !tool_notes.is_empty() {
        prompt.push_str("\n\nTool results:\n");
        for note in tool_notes {
            prompt.push_str(&format!("- {note}\n"));
        }
    }
    prompt
}

fn parse_reply(text: &str) -> Result<ReportReply> {
    let json = extract_json(text);
    let value: serde_json::Value = serde_json::from_str(json)
        .with_context(|| format!("report reply is not valid JSON: {text}"))?;

    // A report wins over a tool request if the model sends both
    if let Some(report) = value.get("report") {
        let report = match report.as_str() {
            Some(s) => s.to_string(),
            None => bail!("report field is not a string: {text}"),
        };
        return Ok(ReportReply::Report(report));
    }

    if let Some(tool) = value.get("tool") {
        let tool = tool.as_str().unwrap_or_default();
        if tool != RELEVANCE_TOOL {
            bail!("model requested an unknown tool: {tool}");
        }
        return Ok(ReportReply::ToolCall);
    }

    bail!("report reply is neither a report nor a tool call: {text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_report_reply() {
        let reply = parse_reply(r#"{"report": "Отличная работа."}"#).unwrap();
        assert_eq!(reply, ReportReply::Report("Отличная работа.".to_string()));
    }

    #[test]
    fn parse_tool_call_reply() {
        let reply = parse_reply(r#"{"tool": "check_relevance"}"#).unwrap();
        assert_eq!(reply, ReportReply::ToolCall);
    }

    #[test]
    fn parse_fenced_report() {
        let text = "```json\n{\"report\": \"ok\"}\n```";
        assert_eq!(parse_reply(text).unwrap(), ReportReply::Report("ok".to_string()));
    }

    #[test]
    fn report_wins_over_tool_call() {
        let reply =
            parse_reply(r#"{"tool": "check_relevance", "report": "done anyway"}"#).unwrap();
        assert_eq!(reply, ReportReply::Report("done anyway".to_string()));
    }

    #[test]
    fn parse_rejects_unknown_tool() {
        let err = parse_reply(r#"{"tool": "search_web"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown tool"));
    }

    #[test]
    fn parse_rejects_non_string_report() {
        assert!(parse_reply(r#"{"report": 42}"#).is_err());
    }

    #[test]
    fn parse_rejects_empty_object() {
        assert!(parse_reply("{}").is_err());
    }

    #[test]
    fn parse_rejects_non_json() {
        assert!(parse_reply("here is your report").is_err());
    }

    #[test]
    fn prompt_includes_criteria() {
        let prompt = build_prompt("Show all work.", &[]);
        assert!(prompt.contains("Task Criteria: Show all work."));
        assert!(!prompt.contains("Tool results"));
    }

    #[test]
    fn prompt_appends_tool_notes() {
        let notes = vec!["check_relevance -> true".to_string()];
        let prompt = build_prompt("Show all work.", &notes);
        assert!(prompt.contains("Tool results:"));
        assert!(prompt.contains("- check_relevance -> true"));
    }

    #[test]
    fn request_serializes_with_wire_field_names() {
        let request = GradingRequest {
            photo_data_uri: "data:image/png;base64,aGk=".to_string(),
            task_criteria: "Show all work.".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["photoDataUri"], "data:image/png;base64,aGk=");
        assert_eq!(json["taskCriteria"], "Show all work.");
    }
}
