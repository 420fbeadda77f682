//! The two grading flows and the `Grader` that wires them to a model.
//!
//! Both flows validate their input before any model call, delegate the
//! reasoning to the model with a fixed instruction template, and parse the
//! reply against a declared output shape. A reply that does not conform is a
//! schema violation for that single request; nothing is retried.

pub mod relevance;
pub mod report;

use std::sync::Mutex;

use anyhow::Result;

use crate::model::{Model, TokenUsage};

use relevance::{AlwaysRelevant, RelevanceCheck, RelevanceRequest, RelevanceVerdict};
use report::{GradingReport, GradingRequest};

/// Bundles a model with the relevance capability injected into the report
/// flow, and accumulates token usage across the session.
pub struct Grader {
    model: Box<dyn Model>,
    relevance: Box<dyn RelevanceCheck>,
    usage: Mutex<TokenUsage>,
}

impl Grader {
    pub fn new(model: Box<dyn Model>, relevance: Box<dyn RelevanceCheck>) -> Self {
        Self {
            model,
            relevance,
            usage: Mutex::new(TokenUsage::default()),
        }
    }

    /// A grader with the stub relevance check the report flow ships with.
    pub fn with_stub_relevance(model: Box<dyn Model>) -> Self {
        Self::new(model, Box::new(AlwaysRelevant))
    }

    /// Generate a grading report for a photo against task criteria.
    pub async fn grade(&self, request: &GradingRequest) -> Result<GradingReport> {
        let (report, usage) =
            report::generate_grading_report(self.model.as_ref(), self.relevance.as_ref(), request)
                .await?;
        self.usage.lock().unwrap().add(usage);
        Ok(report)
    }

    /// Determine whether a photo is relevant to a task.
    pub async fn check_relevance(&self, request: &RelevanceRequest) -> Result<RelevanceVerdict> {
        let (verdict, usage) =
            relevance::determine_image_relevance(self.model.as_ref(), request).await?;
        self.usage.lock().unwrap().add(usage);
        Ok(verdict)
    }

    pub fn session_usage(&self) -> TokenUsage {
        *self.usage.lock().unwrap()
    }
}

/// Extract JSON from text that may be wrapped in markdown code fences.
pub(crate) fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(after) = trimmed.strip_prefix("```json")
        && let Some(json) = after.strip_suffix("```")
    {
        return json.trim();
    }
    if let Some(after) = trimmed.strip_prefix("```")
        && let Some(json) = after.strip_suffix("```")
    {
        return json.trim();
    }

    trimmed
}
