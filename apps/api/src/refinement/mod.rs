//! Abstract refinement: forwards an abstract to the LLM and returns a
//! refined version plus suggestions.
//!
//! `AppState` holds an `Arc<dyn AbstractRefiner>`. `LlmAbstractRefiner` is
//! used when an API key is configured, `UnconfiguredRefiner` otherwise.

pub mod handlers;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::refinement::prompts::{build_refinement_prompt, REFINEMENT_SYSTEM};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementRequest {
    pub abstract_text: String,
    pub ideathon_category: String,
    pub current_environmental_trends: String,
    pub successful_submission_examples: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementOutput {
    pub refined_abstract: String,
    pub suggestions: Vec<String>,
}

impl RefinementRequest {
    /// Returns every failed input rule, in field order.
    pub fn validate(&self) -> Result<(), Vec<&'static str>> {
        let mut problems = Vec::new();
        if self.abstract_text.trim().chars().count() < 10 {
            problems.push("Abstract text is too short.");
        }
        if self.ideathon_category.trim().is_empty() {
            problems.push("Ideathon category is required.");
        }
        if self.current_environmental_trends.trim().chars().count() < 10 {
            problems.push("Environmental trends description is too short.");
        }
        if self.successful_submission_examples.trim().chars().count() < 10 {
            problems.push("Submission examples are too short.");
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

#[async_trait]
pub trait AbstractRefiner: Send + Sync {
    async fn refine(&self, request: &RefinementRequest) -> Result<RefinementOutput, AppError>;
}

pub struct LlmAbstractRefiner(pub LlmClient);

#[async_trait]
impl AbstractRefiner for LlmAbstractRefiner {
    async fn refine(&self, request: &RefinementRequest) -> Result<RefinementOutput, AppError> {
        let prompt = build_refinement_prompt(request);
        let output: RefinementOutput = self
            .0
            .call_json(&prompt, REFINEMENT_SYSTEM)
            .await
            .map_err(|e| AppError::ExternalService(format!("Abstract refinement failed: {e}")))?;
        check_output(output)
    }
}

/// Stands in when no API key is configured.
pub struct UnconfiguredRefiner;

#[async_trait]
impl AbstractRefiner for UnconfiguredRefiner {
    async fn refine(&self, _request: &RefinementRequest) -> Result<RefinementOutput, AppError> {
        Err(AppError::ExternalService(
            "ANTHROPIC_API_KEY is not configured".to_string(),
        ))
    }
}

/// A blank refined abstract counts as malformed output; blank suggestions are dropped.
fn check_output(mut output: RefinementOutput) -> Result<RefinementOutput, AppError> {
    if output.refined_abstract.trim().is_empty() {
        return Err(AppError::ExternalService(
            "Abstract refinement returned an empty abstract".to_string(),
        ));
    }
    output.suggestions.retain(|s| !s.trim().is_empty());
    Ok(output)
}
