// Abstract refinement prompt templates.

use crate::catalog::Category;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::refinement::RefinementRequest;

pub const REFINEMENT_SYSTEM: &str = JSON_ONLY_SYSTEM;

pub const REFINEMENT_PROMPT: &str = r#"You are an AI assistant that helps refine abstracts for the EcoInvent Ideathon.

Based on the provided abstract text, ideathon category, current environmental trends, and examples of successful submissions, provide a refined version of the abstract and specific suggestions for improvement.

Abstract Text: {abstract_text}
Ideathon Category: {category}
Category Focus: {category_description}
Current Environmental Trends: {trends}
Successful Submission Examples: {examples}

OUTPUT SCHEMA (return exactly this structure):
{
  "refinedAbstract": "A refined version of the abstract incorporating the suggestions.",
  "suggestions": ["A specific, actionable suggestion for improving the abstract."]
}

RULES:
1. Keep the author's core idea; do not invent results or data.
2. Every suggestion must be actionable.
3. Return ONLY the JSON object, nothing else, no code fences."#;

pub fn build_refinement_prompt(request: &RefinementRequest) -> String {
    let category = Category::from_name(&request.ideathon_category);
    let description = match category.description() {
        "" => "Not part of the published category list.",
        text => text,
    };
    fill_template(
        REFINEMENT_PROMPT,
        &[
            ("{abstract_text}", request.abstract_text.trim()),
            ("{category}", category.name()),
            ("{category_description}", description),
            ("{trends}", request.current_environmental_trends.trim()),
            ("{examples}", request.successful_submission_examples.trim()),
        ],
    )
}

/// Substitutes placeholders in a single left-to-right pass over the template.
/// Inserted values are never scanned again.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
