//! Farming advice from a generative model, with fixed replies when the model
//! is not configured or unreachable.

use serde::{Deserialize, Serialize};

use crate::domain::season::{Season, COMMON_CROPS, MAJOR_REGIONS};

pub const APOLOGY_MESSAGE: &str = "I'm experiencing some technical difficulties. Please try again later or contact support if the issue persists.";

/// Reply used when no advisory credential is configured. Lists what the
/// dashboard can do without the model and echoes the farmer's query.
pub fn capability_message(query: &str) -> String {
    format!(
        "I'm ready to help with your farming queries! Please configure the advisory API key to enable AI-powered responses.

In the meantime, I can help you with:
- Current mandi prices from Agmarknet
- Soil health analysis and recommendations
- Market trends and crop forecasts
- Community connections and events
- GPS tracking for logistics

Your query: \"{query}\"

Once the API key is added, I'll provide detailed, personalized responses based on real-time agricultural data."
    )
}

/// Wrap a farmer's query with the agricultural context sent to the model.
pub fn advisory_prompt(query: &str, season: Season) -> String {
    format!(
        "You are an expert agricultural advisor helping Indian farmers.
Please provide practical, actionable advice for this farming query: {query}

Current season: {season}
Common crops: {crops}
Major growing regions: {regions}

Consider factors like:
- Indian farming conditions and practices
- Seasonal variations and climate
- Local market conditions
- Sustainable farming methods
- Cost-effective solutions

Keep your response practical and easy to understand.",
        season = season.label(),
        crops = COMMON_CROPS.join(", "),
        regions = MAJOR_REGIONS.join(", "),
    )
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest {
    pub contents: Vec<ContentDto>,
}

impl GenerateRequest {
    pub fn single_turn(prompt: String) -> Self {
        Self {
            contents: vec![ContentDto {
                parts: vec![PartDto { text: Some(prompt) }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ContentDto {
    #[serde(default)]
    pub parts: Vec<PartDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PartDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<CandidateDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateDto {
    #[serde(default)]
    pub content: Option<ContentDto>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts joined. `None` when the model
    /// returned nothing usable.
    pub fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn capability_message_echoes_query() {
        let message = capability_message("When to sow wheat?");
        assert!(message.contains("Your query: \"When to sow wheat?\""));
        assert!(message.contains("mandi prices"));
    }

    #[test]
    fn prompt_carries_season_and_query() {
        let prompt = advisory_prompt("pest control for cotton", Season::Kharif);
        assert!(prompt.contains("pest control for cotton"));
        assert!(prompt.contains("Monsoon/Kharif"));
        assert!(prompt.contains("sugarcane"));
    }

    #[test]
    fn request_body_matches_generate_content_shape() {
        let body = serde_json::to_value(GenerateRequest::single_turn("hi".into()))
            .expect("serialize request");
        assert_eq!(body, json!({ "contents": [{ "parts": [{ "text": "hi" }] }] }));
    }

    #[test]
    fn response_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Sow " }, { "text": "in November." }] } }]
        }))
        .expect("decode response");
        assert_eq!(response.into_text().as_deref(), Some("Sow in November."));
    }

    #[test]
    fn empty_candidates_have_no_text() {
        let response: GenerateResponse =
            serde_json::from_value(json!({ "candidates": [] })).expect("decode response");
        assert_eq!(response.into_text(), None);
    }
}
