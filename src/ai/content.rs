//! Section copy generation.
//!
//! Produces plain-text copy for one website section (hero, about, ...) in a
//! requested tone and length. The prompt is complete on its own and is not
//! wrapped in the enhanced website preamble.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::llm::CompletionRequest;

use super::{prompt, AiService, GenerationResponse, ModelChoice, DEFAULT_TEMPERATURE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSection {
    Hero,
    About,
    Services,
    Contact,
    Testimonials,
}

impl ContentSection {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentSection::Hero => "hero",
            ContentSection::About => "about",
            ContentSection::Services => "services",
            ContentSection::Contact => "contact",
            ContentSection::Testimonials => "testimonials",
        }
    }

    pub(crate) fn purpose(self) -> &'static str {
        match self {
            ContentSection::Hero => "a headline, a one-sentence subheading and a call to action",
            ContentSection::About => "the story and values of the business",
            ContentSection::Services => "the main services, one short paragraph each",
            ContentSection::Contact => "an invitation to get in touch and what happens next",
            ContentSection::Testimonials => "three short customer testimonials with first names",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTone {
    Professional,
    Friendly,
    Casual,
    Luxury,
}

impl ContentTone {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentTone::Professional => "professional",
            ContentTone::Friendly => "friendly",
            ContentTone::Casual => "casual",
            ContentTone::Luxury => "luxury",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentLength {
    Short,
    Medium,
    Long,
}

impl ContentLength {
    pub(crate) fn hint(self) -> &'static str {
        match self {
            ContentLength::Short => "short, at most 50 words",
            ContentLength::Medium => "medium, about 100 to 150 words",
            ContentLength::Long => "long, about 250 to 300 words",
        }
    }
}

/// One section-copy request. Deserializes from
/// `{"section", "businessType", "tone", "length", "model"?}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    pub section: ContentSection,
    pub business_type: String,
    pub tone: ContentTone,
    pub length: ContentLength,
    #[serde(default)]
    pub model: Option<ModelChoice>,
}

impl AiService {
    /// Generate copy for one section. `model` defaults to the step model.
    pub async fn generate_content(&self, request: &ContentRequest) -> GenerationResponse {
        let model = request.model.unwrap_or(self.step_model);
        info!(
            section = request.section.as_str(),
            tone = request.tone.as_str(),
            model = model.as_str(),
            "content generation"
        );
        let prompt = prompt::content_prompt(request);
        self.respond(model, CompletionRequest::new(prompt, DEFAULT_TEMPERATURE))
            .await
    }
}
