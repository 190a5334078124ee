//! Website generation pipeline.
//!
//! ```text
//! description ─▶ business analysis ─▶ design specs ─▶ website code ─▶ HTML
//!       │               │                  │               │
//!       └───────────────┴──── any failure ─┴───────────────┘
//!                                  ▼
//!                        direct website prompt (once)
//! ```
//!
//! A run issues at most four provider calls. The direct prompt is only sent
//! after a chain step failed (or when `direct_only` is set), and its result
//! is returned as-is, successful or not.

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::extract::{extract_json_from_markdown, strip_code_fences};
use super::schema::{BusinessAnalysis, DesignSpecs};
use super::{AiService, GenerationResponse};

/// Which route produced the final HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationPath {
    Chain,
    Direct,
}

impl GenerationPath {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationPath::Chain => "chain",
            GenerationPath::Direct => "direct",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub response: GenerationResponse,
    pub path: GenerationPath,
    /// Why the chain was abandoned. `None` when the chain succeeded or was
    /// skipped on request.
    pub fallback_reason: Option<String>,
}

/// Runs the three-step chain with a single direct fallback.
#[derive(Debug, Clone)]
pub struct WebsiteGenerator {
    service: AiService,
    direct_only: bool,
}

impl WebsiteGenerator {
    pub fn new(service: AiService) -> Self {
        Self { service, direct_only: false }
    }

    /// Skip the chain and send the direct prompt straight away.
    pub fn direct_only(mut self, direct_only: bool) -> Self {
        self.direct_only = direct_only;
        self
    }

    pub async fn generate(&self, user_prompt: &str) -> GenerationOutcome {
        let run_id = Uuid::new_v4();
        info!(
            %run_id,
            model = self.service.step_model().as_str(),
            direct_only = self.direct_only,
            prompt_len = user_prompt.len(),
            "website generation started"
        );

        if self.direct_only {
            let response = self.direct(run_id, user_prompt).await;
            return GenerationOutcome { response, path: GenerationPath::Direct, fallback_reason: None };
        }

        match self.run_chain(run_id, user_prompt).await {
            Ok(response) => {
                info!(%run_id, model = %response.model, "chain generation succeeded");
                GenerationOutcome { response: finish(response), path: GenerationPath::Chain, fallback_reason: None }
            }
            Err(reason) => {
                warn!(%run_id, %reason, "chain generation failed, falling back to direct generation");
                let response = self.direct(run_id, user_prompt).await;
                GenerationOutcome {
                    response,
                    path: GenerationPath::Direct,
                    fallback_reason: Some(reason),
                }
            }
        }
    }

    /// Steps 1 to 3. `Err` carries a human-readable reason for the fallback.
    async fn run_chain(&self, run_id: Uuid, user_prompt: &str) -> Result<GenerationResponse, String> {
        let raw = step_ok("business analysis", self.service.generate_business_analysis(user_prompt).await)?;
        let analysis = extract_json_from_markdown(&raw.content)
            .and_then(BusinessAnalysis::try_from)
            .map_err(|e| format!("business analysis: {e}"))?;
        debug!(
            %run_id,
            business_type = ?analysis.business_type(),
            industry = ?analysis.industry(),
            audience = ?analysis.target_audience(),
            services = ?analysis.key_services(),
            pages = ?analysis.essential_pages(),
            style = ?analysis.design_style(),
            "business analysis parsed"
        );

        let raw = step_ok("design specs", self.service.generate_design_specs(&analysis).await)?;
        let design = extract_json_from_markdown(&raw.content)
            .and_then(DesignSpecs::try_from)
            .map_err(|e| format!("design specs: {e}"))?;
        debug!(
            %run_id,
            primary = ?design.primary_colors(),
            heading_font = ?design.heading_font(),
            body_font = ?design.body_font(),
            layout = ?design.layout_style(),
            "design specs parsed"
        );

        step_ok("website code", self.service.generate_website_code(&analysis, &design).await)
    }

    async fn direct(&self, run_id: Uuid, user_prompt: &str) -> GenerationResponse {
        let response = self.service.generate_direct_website(user_prompt).await;
        if response.success {
            info!(%run_id, model = %response.model, "direct generation succeeded");
            finish(response)
        } else {
            warn!(%run_id, error = ?response.error, "direct generation failed");
            response
        }
    }
}

fn step_ok(step: &str, response: GenerationResponse) -> Result<GenerationResponse, String> {
    if response.success {
        Ok(response)
    } else {
        let error = response.error.as_deref().unwrap_or("unknown error");
        Err(format!("{step}: {error}"))
    }
}

fn finish(mut response: GenerationResponse) -> GenerationResponse {
    response.content = strip_code_fences(&response.content);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::dummy::DummyProvider;
    use crate::llm::{LlmProvider, ProviderError};

    const ANALYSIS: &str = "```json\n{\"businessType\": \"Bakery\", \"industry\": \"Food\"}\n```";
    const DESIGN: &str = "{\"layout\": {\"style\": \"grid\"}}";
    const HTML: &str = "```html\n<!DOCTYPE html><html></html>\n```";

    fn generator(replies: Vec<Result<String, ProviderError>>) -> (DummyProvider, WebsiteGenerator) {
        let p = DummyProvider::scripted(replies);
        let svc = AiService::with_providers(Some(LlmProvider::Dummy(p.clone())), None);
        (p, WebsiteGenerator::new(svc))
    }

    fn ok(s: &str) -> Result<String, ProviderError> {
        Ok(s.to_string())
    }

    #[tokio::test]
    async fn chain_happy_path_makes_three_calls() {
        let (p, g) = generator(vec![ok(ANALYSIS), ok(DESIGN), ok(HTML)]);
        let out = g.generate("A bakery in Bath").await;

        assert_eq!(out.path, GenerationPath::Chain);
        assert!(out.response.success);
        assert_eq!(out.response.content, "<!DOCTYPE html><html></html>");
        assert_eq!(out.fallback_reason, None);
        assert_eq!(p.call_count(), 3);

        let seen = p.requests();
        assert!(seen[1].prompt.contains("\"businessType\": \"Bakery\""));
        assert!(seen[2].prompt.contains("\"style\": \"grid\""));
    }

    #[tokio::test]
    async fn analysis_failure_falls_back() {
        let (p, g) = generator(vec![Err(ProviderError::Request("HTTP 500".into())), ok(HTML)]);
        let out = g.generate("A bakery").await;

        assert_eq!(out.path, GenerationPath::Direct);
        assert!(out.response.success);
        assert!(out.fallback_reason.unwrap().starts_with("business analysis:"));
        assert_eq!(p.call_count(), 2);
        assert!(p.requests()[1].prompt.contains("based on this description: \"A bakery\""));
    }

    #[tokio::test]
    async fn unparsable_analysis_falls_back() {
        let (p, g) = generator(vec![ok("I cannot produce JSON today."), ok("<html></html>")]);
        let out = g.generate("A bakery").await;

        assert_eq!(out.path, GenerationPath::Direct);
        assert_eq!(out.response.content, "<html></html>");
        assert!(out.fallback_reason.unwrap().contains("no JSON object"));
        assert_eq!(p.call_count(), 2);
    }

    #[tokio::test]
    async fn truncated_analysis_falls_back_to_direct() {
        let cut_off = r#"{"businessType":"Bakery","websiteRequirements":{"essentialPages":["Home"],"designStyle":"Warm"},"keyServices":["Bre"#;
        let (p, g) = generator(vec![ok(cut_off), ok("<html>direct</html>")]);
        let out = g.generate("A bakery").await;

        assert_eq!(out.path, GenerationPath::Direct);
        assert_eq!(out.response.content, "<html>direct</html>");
        assert!(out.fallback_reason.unwrap().starts_with("business analysis:"));
        assert_eq!(p.call_count(), 2);
        assert!(!p.requests()[1].prompt.contains("Based on this business analysis"));
    }

    #[tokio::test]
    async fn design_failure_falls_back() {
        let (p, g) = generator(vec![ok(ANALYSIS), ok("[1, 2, 3]"), ok("<html></html>")]);
        let out = g.generate("A bakery").await;
        assert_eq!(out.path, GenerationPath::Direct);
        assert!(out.fallback_reason.unwrap().starts_with("design specs:"));
        assert_eq!(p.call_count(), 3);
    }

    #[tokio::test]
    async fn code_step_failure_falls_back() {
        let (p, g) = generator(vec![
            ok(ANALYSIS),
            ok(DESIGN),
            Err(ProviderError::EmptyResponse),
            ok("<html>direct</html>"),
        ]);
        let out = g.generate("A bakery").await;
        assert_eq!(out.path, GenerationPath::Direct);
        assert_eq!(out.response.content, "<html>direct</html>");
        assert_eq!(p.call_count(), 4);
    }

    #[tokio::test]
    async fn fallback_failure_is_returned_without_retry() {
        let (p, g) = generator(vec![
            ok(ANALYSIS),
            ok(DESIGN),
            Err(ProviderError::Request("timeout".into())),
            Err(ProviderError::Request("still down".into())),
        ]);
        let out = g.generate("A bakery").await;

        assert_eq!(out.path, GenerationPath::Direct);
        assert!(!out.response.success);
        assert!(out.response.error.unwrap().contains("still down"));
        assert_eq!(p.call_count(), 4);
    }

    #[tokio::test]
    async fn direct_only_skips_chain() {
        let (p, g) = generator(vec![ok(HTML)]);
        let out = g.direct_only(true).generate("A bakery").await;

        assert_eq!(out.path, GenerationPath::Direct);
        assert_eq!(out.fallback_reason, None);
        assert_eq!(out.response.content, "<!DOCTYPE html><html></html>");
        assert_eq!(p.call_count(), 1);
    }

    #[tokio::test]
    async fn no_provider_reports_unavailable() {
        let g = WebsiteGenerator::new(AiService::default());
        let out = g.generate("A bakery").await;
        assert!(!out.response.success);
        assert_eq!(out.response.error.as_deref(), Some("No AI service available"));
    }

    #[test]
    fn path_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&GenerationPath::Chain).unwrap(), "\"chain\"");
        assert_eq!(GenerationPath::Direct.as_str(), "direct");
    }
}
