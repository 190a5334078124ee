//! WebsiteGenerator end to end over HTTP against a mock Gemini.

mod common;

use axum::http::StatusCode;

use common::{MockGemini, api_error, reply};
use fusionspace::ai::AiService;
use fusionspace::ai::pipeline::{GenerationPath, WebsiteGenerator};

const ANALYSIS: &str = "```json\n{\n  \"businessType\": \"Coffee shop\",\n  \"industry\": \"Hospitality\",\n  \"targetAudience\": \"Commuters\",\n  \"keyServices\": [\"Espresso\", \"Pastries\"],\n  \"websiteRequirements\": {\"essentialPages\": [\"Home\", \"Menu\"], \"designStyle\": \"Cosy\"}\n}\n```";
const DESIGN: &str = "Here you go:\n{\"colorScheme\": {\"primary\": [\"#6B4226\"]}, \"typography\": {\"heading\": \"Playfair Display\", \"body\": \"Inter\"}, \"layout\": {\"style\": \"single page\"}}";
const SITE: &str = "```html\n<!DOCTYPE html>\n<html><body>Chain</body></html>\n```";
const DIRECT: &str = "<!DOCTYPE html>\n<html><body>Direct</body></html>";

fn scripted(prompt: &str) -> (StatusCode, serde_json::Value) {
    if prompt.starts_with("Analyze the following business description") {
        (StatusCode::OK, reply(ANALYSIS))
    } else if prompt.starts_with("Based on this business analysis") {
        (StatusCode::OK, reply(DESIGN))
    } else if prompt.starts_with("Create a complete website based on") {
        (StatusCode::OK, reply(SITE))
    } else {
        (StatusCode::OK, reply(DIRECT))
    }
}

#[tokio::test]
async fn test_chain_path_produces_unfenced_html() {
    let mock = MockGemini::start(scripted).await;
    let generator = WebsiteGenerator::new(AiService::with_providers(Some(mock.llm()), None));

    let outcome = generator.generate("A cosy coffee shop near the station").await;

    assert_eq!(outcome.path, GenerationPath::Chain);
    assert!(outcome.response.success);
    assert_eq!(outcome.response.content, "<!DOCTYPE html>\n<html><body>Chain</body></html>");
    assert_eq!(outcome.response.model, "gemini-2.5-flash");
    assert_eq!(outcome.response.tokens_used, Some(150));
    assert!(outcome.response.cost.unwrap() > 0.0);

    let seen = mock.requests();
    assert_eq!(seen.len(), 3);
    let design_prompt = seen[1].body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(design_prompt.contains("\"businessType\": \"Coffee shop\""));
    let code_prompt = seen[2].body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(code_prompt.contains("Playfair Display"));
}

#[tokio::test]
async fn test_analysis_http_error_falls_back_to_direct() {
    let mock = MockGemini::start(|prompt: &str| {
        if prompt.starts_with("Analyze") {
            (StatusCode::SERVICE_UNAVAILABLE, api_error(503, "UNAVAILABLE", "The model is overloaded"))
        } else {
            scripted(prompt)
        }
    })
    .await;
    let generator = WebsiteGenerator::new(AiService::with_providers(Some(mock.llm()), None));

    let outcome = generator.generate("A bike repair shop").await;

    assert_eq!(outcome.path, GenerationPath::Direct);
    assert_eq!(outcome.response.content, DIRECT);
    assert!(outcome.fallback_reason.unwrap().contains("overloaded"));
    assert_eq!(mock.requests().len(), 2);
}

#[tokio::test]
async fn test_everything_failing_makes_at_most_two_calls() {
    let mock = MockGemini::start(|_| {
        (StatusCode::INTERNAL_SERVER_ERROR, api_error(500, "INTERNAL", "boom"))
    })
    .await;
    let generator = WebsiteGenerator::new(AiService::with_providers(Some(mock.llm()), None));

    let outcome = generator.generate("A florist").await;

    assert!(!outcome.response.success);
    assert_eq!(outcome.path, GenerationPath::Direct);
    assert!(outcome.response.error.unwrap().contains("boom"));
    assert_eq!(mock.requests().len(), 2);
}
