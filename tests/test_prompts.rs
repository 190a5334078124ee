//! Prompt templates under config/prompts exist and carry their variables.

use std::fs;

fn read(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("{path}: {e}"))
}

#[test]
fn test_enhanced_prompt_template_vars() {
    let text = read("config/prompts/enhanced.md");
    assert!(text.contains("{{prompt}}"), "enhanced.md should contain {{{{prompt}}}}");
}

#[test]
fn test_business_analysis_template_vars() {
    let text = read("config/prompts/business_analysis.md");
    assert!(text.contains("{{description}}"));
    assert!(text.contains("\"websiteRequirements\""));
}

#[test]
fn test_design_specs_template_vars() {
    let text = read("config/prompts/design_specs.md");
    assert!(text.contains("{{business_analysis}}"));
    assert!(text.contains("\"colorScheme\""));
}

#[test]
fn test_website_code_template_vars() {
    let text = read("config/prompts/website_code.md");
    assert!(text.contains("{{business_analysis}}"));
    assert!(text.contains("{{design_specs}}"));
}

#[test]
fn test_direct_website_template_vars() {
    let text = read("config/prompts/direct_website.md");
    assert!(text.contains("{{description}}"));
    assert!(text.contains("cdn.tailwindcss.com"));
}

#[test]
fn test_chain_templates_use_single_brace_placeholders() {
    for entry in fs::read_dir("config/prompts/chains").unwrap() {
        let path = entry.unwrap().path();
        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("{{"), "{} mixes in double-brace placeholders", path.display());
        assert!(text.contains('{'), "{} has no placeholders", path.display());
    }
}

#[test]
fn test_default_config_parses() {
    let raw = read("config/default.toml");
    let overrides = fusionspace::config::EnvOverrides::default();
    let cfg = fusionspace::config::load_from_str(&raw, "config/default.toml", &overrides).unwrap();
    assert_eq!(cfg.llm.default_model, fusionspace::ai::ModelChoice::Gemini);
    assert_eq!(cfg.llm.gemini.max_output_tokens, 8192);
    assert!(cfg.gemini_api_key.is_none());
}
