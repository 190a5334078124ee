//! Built-in prompt chains.
//!
//! Step templates live in `config/prompts/chains/` and use single-brace
//! `{name}` placeholders. Each step's reply is stored under its
//! `output_key` so later steps can reference it.

use super::{PromptChain, PromptStep};

macro_rules! template {
    ($file:literal) => {
        include_str!(concat!("../../config/prompts/chains/", $file))
    };
}

pub static CHAINS: &[PromptChain] = &[
    PromptChain {
        id: "business-analysis",
        name: "Business Analysis",
        description: "Analyze business requirements and create a comprehensive plan",
        category: "planning",
        estimated_tokens: 2000,
        cost: 0.06,
        steps: &[
            PromptStep {
                id: "business-type",
                name: "Business Type Analysis",
                description: "Determine the type of business and its requirements",
                prompt: template!("business_type.md"),
                required: true,
                order: 1,
                output_key: "businessAnalysis",
            },
            PromptStep {
                id: "website-requirements",
                name: "Website Requirements",
                description: "Define specific website requirements based on business analysis",
                prompt: template!("website_requirements.md"),
                required: true,
                order: 2,
                output_key: "websiteRequirements",
            },
        ],
    },
    PromptChain {
        id: "design-generation",
        name: "Design Generation",
        description: "Generate design concepts and visual elements",
        category: "design",
        estimated_tokens: 1500,
        cost: 0.045,
        steps: &[
            PromptStep {
                id: "color-scheme",
                name: "Color Scheme",
                description: "Generate appropriate color schemes for the business",
                prompt: template!("color_scheme.md"),
                required: true,
                order: 1,
                output_key: "colorScheme",
            },
            PromptStep {
                id: "typography",
                name: "Typography",
                description: "Select appropriate fonts and typography hierarchy",
                prompt: template!("typography.md"),
                required: true,
                order: 2,
                output_key: "typography",
            },
        ],
    },
    PromptChain {
        id: "code-generation",
        name: "Code Generation",
        description: "Generate HTML, CSS, and JavaScript code",
        category: "development",
        estimated_tokens: 3000,
        cost: 0.09,
        steps: &[
            PromptStep {
                id: "html-structure",
                name: "HTML Structure",
                description: "Generate semantic HTML structure",
                prompt: template!("html_structure.md"),
                required: true,
                order: 1,
                output_key: "htmlStructure",
            },
            PromptStep {
                id: "css-styling",
                name: "CSS Styling",
                description: "Generate modern CSS with Tailwind or custom styles",
                prompt: template!("css_styling.md"),
                required: true,
                order: 2,
                output_key: "cssStyling",
            },
            PromptStep {
                id: "javascript-functionality",
                name: "JavaScript Functionality",
                description: "Add interactive features and functionality",
                prompt: template!("javascript_functionality.md"),
                required: false,
                order: 3,
                output_key: "javascriptFunctionality",
            },
        ],
    },
    PromptChain {
        id: "seo-optimization",
        name: "SEO Optimization",
        description: "Optimize website for search engines",
        category: "marketing",
        estimated_tokens: 1000,
        cost: 0.03,
        steps: &[
            PromptStep {
                id: "meta-tags",
                name: "Meta Tags",
                description: "Generate SEO meta tags and structured data",
                prompt: template!("meta_tags.md"),
                required: true,
                order: 1,
                output_key: "metaTags",
            },
            PromptStep {
                id: "content-optimization",
                name: "Content Optimization",
                description: "Optimize content for target keywords",
                prompt: template!("content_optimization.md"),
                required: false,
                order: 2,
                output_key: "contentOptimization",
            },
        ],
    },
    PromptChain {
        id: "business-tools",
        name: "Business Tools Integration",
        description: "Integrate business tools and marketing features",
        category: "business",
        estimated_tokens: 1500,
        cost: 0.045,
        steps: &[
            PromptStep {
                id: "analytics-setup",
                name: "Analytics Setup",
                description: "Set up Google Analytics and tracking",
                prompt: template!("analytics_setup.md"),
                required: false,
                order: 1,
                output_key: "analyticsSetup",
            },
            PromptStep {
                id: "marketing-tools",
                name: "Marketing Tools",
                description: "Integrate email marketing and social media",
                prompt: template!("marketing_tools.md"),
                required: false,
                order: 2,
                output_key: "marketingTools",
            },
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn chain_ids_unique() {
        let ids: HashSet<_> = CHAINS.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), CHAINS.len());
    }

    #[test]
    fn step_orders_unique_within_chain() {
        for chain in CHAINS {
            let orders: HashSet<_> = chain.steps.iter().map(|s| s.order).collect();
            assert_eq!(orders.len(), chain.steps.len(), "{}", chain.id);
        }
    }

    #[test]
    fn templates_loaded() {
        for step in CHAINS.iter().flat_map(|c| c.steps) {
            assert!(!step.prompt.trim().is_empty(), "{}", step.id);
        }
    }
}
