//! Starter-template catalog.
//!
//! A fixed set of single-file HTML sites a user can start from instead of
//! generating one. Each template carries example prompts that produce a
//! similar site through the generator.

mod catalog;

use serde::{Deserialize, Serialize};

pub use catalog::TEMPLATES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Business,
    Ecommerce,
    Portfolio,
    Landing,
    Blog,
    Saas,
    Restaurant,
    Agency,
}

impl TemplateCategory {
    pub const ALL: [TemplateCategory; 8] = [
        TemplateCategory::Business,
        TemplateCategory::Ecommerce,
        TemplateCategory::Portfolio,
        TemplateCategory::Landing,
        TemplateCategory::Blog,
        TemplateCategory::Saas,
        TemplateCategory::Restaurant,
        TemplateCategory::Agency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateCategory::Business => "business",
            TemplateCategory::Ecommerce => "ecommerce",
            TemplateCategory::Portfolio => "portfolio",
            TemplateCategory::Landing => "landing",
            TemplateCategory::Blog => "blog",
            TemplateCategory::Saas => "saas",
            TemplateCategory::Restaurant => "restaurant",
            TemplateCategory::Agency => "agency",
        }
    }

    /// Display name, e.g. `"E-commerce"`.
    pub fn label(self) -> &'static str {
        match self {
            TemplateCategory::Business => "Business",
            TemplateCategory::Ecommerce => "E-commerce",
            TemplateCategory::Portfolio => "Portfolio",
            TemplateCategory::Landing => "Landing Page",
            TemplateCategory::Blog => "Blog",
            TemplateCategory::Saas => "SaaS",
            TemplateCategory::Restaurant => "Restaurant",
            TemplateCategory::Agency => "Agency",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: TemplateCategory,
    pub tags: &'static [&'static str],
    pub preview_url: &'static str,
    pub thumbnail_url: &'static str,
    /// Whole USD; `0` for free templates.
    pub price: u32,
    pub is_premium: bool,
    pub features: &'static [&'static str],
    pub code: &'static str,
    pub prompt_examples: &'static [&'static str],
}

pub fn get_template(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

pub fn templates_by_category(category: TemplateCategory) -> Vec<&'static Template> {
    TEMPLATES.iter().filter(|t| t.category == category).collect()
}

/// Case-insensitive substring match on name, description and tags.
pub fn search_templates(query: &str) -> Vec<&'static Template> {
    let needle = query.trim().to_lowercase();
    TEMPLATES
        .iter()
        .filter(|t| {
            t.name.to_lowercase().contains(&needle)
                || t.description.to_lowercase().contains(&needle)
                || t.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
        })
        .collect()
}
