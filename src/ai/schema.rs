//! Structured step outputs of the generation pipeline.
//!
//! Both types wrap the JSON object the model returned. Nothing is dropped
//! when the object is re-serialized into the next step's prompt; accessors
//! read the well-known keys leniently and return `None` when a key is absent
//! or has an unexpected shape.

use serde::Serialize;
use serde_json::{Map, Value};

use super::extract::ExtractError;

/// Output of the business-analysis step.
///
/// Expected keys: `businessType`, `industry`, `targetAudience`,
/// `keyServices[]`, `valueProposition`, `competitiveAdvantages[]`,
/// `websiteRequirements{essentialPages[], keyFeatures[], designStyle, contentSections[]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BusinessAnalysis(Map<String, Value>);

impl BusinessAnalysis {
    pub fn business_type(&self) -> Option<&str> {
        str_field(&self.0, "businessType")
    }

    pub fn industry(&self) -> Option<&str> {
        str_field(&self.0, "industry")
    }

    pub fn target_audience(&self) -> Option<&str> {
        str_field(&self.0, "targetAudience")
    }

    pub fn key_services(&self) -> Vec<&str> {
        str_list(&self.0, "keyServices")
    }

    pub fn design_style(&self) -> Option<&str> {
        self.0
            .get("websiteRequirements")
            .and_then(Value::as_object)
            .and_then(|r| str_field(r, "designStyle"))
    }

    pub fn essential_pages(&self) -> Vec<&str> {
        self.0
            .get("websiteRequirements")
            .and_then(Value::as_object)
            .map(|r| str_list(r, "essentialPages"))
            .unwrap_or_default()
    }

    pub fn to_pretty_json(&self) -> String {
        pretty(&self.0)
    }
}

impl TryFrom<Value> for BusinessAnalysis {
    type Error = ExtractError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        into_object(value).map(Self)
    }
}

/// Output of the design-spec step.
///
/// Expected keys: `colorScheme{primary[], secondary[], accent[], neutral[]}`,
/// `typography{heading, body, accent}`, `layout{style, sections[], animations[]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DesignSpecs(Map<String, Value>);

impl DesignSpecs {
    pub fn primary_colors(&self) -> Vec<&str> {
        self.section("colorScheme").map(|c| str_list(c, "primary")).unwrap_or_default()
    }

    pub fn heading_font(&self) -> Option<&str> {
        self.section("typography").and_then(|t| str_field(t, "heading"))
    }

    pub fn body_font(&self) -> Option<&str> {
        self.section("typography").and_then(|t| str_field(t, "body"))
    }

    pub fn layout_style(&self) -> Option<&str> {
        self.section("layout").and_then(|l| str_field(l, "style"))
    }

    fn section(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    pub fn to_pretty_json(&self) -> String {
        pretty(&self.0)
    }
}

impl TryFrom<Value> for DesignSpecs {
    type Error = ExtractError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        into_object(value).map(Self)
    }
}

fn into_object(value: Value) -> Result<Map<String, Value>, ExtractError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ExtractError::NoJsonObject),
    }
}

fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

fn str_list<'a>(map: &'a Map<String, Value>, key: &str) -> Vec<&'a str> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn pretty(map: &Map<String, Value>) -> String {
    // A map of JSON values always serializes.
    serde_json::to_string_pretty(map).unwrap_or_else(|_| "{}".to_string())
}
