//! Prompt templates loaded from a TOML resource at startup.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ReviewAppError, Result};

pub const SUPPORTED_VERSION: u32 = 1;

const EMBEDDED_TEMPLATES: &str = include_str!("../../prompts/review.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct PromptTemplates {
    pub version: u32,
    pub review: PromptTemplate,
    pub file_review: PromptTemplate,
    pub summary: PromptTemplate,
    pub diff_analysis: PromptTemplate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptTemplate {
    pub system: String,
    pub user: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2000
}

impl PromptTemplates {
    /// Loads templates from `path`, falling back to the copy compiled into the binary
    /// when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Prompt template file {:?} not found, using built-in templates",
                path
            );
            return Self::embedded();
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            ReviewAppError::Template(format!("Failed to read {:?}: {}", path, e))
        })?;
        let templates = Self::parse(&contents)
            .map_err(|e| ReviewAppError::Template(format!("{:?}: {}", path, e)))?;

        info!(
            version = templates.version,
            "Loaded prompt templates from {:?}", path
        );
        Ok(templates)
    }

    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED_TEMPLATES)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let templates: PromptTemplates = toml::from_str(contents)
            .map_err(|e| ReviewAppError::Template(format!("Invalid template file: {}", e)))?;

        if templates.version != SUPPORTED_VERSION {
            return Err(ReviewAppError::Template(format!(
                "Unsupported template version {} (expected {})",
                templates.version, SUPPORTED_VERSION
            )));
        }
        Ok(templates)
    }
}

impl PromptTemplate {
    /// Substitutes `{name}` placeholders in a single pass.
    ///
    /// Substituted values are never rescanned, so braces inside diffs or code
    /// survive untouched. Unknown placeholders are left as written.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let template = self.user.as_str();
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            let substituted = after.find('}').and_then(|close| {
                let name = &after[..close];
                vars.iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (*value, close))
            });

            match substituted {
                Some((value, close)) => {
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }
}
