//! Declarative form definition and its contract checks
//!
//! A schema plays the part of the page markup: it declares one entry per
//! step (with a sequential index), the fields inside each step and any
//! hidden key/value pairs that travel with the submission.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::error::SchemaError;
use super::field::{FieldKind, FieldSpec};

/// Name of the default form, also sent as the `form-name` hidden field
pub const DEFAULT_FORM_NAME: &str = "client-brief";

/// One step of the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    /// 1-based position in the sequence
    pub index: usize,
    pub title: String,
    /// Short label shown under the progress indicator (defaults to title)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl StepSpec {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.title)
    }
}

/// Complete form definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSchema {
    pub name: String,
    /// Heading of the panel shown after a successful submission
    #[serde(default = "default_success_title")]
    pub success_title: String,
    /// Body of the success panel
    #[serde(default = "default_success_message")]
    pub success_message: String,
    /// Fixed pairs submitted ahead of the declared fields
    #[serde(default)]
    pub hidden: BTreeMap<String, String>,
    pub steps: Vec<StepSpec>,
}

fn default_success_title() -> String {
    "Thank you!".to_string()
}

fn default_success_message() -> String {
    "Your brief has been received. I'll review it and get back to you within 48 hours."
        .to_string()
}

impl FormSchema {
    /// Parse a schema from TOML text and check its contract
    pub fn from_toml(text: &str) -> Result<Self, SchemaError> {
        let schema: FormSchema =
            toml::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))?;
        schema.check()?;
        Ok(schema)
    }

    /// Load and check a schema file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read form schema {}", path.display()))?;
        let schema = Self::from_toml(&text)
            .with_context(|| format!("Invalid form schema {}", path.display()))?;
        Ok(schema)
    }

    /// Verify steps are sequential from 1 and field names are present and unique
    pub fn check(&self) -> Result<(), SchemaError> {
        if self.steps.is_empty() {
            return Err(SchemaError::NoSteps);
        }

        let mut seen = HashSet::new();
        for (position, step) in self.steps.iter().enumerate() {
            let expected = position + 1;
            if step.index != expected {
                return Err(SchemaError::StepOutOfSequence {
                    position: expected,
                    expected,
                    found: step.index,
                });
            }
            if step.fields.is_empty() {
                return Err(SchemaError::EmptyStep(step.index));
            }
            for field in &step.fields {
                if field.name.trim().is_empty() {
                    return Err(SchemaError::UnnamedField(step.index));
                }
                if !seen.insert(field.name.as_str()) || self.hidden.contains_key(&field.name) {
                    return Err(SchemaError::DuplicateField(field.name.clone()));
                }
            }
        }
        Ok(())
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize form schema")
    }

    /// The built-in client brief
    pub fn client_brief() -> Self {
        let mut hidden = BTreeMap::new();
        hidden.insert("form-name".to_string(), DEFAULT_FORM_NAME.to_string());

        Self {
            name: DEFAULT_FORM_NAME.to_string(),
            success_title: default_success_title(),
            success_message: default_success_message(),
            hidden,
            steps: vec![
                StepSpec {
                    index: 1,
                    title: "About You".to_string(),
                    label: Some("Contact".to_string()),
                    fields: vec![
                        FieldSpec::new("name", "Full name", FieldKind::Text, true)
                            .with_placeholder("Jane Doe"),
                        FieldSpec::new("email", "Email address", FieldKind::Email, true)
                            .with_placeholder("jane@company.com"),
                        FieldSpec::new("company", "Company", FieldKind::Text, false),
                        FieldSpec::new("website", "Current website", FieldKind::Text, false)
                            .with_placeholder("https://"),
                    ],
                },
                StepSpec {
                    index: 2,
                    title: "Your Project".to_string(),
                    label: Some("Project".to_string()),
                    fields: vec![
                        FieldSpec::new("project-type", "Project type", FieldKind::Text, true)
                            .with_placeholder("Website, redesign, landing page..."),
                        FieldSpec::new("budget", "Budget range", FieldKind::Text, true),
                        FieldSpec::new("timeline", "Timeline", FieldKind::Text, true),
                    ],
                },
                StepSpec {
                    index: 3,
                    title: "Project Details".to_string(),
                    label: Some("Details".to_string()),
                    fields: vec![
                        FieldSpec::new(
                            "description",
                            "Describe your project",
                            FieldKind::Multiline,
                            true,
                        ),
                        FieldSpec::new("goals", "Goals", FieldKind::Multiline, false),
                        FieldSpec::new("references", "References", FieldKind::Multiline, false)
                            .with_placeholder("Sites you like, competitors, inspiration"),
                    ],
                },
            ],
        }
    }
}
