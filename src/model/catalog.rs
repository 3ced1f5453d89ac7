// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde_json::{Map, Value};

use crate::remote::{Remote, RemoteError};

/// Which catalog listing a browsing view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowseKind {
    Tool,
    Resource,
    Prompt,
}

impl BrowseKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Tool => "Tools",
            Self::Resource => "Resources",
            Self::Prompt => "Prompts",
        }
    }
}

/// Declared JSON-schema type of an operation parameter.
///
/// Anything outside the four scalar types is kept verbatim in `Other` and passed through as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Other(String),
}

impl ParamType {
    pub fn from_schema_type(raw: Option<&str>) -> Self {
        match raw {
            Some("string") | None => Self::String,
            Some("number") => Self::Number,
            Some("integer") => Self::Integer,
            Some("boolean") => Self::Boolean,
            Some(other) => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    param_type: ParamType,
    description: String,
    required: bool,
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        Self { name: name.into(), param_type, description: description.into(), required }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_type(&self) -> &ParamType {
        &self.param_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn required(&self) -> bool {
        self.required
    }
}

/// A remote action ("tool") with its declared parameter schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    name: String,
    description: String,
    parameters: Vec<Parameter>,
}

impl Operation {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self { name: name.into(), description: description.into(), parameters }
    }

    /// Builds an operation from a JSON-schema object (`properties` + `required`).
    ///
    /// A schema without `properties` (or with a non-object `properties`) yields no parameters.
    pub fn from_input_schema(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: &Map<String, Value>,
    ) -> Self {
        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect::<Vec<_>>())
            .unwrap_or_default();

        let parameters = schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(param_name, prop)| {
                        let param_type =
                            ParamType::from_schema_type(prop.get("type").and_then(Value::as_str));
                        let description =
                            prop.get("description").and_then(Value::as_str).unwrap_or_default();
                        Parameter::new(
                            param_name.clone(),
                            param_type,
                            description,
                            required.contains(&param_name.as_str()),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self::new(name, description, parameters)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|param| param.name == name)
    }

    pub fn takes_arguments(&self) -> bool {
        !self.parameters.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    name: String,
    description: String,
    locator: String,
    mime_type: Option<String>,
}

impl Resource {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            locator: locator.into(),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: Option<String>) -> Self {
        self.mime_type = mime_type;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDescriptor {
    name: String,
    description: String,
    arguments: Vec<String>,
}

impl PromptDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), description: description.into(), arguments: Vec::new() }
    }

    pub fn with_arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

/// Everything the remote server exposes, fetched once at session start.
///
/// There are no mutating accessors; the snapshot stays as fetched for the process lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    operations: Vec<Operation>,
    resources: Vec<Resource>,
    prompts: Vec<PromptDescriptor>,
}

impl CatalogSnapshot {
    pub fn new(
        operations: Vec<Operation>,
        resources: Vec<Resource>,
        prompts: Vec<PromptDescriptor>,
    ) -> Self {
        Self { operations, resources, prompts }
    }

    /// Fetches operations, then prompts, then resources. The first failure aborts the fetch.
    pub async fn fetch(remote: &dyn Remote) -> Result<Self, RemoteError> {
        let operations = remote.list_operations().await?;
        tracing::debug!(count = operations.len(), "fetched operations");
        let prompts = remote.list_prompts().await?;
        tracing::debug!(count = prompts.len(), "fetched prompts");
        let resources = remote.list_resources().await?;
        tracing::debug!(count = resources.len(), "fetched resources");
        Ok(Self::new(operations, resources, prompts))
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn prompts(&self) -> &[PromptDescriptor] {
        &self.prompts
    }

    pub fn len_of(&self, kind: BrowseKind) -> usize {
        match kind {
            BrowseKind::Tool => self.operations.len(),
            BrowseKind::Resource => self.resources.len(),
            BrowseKind::Prompt => self.prompts.len(),
        }
    }

    /// `(name, description)` pairs for one listing, in catalog order.
    pub fn entries(&self, kind: BrowseKind) -> Vec<(&str, &str)> {
        match kind {
            BrowseKind::Tool => {
                self.operations.iter().map(|op| (op.name(), op.description())).collect()
            }
            BrowseKind::Resource => {
                self.resources.iter().map(|res| (res.name(), res.description())).collect()
            }
            BrowseKind::Prompt => {
                self.prompts.iter().map(|prompt| (prompt.name(), prompt.description())).collect()
            }
        }
    }
}
