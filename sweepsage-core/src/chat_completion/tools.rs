use derive_builder::Builder;
use schemars::Schema;
use serde::{Deserialize, Serialize};

/// Output of a `ToolCall` which will be added as a message for the agent to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, strum_macros::EnumIs)]
pub enum ToolOutput {
    /// Adds the result of the toolcall to messages
    Text(String),

    /// Indicates that the toolcall failed, but can be handled by the llm
    Fail(String),
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        ToolOutput::Text(text.into())
    }

    pub fn fail(text: impl Into<String>) -> Self {
        ToolOutput::Fail(text.into())
    }

    pub fn content(&self) -> &str {
        match self {
            ToolOutput::Fail(s) | ToolOutput::Text(s) => s,
        }
    }
}

impl std::fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolOutput::Text(value) => write!(f, "{value}"),
            ToolOutput::Fail(value) => write!(f, "Tool call failed: {value}"),
        }
    }
}

/// A tool call requested by the model
#[derive(Clone, Debug, Builder, PartialEq, Serialize, Deserialize, Eq)]
#[builder(setter(into, strip_option))]
pub struct ToolCall {
    id: String,
    name: String,
    #[builder(default)]
    args: Option<String>,
}

impl std::fmt::Display for ToolCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{id}#{name} {args}",
            id = self.id,
            name = self.name,
            args = self.args.as_deref().unwrap_or("")
        )
    }
}

impl ToolCall {
    pub fn builder() -> ToolCallBuilder {
        ToolCallBuilder::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw json arguments. Models send an empty object or nothing for tools without arguments.
    pub fn args(&self) -> Option<&str> {
        self.args
            .as_deref()
            .filter(|args| !args.trim().is_empty())
    }
}

/// A typed tool specification, sent to the model as the tool's function definition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Builder, Default)]
#[builder(setter(into))]
pub struct ToolSpec {
    /// Name of the tool
    pub name: String,
    /// Description passed to the LLM for the tool
    pub description: String,

    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional JSON schema describing the tool arguments
    pub parameters_schema: Option<Schema>,
}

impl ToolSpec {
    pub fn builder() -> ToolSpecBuilder {
        ToolSpecBuilder::default()
    }

    /// The argument schema as json, an empty object schema for tools without arguments
    pub fn parameters_json(&self) -> serde_json::Value {
        self.parameters_schema
            .as_ref()
            .and_then(|schema| serde_json::to_value(schema).ok())
            .unwrap_or_else(|| serde_json::json!({"type": "object", "properties": {}}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
    struct ExampleArgs {
        city: String,
    }

    #[test]
    fn tool_spec_serializes_schema() {
        let schema = schemars::schema_for!(ExampleArgs);

        let spec = ToolSpec::builder()
            .name("get_weather")
            .description("Weather for a city")
            .parameters_schema(schema)
            .build()
            .unwrap();

        let json = spec.parameters_json();
        assert!(json["properties"].get("city").is_some());
    }

    #[test]
    fn tool_spec_without_arguments_is_an_empty_object() {
        let spec = ToolSpec::builder()
            .name("get_user_id")
            .description("Current user")
            .build()
            .unwrap();

        assert_eq!(
            spec.parameters_json(),
            serde_json::json!({"type": "object", "properties": {}})
        );
    }

    #[test]
    fn tool_call_treats_blank_args_as_none() {
        let call = ToolCall::builder()
            .id("1")
            .name("get_user_id")
            .args("  ")
            .build()
            .unwrap();

        assert_eq!(call.args(), None);
    }
}
