//! Command vocabulary — descriptors, invocations, results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::ParamMap;

// ─────────────────────────────────────────────────────────────────────────────
// Descriptor
// ─────────────────────────────────────────────────────────────────────────────

/// Parameter type advertised to the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Free text.
    String,
    /// Numeric value.
    Number,
    /// Boolean flag.
    Boolean,
    /// List of values.
    List,
}

/// One declared parameter on a command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    /// Declared type.
    #[serde(rename = "type")]
    pub param_type: ParamType,
    /// Whether execution fails without it.
    pub required: bool,
    /// Human/model-facing description.
    pub description: String,
}

impl ParameterSpec {
    /// A required parameter of the given type.
    #[must_use]
    pub fn required(param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            param_type,
            required: true,
            description: description.into(),
        }
    }

    /// An optional parameter of the given type.
    #[must_use]
    pub fn optional(param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            param_type,
            required: false,
            description: description.into(),
        }
    }
}

/// Static command metadata advertised to the gateway and documentation.
///
/// The schema is advisory — it drives prompting, not a hard runtime
/// contract. Commands re-validate the subset they actually consume.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDescriptor {
    /// Globally unique command name (e.g. `CREATE_PROJECT`).
    pub name: String,
    /// What the command does, phrased for the model.
    pub description: String,
    /// Declared parameters by name. `BTreeMap` keeps catalog rendering stable.
    pub parameters: BTreeMap<String, ParameterSpec>,
}

impl CommandDescriptor {
    /// Start a descriptor with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Builder: add a parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        let _ = self.parameters.insert(name.into(), spec);
        self
    }

    /// Names of all declared-required parameters.
    #[must_use]
    pub fn required_params(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Invocation
// ─────────────────────────────────────────────────────────────────────────────

/// A concrete (name, parameters) pair derived from input, pending execution.
///
/// Ephemeral — embedded in a turn's result list, never persisted on its own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandInvocation {
    /// Command name as derived (may not be registered — execution fails closed).
    pub name: String,
    /// Parameter map.
    #[serde(default)]
    pub parameters: ParamMap,
}

impl CommandInvocation {
    /// Create an invocation.
    #[must_use]
    pub fn new(name: impl Into<String>, parameters: ParamMap) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result
// ─────────────────────────────────────────────────────────────────────────────

/// The outcome of executing one invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    /// Command name the result belongs to.
    pub command: String,
    /// Whether the command succeeded.
    pub success: bool,
    /// User-facing outcome message.
    pub message: String,
    /// Optional structured payload (counts, created IDs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Optional named links (key is a link kind resolved against a fixed
    /// label dictionary at synthesis time).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<BTreeMap<String, String>>,
}

impl CommandResult {
    /// A successful result.
    #[must_use]
    pub fn ok(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            success: true,
            message: message.into(),
            data: None,
            links: None,
        }
    }

    /// A failed result.
    #[must_use]
    pub fn failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            success: false,
            message: message.into(),
            data: None,
            links: None,
        }
    }

    /// Builder: attach a data payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Builder: attach a named link.
    #[must_use]
    pub fn with_link(mut self, kind: impl Into<String>, url: impl Into<String>) -> Self {
        let _ = self
            .links
            .get_or_insert_with(BTreeMap::new)
            .insert(kind.into(), url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_required_params() {
        let desc = CommandDescriptor::new("CREATE_TASK", "Create a task")
            .with_param("title", ParameterSpec::required(ParamType::String, "Task title"))
            .with_param("assignee", ParameterSpec::optional(ParamType::String, "Assignee"));
        assert_eq!(desc.required_params(), vec!["title"]);
    }

    #[test]
    fn descriptor_serializes_camel_case() {
        let desc = CommandDescriptor::new("LIST_TASKS", "List tasks")
            .with_param("status", ParameterSpec::optional(ParamType::String, "Filter"));
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["parameters"]["status"]["type"], "string");
        assert_eq!(json["parameters"]["status"]["required"], false);
    }

    #[test]
    fn invocation_default_parameters() {
        let inv: CommandInvocation =
            serde_json::from_value(json!({"name": "LIST_PROJECTS"})).unwrap();
        assert!(inv.parameters.is_empty());
    }

    #[test]
    fn result_builders() {
        let result = CommandResult::ok("CREATE_PROJECT", "Created project Marketing")
            .with_data(json!({"projectId": "proj_1"}))
            .with_link("project", "/projects/proj_1");
        assert!(result.success);
        assert_eq!(result.links.unwrap()["project"], "/projects/proj_1");
    }

    #[test]
    fn result_omits_empty_optionals() {
        let json = serde_json::to_value(CommandResult::failed("X", "nope")).unwrap();
        assert!(json.get("data").is_none());
        assert!(json.get("links").is_none());
    }
}
