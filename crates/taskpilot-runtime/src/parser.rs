//! Gateway response parsing.
//!
//! Models wrap their JSON in prose, code fences, or apologies; the parser
//! digs the command list out of whatever came back. Pure and total: any
//! input maps deterministically to a (possibly empty) invocation list,
//! never an error.

use serde_json::Value;
use taskpilot_core::command::CommandInvocation;
use taskpilot_core::params::{ParamMap, from_json_object};
use tracing::debug;

/// Extract command invocations from raw gateway text.
///
/// Tries, in order: the first balanced JSON object containing a `"commands"`
/// key anywhere in the text, then the whole trimmed body as an object with
/// `"commands"`, then the whole body as a bare array.
#[must_use]
pub fn parse(gateway_text: &str) -> Vec<CommandInvocation> {
    if let Some(list) = find_embedded_commands(gateway_text) {
        return list;
    }

    let trimmed = gateway_text.trim();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(obj)) => obj
            .get("commands")
            .and_then(Value::as_array)
            .map(|items| invocations_from(items))
            .unwrap_or_default(),
        Ok(Value::Array(items)) => invocations_from(&items),
        _ => Vec::new(),
    }
}

/// Scan for the first balanced `{...}` that parses and holds `"commands"`.
fn find_embedded_commands(text: &str) -> Option<Vec<CommandInvocation>> {
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(open) = text[start..].find('{').map(|i| start + i) {
        if let Some(end) = balanced_end(bytes, open) {
            if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(&text[open..=end]) {
                if let Some(items) = obj.get("commands").and_then(Value::as_array) {
                    return Some(invocations_from(items));
                }
            }
            // A balanced object without "commands" may still contain one
            // deeper in malformed surroundings; keep scanning past its '{'.
        }
        start = open + 1;
    }
    None
}

/// Index of the brace closing the object at `open`, string-literal aware.
fn balanced_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn invocations_from(items: &[Value]) -> Vec<CommandInvocation> {
    items.iter().filter_map(invocation_from).collect()
}

fn invocation_from(value: &Value) -> Option<CommandInvocation> {
    let obj = value.as_object()?;
    let name = obj.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    let parameters = match obj.get("parameters") {
        Some(Value::Object(map)) => {
            let (params, dropped) = from_json_object(map);
            if !dropped.is_empty() {
                debug!(command = name, ?dropped, "dropped unsupported parameter values");
            }
            params
        }
        _ => ParamMap::new(),
    };
    Some(CommandInvocation::new(name, parameters))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_core::params::ParamValue;

    #[test]
    fn extracts_object_embedded_in_prose() {
        let text = r#"Sure! Here is the plan:
{"commands": [{"name": "CREATE_PROJECT", "parameters": {"name": "Marketing"}}]}
Let me know if that works."#;
        let commands = parse(text);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].name, "CREATE_PROJECT");
        assert_eq!(
            commands[0].parameters.get("name"),
            Some(&ParamValue::Text("Marketing".into()))
        );
    }

    #[test]
    fn whole_body_object() {
        let commands = parse(r#"{"commands": [{"name": "LIST_PROJECTS"}]}"#);
        assert_eq!(commands.len(), 1);
        assert!(commands[0].parameters.is_empty());
    }

    #[test]
    fn whole_body_bare_array() {
        let commands = parse(r#"[{"name": "LIST_TASKS", "parameters": {"status": "Todo"}}]"#);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].name, "LIST_TASKS");
    }

    #[test]
    fn skips_decoy_object_before_the_real_one() {
        let text = r#"{"note": "not it"} then {"commands": [{"name": "LIST_PROJECTS"}]}"#;
        let commands = parse(text);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].name, "LIST_PROJECTS");
    }

    #[test]
    fn braces_inside_strings_do_not_unbalance() {
        let text = r#"{"commands": [{"name": "REPORT_ERROR", "parameters": {"message": "use {braces} carefully"}}]}"#;
        let commands = parse(text);
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands[0].parameters.get("message"),
            Some(&ParamValue::Text("use {braces} carefully".into()))
        );
    }

    #[test]
    fn garbage_and_empty_yield_empty() {
        assert!(parse("").is_empty());
        assert!(parse("no json here").is_empty());
        assert!(parse("{broken json").is_empty());
        assert!(parse(r#"{"commands": "not a list"}"#).is_empty());
    }

    #[test]
    fn entries_without_names_are_skipped() {
        let commands = parse(r#"{"commands": [{"parameters": {}}, {"name": "LIST_PROJECTS"}]}"#);
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn parse_is_deterministic() {
        let text = r#"{"commands": [{"name": "CREATE_TASK", "parameters": {"title": "T", "project": "P"}}]}"#;
        assert_eq!(parse(text), parse(text));
    }
}
