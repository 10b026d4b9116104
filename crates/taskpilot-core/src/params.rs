//! Command parameter values.
//!
//! Gateway-derived parameters arrive as loosely-typed JSON. [`ParamValue`] is
//! the small tagged union commands actually accept (string | number | bool |
//! list); the schema on a [`crate::command::CommandDescriptor`] is advisory,
//! so each command validates and casts its own subset through the typed
//! accessors on [`ParamMap`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CommandError;

/// A single parameter value.
///
/// `#[serde(untagged)]` — the wire form is plain JSON scalars/arrays, no
/// discriminator. Order matters for deserialization: bool before number
/// before string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean flag.
    Bool(bool),
    /// Numeric value (integers arrive as whole floats).
    Number(f64),
    /// Free text.
    Text(String),
    /// Homogeneous or mixed list.
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// Convert a JSON value into a parameter value.
    ///
    /// Returns `None` for shapes the union does not admit (`null`, objects,
    /// and list elements that are themselves unsupported). The gateway is
    /// prompted to emit scalars and lists only, so a `None` here means the
    /// model ignored the schema — the caller drops the entry with a log line.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Array(items) => Some(Self::List(
                items.iter().filter_map(Self::from_json).collect(),
            )),
            Value::Null | Value::Object(_) => None,
        }
    }

    /// The value as a string slice, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a list slice, if it is one.
    #[must_use]
    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Parameter map attached to an invocation.
///
/// `BTreeMap` for deterministic iteration/serialization order.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// Typed accessors over a [`ParamMap`].
///
/// Free functions rather than a wrapper type so command code reads as
/// `params::required_text(params, "name")?` without an extra layer.
pub mod access {
    use super::{ParamMap, ParamValue};
    use crate::errors::CommandError;

    /// Optional text parameter. Present-but-wrong-type is an
    /// `InvalidParameter`, absent is `Ok(None)`.
    pub fn text<'a>(params: &'a ParamMap, key: &str) -> Result<Option<&'a str>, CommandError> {
        match params.get(key) {
            None => Ok(None),
            Some(value) => value.as_text().map(Some).ok_or_else(|| {
                CommandError::InvalidParameter {
                    name: key.to_string(),
                    expected: "string",
                }
            }),
        }
    }

    /// Required text parameter. Absent → `MissingParameter`; blank after
    /// trimming counts as absent (the gateway sometimes emits `""` for
    /// fields it could not fill).
    pub fn required_text<'a>(params: &'a ParamMap, key: &str) -> Result<&'a str, CommandError> {
        match text(params, key)? {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(CommandError::MissingParameter {
                name: key.to_string(),
            }),
        }
    }

    /// Optional list-of-text parameter. Non-text elements are rejected.
    pub fn text_list(params: &ParamMap, key: &str) -> Result<Option<Vec<String>>, CommandError> {
        let Some(value) = params.get(key) else {
            return Ok(None);
        };
        let items = value
            .as_list()
            .ok_or_else(|| CommandError::InvalidParameter {
                name: key.to_string(),
                expected: "list of strings",
            })?;
        items
            .iter()
            .map(|item| {
                item.as_text().map(str::to_string).ok_or_else(|| {
                    CommandError::InvalidParameter {
                        name: key.to_string(),
                        expected: "list of strings",
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Required list-of-text parameter that must be non-empty.
    pub fn required_text_list(params: &ParamMap, key: &str) -> Result<Vec<String>, CommandError> {
        match text_list(params, key)? {
            Some(items) if !items.is_empty() => Ok(items),
            _ => Err(CommandError::MissingParameter {
                name: key.to_string(),
            }),
        }
    }

    /// Build a one-entry map — test and fallback-rule convenience.
    #[must_use]
    pub fn single(key: &str, value: impl Into<ParamValue>) -> ParamMap {
        let mut map = ParamMap::new();
        let _ = map.insert(key.to_string(), value.into());
        map
    }
}

/// Convert a JSON object into a [`ParamMap`], dropping unsupported values.
///
/// Returns the map plus the keys that were dropped so the caller can log them.
#[must_use]
pub fn from_json_object(object: &serde_json::Map<String, Value>) -> (ParamMap, Vec<String>) {
    let mut map = ParamMap::new();
    let mut dropped = Vec::new();
    for (key, value) in object {
        match ParamValue::from_json(value) {
            Some(v) => {
                let _ = map.insert(key.clone(), v);
            }
            None => dropped.push(key.clone()),
        }
    }
    (map, dropped)
}

/// Validate that every declared-required key in `schema` is present.
///
/// Used by commands that want the uniform check before their own casting;
/// the schema stays advisory for everything else.
pub fn check_required(
    params: &ParamMap,
    required: &[&str],
) -> Result<(), CommandError> {
    for key in required {
        if !params.contains_key(*key) {
            return Err(CommandError::MissingParameter {
                name: (*key).to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn from_json_scalars() {
        assert_eq!(
            ParamValue::from_json(&json!("hi")),
            Some(ParamValue::Text("hi".into()))
        );
        assert_eq!(
            ParamValue::from_json(&json!(true)),
            Some(ParamValue::Bool(true))
        );
        assert_eq!(
            ParamValue::from_json(&json!(3)),
            Some(ParamValue::Number(3.0))
        );
    }

    #[test]
    fn from_json_rejects_null_and_object() {
        assert_eq!(ParamValue::from_json(&json!(null)), None);
        assert_eq!(ParamValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn from_json_list_drops_unsupported_elements() {
        let value = ParamValue::from_json(&json!(["a", null, "b"])).unwrap();
        assert_eq!(
            value,
            ParamValue::List(vec![ParamValue::Text("a".into()), ParamValue::Text("b".into())])
        );
    }

    #[test]
    fn untagged_deserialization_order() {
        // bool must not deserialize as a number or string
        let v: ParamValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, ParamValue::Bool(true));
        let v: ParamValue = serde_json::from_str("2.5").unwrap();
        assert_eq!(v, ParamValue::Number(2.5));
    }

    #[test]
    fn required_text_present() {
        let params = access::single("name", "Marketing");
        assert_eq!(access::required_text(&params, "name").unwrap(), "Marketing");
    }

    #[test]
    fn required_text_absent_is_missing() {
        let params = ParamMap::new();
        assert_matches!(
            access::required_text(&params, "name"),
            Err(CommandError::MissingParameter { name }) if name == "name"
        );
    }

    #[test]
    fn required_text_blank_is_missing() {
        let params = access::single("name", "   ");
        assert_matches!(
            access::required_text(&params, "name"),
            Err(CommandError::MissingParameter { .. })
        );
    }

    #[test]
    fn text_wrong_type_is_invalid() {
        let params = access::single("name", ParamValue::Bool(true));
        assert_matches!(
            access::text(&params, "name"),
            Err(CommandError::InvalidParameter { expected, .. }) if expected == "string"
        );
    }

    #[test]
    fn text_list_rejects_mixed_elements() {
        let mut params = ParamMap::new();
        let _ = params.insert(
            "titles".into(),
            ParamValue::List(vec![ParamValue::Text("a".into()), ParamValue::Number(1.0)]),
        );
        assert_matches!(
            access::text_list(&params, "titles"),
            Err(CommandError::InvalidParameter { .. })
        );
    }

    #[test]
    fn required_text_list_empty_is_missing() {
        let mut params = ParamMap::new();
        let _ = params.insert("titles".into(), ParamValue::List(vec![]));
        assert_matches!(
            access::required_text_list(&params, "titles"),
            Err(CommandError::MissingParameter { .. })
        );
    }

    #[test]
    fn from_json_object_reports_dropped_keys() {
        let object = json!({"name": "x", "meta": {"a": 1}});
        let (map, dropped) = from_json_object(object.as_object().unwrap());
        assert_eq!(map.len(), 1);
        assert_eq!(dropped, vec!["meta".to_string()]);
    }

    #[test]
    fn check_required_reports_first_missing() {
        let params = access::single("name", "x");
        assert!(check_required(&params, &["name"]).is_ok());
        assert_matches!(
            check_required(&params, &["name", "project"]),
            Err(CommandError::MissingParameter { name }) if name == "project"
        );
    }
}
