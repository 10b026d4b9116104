//! Deterministic fallback when the gateway yields no commands.
//!
//! An ordered rule table: each rule carries a case-insensitive pattern over
//! the trimmed input and a capture-driven invocation builder. First match
//! wins; no match means an empty list and the pipeline proceeds with zero
//! commands. Patterns match case-insensitively while captures keep the
//! user's original casing, so "Create project Marketing" yields
//! `name = "Marketing"`.

use regex::{Captures, Regex};
use taskpilot_core::command::CommandInvocation;
use taskpilot_core::params::{ParamMap, access};
use tracing::debug;

type Builder = Box<dyn Fn(&Captures<'_>) -> CommandInvocation + Send + Sync>;

/// One (pattern, builder) pair.
pub struct FallbackRule {
    pattern: Regex,
    build: Builder,
}

impl FallbackRule {
    /// Rule from a pattern (compiled case-insensitively) and a builder.
    ///
    /// # Panics
    /// Panics on an invalid pattern; rules are static tables built at
    /// startup, so this is a programming error.
    #[must_use]
    pub fn new(
        pattern: &str,
        build: impl Fn(&Captures<'_>) -> CommandInvocation + Send + Sync + 'static,
    ) -> Self {
        let pattern = Regex::new(&format!("(?i){pattern}"))
            .unwrap_or_else(|err| panic!("invalid fallback pattern {pattern:?}: {err}"));
        Self {
            pattern,
            build: Box::new(build),
        }
    }
}

/// First-match-wins matcher over an ordered rule table.
pub struct FallbackMatcher {
    rules: Vec<FallbackRule>,
}

impl FallbackMatcher {
    /// Matcher over the given rules, tried in order.
    #[must_use]
    pub fn new(rules: Vec<FallbackRule>) -> Self {
        Self { rules }
    }

    /// The built-in rule table for the common phrasings.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            FallbackRule::new(
                r#"^create\s+(?:a\s+)?(?:new\s+)?project\s+(?:called\s+|named\s+)?["']?(.+?)["']?$"#,
                |caps| {
                    CommandInvocation::new("CREATE_PROJECT", access::single("name", &caps[1]))
                },
            ),
            FallbackRule::new(r"^(?:list|show)(?:\s+me)?(?:\s+all)?(?:\s+my)?\s+projects$", |_| {
                CommandInvocation::new("LIST_PROJECTS", ParamMap::new())
            }),
            FallbackRule::new(
                r"^(?:list|show)(?:\s+me)?(?:\s+all)?\s+(my\s+)?tasks$",
                |caps| {
                    let params = if caps.get(1).is_some() {
                        access::single("assignee", "me")
                    } else {
                        ParamMap::new()
                    };
                    CommandInvocation::new("LIST_TASKS", params)
                },
            ),
        ])
    }

    /// Invocations for this input, or empty when nothing matches.
    #[must_use]
    pub fn derive(&self, input: &str) -> Vec<CommandInvocation> {
        let input = input.trim();
        for rule in &self.rules {
            if let Some(caps) = rule.pattern.captures(input) {
                let invocation = (rule.build)(&caps);
                debug!(command = %invocation.name, "fallback rule matched");
                return vec![invocation];
            }
        }
        Vec::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_core::params::ParamValue;

    #[test]
    fn create_project_preserves_original_casing() {
        let matcher = FallbackMatcher::standard();
        let commands = matcher.derive("Create project Marketing");

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].name, "CREATE_PROJECT");
        assert_eq!(
            commands[0].parameters.get("name"),
            Some(&ParamValue::Text("Marketing".into()))
        );
    }

    #[test]
    fn create_project_strips_filler_and_quotes() {
        let matcher = FallbackMatcher::standard();
        let commands = matcher.derive(r#"  create a new project called "Q3 Launch"  "#);
        assert_eq!(
            commands[0].parameters.get("name"),
            Some(&ParamValue::Text("Q3 Launch".into()))
        );

        // Each filler word is optional on its own.
        let commands = matcher.derive("create new project Ops");
        assert_eq!(
            commands[0].parameters.get("name"),
            Some(&ParamValue::Text("Ops".into()))
        );
        let commands = matcher.derive("create a project named Hiring");
        assert_eq!(
            commands[0].parameters.get("name"),
            Some(&ParamValue::Text("Hiring".into()))
        );
    }

    #[test]
    fn list_phrasings() {
        let matcher = FallbackMatcher::standard();
        assert_eq!(matcher.derive("list my projects")[0].name, "LIST_PROJECTS");
        assert_eq!(matcher.derive("Show me all projects")[0].name, "LIST_PROJECTS");
        assert_eq!(matcher.derive("list tasks")[0].name, "LIST_TASKS");
        let mine = matcher.derive("show me my tasks");
        assert_eq!(
            mine[0].parameters.get("assignee"),
            Some(&ParamValue::Text("me".into()))
        );
    }

    #[test]
    fn no_match_is_empty() {
        let matcher = FallbackMatcher::standard();
        assert!(matcher.derive("what's the weather like").is_empty());
        assert!(matcher.derive("").is_empty());
    }

    #[test]
    fn first_matching_rule_wins() {
        let matcher = FallbackMatcher::new(vec![
            FallbackRule::new(r"^go$", |_| {
                CommandInvocation::new("FIRST", ParamMap::new())
            }),
            FallbackRule::new(r"^go$", |_| {
                CommandInvocation::new("SECOND", ParamMap::new())
            }),
        ]);
        assert_eq!(matcher.derive("GO")[0].name, "FIRST");
    }
}
