//! Template reply synthesis.
//!
//! Deterministic rendering of command results into one user-facing message:
//! successes in execution order with their links, then failures. The
//! conversational strategy may replace this text with a gateway rewrite, but
//! this template is always the safety net.

use taskpilot_core::command::CommandResult;

/// Fixed link-kind labels. Unknown kinds fall back to the raw URL alone.
const LINK_LABELS: &[(&str, &str)] = &[
    ("project", "View project"),
    ("task", "View task"),
    ("sprint", "View sprint"),
    ("board", "View board"),
];

fn link_label(kind: &str) -> Option<&'static str> {
    LINK_LABELS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, label)| *label)
}

/// Deterministic results-to-text renderer.
pub struct TemplateSynthesizer;

impl TemplateSynthesizer {
    /// Render a reply message from results.
    ///
    /// Empty input means derivation produced nothing actionable; the reply
    /// is a gentle prompt to rephrase, not an error.
    #[must_use]
    pub fn synthesize(results: &[CommandResult]) -> String {
        if results.is_empty() {
            return "I couldn't find anything to do for that. Try rephrasing, or ask for \
                    \"list my projects\" to see what's available."
                .to_string();
        }

        let mut lines: Vec<String> = Vec::with_capacity(results.len());
        for result in results.iter().filter(|r| r.success) {
            lines.push(render_line(result, ""));
        }
        for result in results.iter().filter(|r| !r.success) {
            lines.push(render_line(result, "Couldn't do that: "));
        }
        lines.join("\n")
    }
}

fn render_line(result: &CommandResult, prefix: &str) -> String {
    let mut line = format!("{prefix}{}", result.message);
    if let Some(links) = &result.links {
        for (kind, url) in links {
            match link_label(kind) {
                Some(label) => line.push_str(&format!(" [{label}: {url}]")),
                None => line.push_str(&format!(" [{url}]")),
            }
        }
    }
    line
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successes_precede_failures_in_order() {
        let results = vec![
            CommandResult::failed("CREATE_TASK", "Unknown project"),
            CommandResult::ok("CREATE_PROJECT", "Created project \"A\""),
            CommandResult::ok("CREATE_PROJECT", "Created project \"B\""),
        ];
        let reply = TemplateSynthesizer::synthesize(&results);
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines[0], "Created project \"A\"");
        assert_eq!(lines[1], "Created project \"B\"");
        assert_eq!(lines[2], "Couldn't do that: Unknown project");
    }

    #[test]
    fn links_use_fixed_labels() {
        let result = CommandResult::ok("CREATE_TASK", "Created task \"T\"")
            .with_link("task", "/tasks/task_1");
        let reply = TemplateSynthesizer::synthesize(&[result]);
        assert_eq!(reply, "Created task \"T\" [View task: /tasks/task_1]");
    }

    #[test]
    fn unknown_link_kind_renders_bare_url() {
        let result = CommandResult::ok("X", "Done").with_link("dashboard", "/d/1");
        let reply = TemplateSynthesizer::synthesize(&[result]);
        assert_eq!(reply, "Done [/d/1]");
    }

    #[test]
    fn empty_results_yield_generic_guidance() {
        let reply = TemplateSynthesizer::synthesize(&[]);
        assert!(reply.contains("Try rephrasing"));
    }
}
