//! Prompt assembly for command derivation.

use taskpilot_core::command::CommandDescriptor;

use crate::context::ContextSnapshot;

const OPERATING_RULES: &str = "\
You translate the user's request into commands from the catalog below.
Reply with a single JSON object: {\"commands\": [{\"name\": ..., \"parameters\": {...}}]}.
Rules:
- Only use command names from the catalog; never invent one.
- Fill required parameters from the request and the context; omit unknowns.
- Reference projects by name exactly as the context lists them.
- If no catalog command safely matches, reply with one REPORT_ERROR command
  whose message explains what is missing.
- No prose outside the JSON object.";

/// Assembles the derivation prompt from rules, context, catalog, and input.
pub struct PromptBuilder {
    catalog_json: String,
}

impl PromptBuilder {
    /// Builder over a fixed command catalog.
    ///
    /// The catalog is rendered once; descriptors are registered at startup
    /// and never change afterwards.
    #[must_use]
    pub fn new(descriptors: &[CommandDescriptor]) -> Self {
        let catalog_json = serde_json::to_string_pretty(descriptors)
            .unwrap_or_else(|_| "[]".to_string());
        Self { catalog_json }
    }

    /// Render the full prompt for one request.
    #[must_use]
    pub fn build(&self, context: &ContextSnapshot, input: &str) -> String {
        let mut prompt = String::from(OPERATING_RULES);
        let rendered = context.render();
        if !rendered.is_empty() {
            prompt.push_str("\n\n# Context\n\n");
            prompt.push_str(&rendered);
        }
        prompt.push_str("\n\n# Command catalog\n\n");
        prompt.push_str(&self.catalog_json);
        prompt.push_str("\n\n# Request\n\n");
        prompt.push_str(input);
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextSection;
    use taskpilot_core::command::{ParamType, ParameterSpec};

    #[test]
    fn prompt_contains_all_blocks_in_order() {
        let descriptors = vec![CommandDescriptor::new("CREATE_PROJECT", "Create a project")
            .with_param("name", ParameterSpec::required(ParamType::String, "Project name"))];
        let builder = PromptBuilder::new(&descriptors);
        let context = ContextSnapshot {
            sections: vec![ContextSection {
                title: "Your projects".into(),
                body: "- Marketing".into(),
            }],
        };

        let prompt = builder.build(&context, "create a task in marketing");

        let rules = prompt.find("Reply with a single JSON object").unwrap();
        let ctx = prompt.find("# Context").unwrap();
        let catalog = prompt.find("# Command catalog").unwrap();
        let request = prompt.find("# Request").unwrap();
        assert!(rules < ctx && ctx < catalog && catalog < request);
        assert!(prompt.contains("CREATE_PROJECT"));
        assert!(prompt.contains("create a task in marketing"));
    }

    #[test]
    fn empty_context_omits_section() {
        let builder = PromptBuilder::new(&[]);
        let prompt = builder.build(&ContextSnapshot::default(), "hello");
        assert!(!prompt.contains("# Context"));
    }
}
