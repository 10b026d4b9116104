//! Command registry — the startup-time catalog.

use std::collections::HashMap;
use std::sync::Arc;

use taskpilot_core::command::CommandDescriptor;
use thiserror::Error;

use crate::traits::Command;

/// Registration failure.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two commands claimed the same name. A duplicate would silently swap
    /// one authorization contract for another, so registration rejects it
    /// instead of last-write-wins.
    #[error("command already registered: {0}")]
    Duplicate(String),
}

/// Catalog of command variants, keyed by name.
///
/// Populated once at startup and read-only afterwards — there is no removal
/// or runtime mutation API on purpose.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Fails on a duplicate name.
    pub fn register(&mut self, command: Arc<dyn Command>) -> Result<(), RegistryError> {
        let name = command.name().to_string();
        if self.commands.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        let _ = self.commands.insert(name, command);
        Ok(())
    }

    /// Look up a command by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands.get(name)
    }

    /// Whether a command is registered.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Descriptors of every registered command, sorted by name so the
    /// rendered catalog is stable across runs.
    #[must_use]
    pub fn descriptors(&self) -> Vec<CommandDescriptor> {
        let mut descriptors: Vec<_> = self.commands.values().map(|c| c.descriptor()).collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }
}
