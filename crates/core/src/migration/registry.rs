//! Migration registry.
//!
//! The registry is an explicit value built at process start. It performs no
//! I/O and yields its steps in ascending identifier order, whatever order
//! they were registered in.

use std::collections::BTreeMap;

use stint_shared::MigrationId;

use super::error::MigrationError;
use super::step::Migration;

/// Ordered set of migration steps.
#[derive(Default)]
pub struct MigrationRegistry {
    steps: BTreeMap<MigrationId, Box<dyn Migration>>,
}

impl MigrationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a list of steps.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateMigrationId` if two steps share an identifier.
    pub fn from_steps(
        steps: impl IntoIterator<Item = Box<dyn Migration>>,
    ) -> Result<Self, MigrationError> {
        let mut registry = Self::new();
        for step in steps {
            registry.register_boxed(step)?;
        }
        Ok(registry)
    }

    /// Adds a step.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateMigrationId` if a step with the same identifier is
    /// already registered.
    pub fn register(&mut self, step: impl Migration + 'static) -> Result<&mut Self, MigrationError> {
        self.register_boxed(Box::new(step))
    }

    /// Adds a boxed step.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateMigrationId` if a step with the same identifier is
    /// already registered.
    pub fn register_boxed(&mut self, step: Box<dyn Migration>) -> Result<&mut Self, MigrationError> {
        let id = step.id();
        if self.steps.contains_key(&id) {
            return Err(MigrationError::DuplicateMigrationId(id));
        }
        self.steps.insert(id, step);
        Ok(self)
    }

    /// Iterates over steps in ascending identifier order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &dyn Migration> {
        self.steps.values().map(|step| &**step)
    }

    /// Iterates over identifiers in ascending order.
    pub fn ids(&self) -> impl DoubleEndedIterator<Item = MigrationId> + '_ {
        self.steps.keys().copied()
    }

    /// Finds a step by identifier.
    #[must_use]
    pub fn get(&self, id: MigrationId) -> Option<&dyn Migration> {
        self.steps.get(&id).map(|step| &**step)
    }

    /// Returns true if a step is registered.
    #[must_use]
    pub fn contains(&self, id: MigrationId) -> bool {
        self.steps.contains_key(&id)
    }

    /// Number of registered steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if no step is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl std::fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.steps.values().map(|step| (step.id(), step.name())))
            .finish()
    }
}
