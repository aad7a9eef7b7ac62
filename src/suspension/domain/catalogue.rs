//! Fixed task catalogues for the two identity systems.

use super::{ParseSystemGroupError, SuspensionDomainError, TaskKey};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identity system owning a catalogue of tasks.
///
/// Declaration order is execution order: every [`SystemGroup::Directory`]
/// task runs before any [`SystemGroup::CloudIdentity`] task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemGroup {
    /// On-premises directory service.
    Directory,
    /// Hosted cloud identity provider.
    CloudIdentity,
}

impl SystemGroup {
    /// Groups in the order a run visits them.
    pub const EXECUTION_ORDER: [Self; 2] = [Self::Directory, Self::CloudIdentity];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::CloudIdentity => "cloud_identity",
        }
    }

    /// Returns the operator-facing heading for the group.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Directory => "Active Directory",
            Self::CloudIdentity => "Google",
        }
    }
}

impl fmt::Display for SystemGroup {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SystemGroup {
    type Error = ParseSystemGroupError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "directory" => Ok(Self::Directory),
            "cloud_identity" => Ok(Self::CloudIdentity),
            _ => Err(ParseSystemGroupError(value.to_owned())),
        }
    }
}

/// Immutable definition of one remediation task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    key: TaskKey,
    label: String,
    group: SystemGroup,
    reveals_credential: bool,
}

impl TaskDefinition {
    /// Creates a task definition.
    ///
    /// # Errors
    ///
    /// Returns a [`SuspensionDomainError`] when the key is invalid or the
    /// label is blank.
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        group: SystemGroup,
    ) -> Result<Self, SuspensionDomainError> {
        let label_value = label.into();
        if label_value.trim().is_empty() {
            return Err(SuspensionDomainError::EmptyTaskLabel);
        }
        Ok(Self {
            key: TaskKey::new(key)?,
            label: label_value,
            group,
            reveals_credential: false,
        })
    }

    /// Marks the task as the one whose completion reveals the placeholder
    /// credential.
    #[must_use]
    pub const fn revealing_credential(mut self) -> Self {
        self.reveals_credential = true;
        self
    }

    /// Returns the task key.
    #[must_use]
    pub const fn key(&self) -> &TaskKey {
        &self.key
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the owning system group.
    #[must_use]
    pub const fn group(&self) -> SystemGroup {
        self.group
    }

    /// Returns whether completing this task reveals the placeholder
    /// credential.
    #[must_use]
    pub const fn reveals_credential(&self) -> bool {
        self.reveals_credential
    }
}

/// The two ordered task catalogues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCatalogue {
    definitions: Vec<TaskDefinition>,
}

impl TaskCatalogue {
    /// Builds a catalogue from definitions listed in catalogue order.
    ///
    /// Definitions may be interleaved across groups; they are stably
    /// regrouped into execution order, preserving the relative order within
    /// each group.
    ///
    /// # Errors
    ///
    /// Returns [`SuspensionDomainError::DuplicateTaskKey`] when two
    /// definitions share a key.
    pub fn new(
        definitions: impl IntoIterator<Item = TaskDefinition>,
    ) -> Result<Self, SuspensionDomainError> {
        let mut ordered: Vec<TaskDefinition> = definitions.into_iter().collect();
        let mut seen = HashSet::new();
        for definition in &ordered {
            if !seen.insert(definition.key.clone()) {
                return Err(SuspensionDomainError::DuplicateTaskKey {
                    key: definition.key.clone(),
                    group: definition.group,
                });
            }
        }
        ordered.sort_by_key(TaskDefinition::group);
        Ok(Self {
            definitions: ordered,
        })
    }

    /// Returns the standard offboarding catalogue.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in definitions; the signature keeps
    /// construction on the validated path.
    pub fn standard() -> Result<Self, SuspensionDomainError> {
        use SystemGroup::{CloudIdentity, Directory};
        Self::new([
            TaskDefinition::new("password", "Reset Password", Directory)?.revealing_credential(),
            TaskDefinition::new("groups", "Remove from AD Groups", Directory)?,
            TaskDefinition::new("ou", "Move to Suspended OU", Directory)?,
            TaskDefinition::new("suspend", "Suspend in AD", Directory)?,
            TaskDefinition::new("gpassword", "Change Google Password", CloudIdentity)?,
            TaskDefinition::new("gou", "Move Google OU", CloudIdentity)?,
            TaskDefinition::new("ggroups", "Remove from Google Groups", CloudIdentity)?,
        ])
    }

    /// Returns every definition in execution order.
    #[must_use]
    pub fn definitions(&self) -> &[TaskDefinition] {
        &self.definitions
    }

    /// Returns the definitions belonging to `group`, in catalogue order.
    pub fn group(&self, group: SystemGroup) -> impl Iterator<Item = &TaskDefinition> {
        self.definitions
            .iter()
            .filter(move |definition| definition.group == group)
    }

    /// Finds a definition by key.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&TaskDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.key.as_str() == key)
    }
}
