//! Immutable per-run generation settings

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::codegen::TemplateSet;

/// What to do when more than one column of a table is marked `PRI`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryKeyPolicy {
    /// Treat the table as having no single primary key
    #[default]
    Omit,
    /// Use the last column marked `PRI`
    LastWins,
    /// Fail the table
    Reject,
}

/// How table failures propagate through a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Attempt every table and report all failures together
    #[default]
    CollectAll,
    /// Stop at the first failing table
    FailFast,
}

/// Settings shared read-only by every table of a run
#[derive(Debug, Clone, PartialEq)]
pub struct CodeConfig {
    /// Destination package, relative to the output root. The last path
    /// segment is the Go package name.
    pub package_name: String,

    /// User templates replacing built-in sections
    pub templates: Option<TemplateSet>,

    pub primary_key_policy: PrimaryKeyPolicy,
}

impl CodeConfig {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            templates: None,
            primary_key_policy: PrimaryKeyPolicy::default(),
        }
    }

    pub fn with_templates(mut self, templates: TemplateSet) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn with_primary_key_policy(mut self, policy: PrimaryKeyPolicy) -> Self {
        self.primary_key_policy = policy;
        self
    }

    /// Identifier used in the `package` clause of generated files
    pub fn go_package(&self) -> &str {
        self.package_name
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.package_name)
    }
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self::new(defaults::PACKAGE_NAME)
    }
}
