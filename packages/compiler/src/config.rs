//! Compiler Configuration

use serde::{Deserialize, Serialize};

use crate::error::{CompilerError, Result};
use crate::logging::LogLevel;

/// What to do when one element carries more than one structural directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructuralConflict {
    /// Report `CompilerError::ConflictingStructural`.
    #[default]
    Reject,
    /// Keep the directive enumerated first, drop the others.
    FirstWins,
    /// Keep the directive enumerated last, drop the others.
    LastWins,
}

/// Compiler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfig {
    /// Attribute prefix marking a directive, `v-` by default
    pub directive_prefix: String,
    /// Abort on the first directive error instead of recording a diagnostic
    /// and moving on to the next directive or sibling
    pub strict: bool,
    /// Policy for co-occurring `if` and `for` directives
    pub structural_conflict: StructuralConflict,
    /// Level used by the console logger built from this config
    pub log_level: LogLevel,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            directive_prefix: "v-".to_string(),
            strict: false,
            structural_conflict: StructuralConflict::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: CompilerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.directive_prefix = prefix.into();
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_structural_conflict(mut self, policy: StructuralConflict) -> Self {
        self.structural_conflict = policy;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.directive_prefix.is_empty() {
            return Err(CompilerError::InvalidConfig(
                "directive prefix must not be empty".to_string(),
            ));
        }
        if self.directive_prefix.contains(':') {
            return Err(CompilerError::InvalidConfig(format!(
                "directive prefix '{}' must not contain ':'",
                self.directive_prefix
            )));
        }
        Ok(())
    }
}
