//! Compiler configuration
//!
//! Loaded from TOML, with a few environment overrides on top. Everything the
//! driver needs for the header and the version cutoffs travels in
//! [`CompilerConfig`]; nothing is read from globals.

use crate::capabilities::{
    default_gated_generics, default_rules, Capability, CapabilityRegistry, CapabilityRule,
};
use crate::error::{GemRbiError, GemRbiResult};
use crate::walker::SymbolWalker;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_STRICTNESS: &str = "true";
pub const DEFAULT_REGEN_COMMAND: &str = "bin/tapioca gem";

/// Configuration for the compiler: output header, capability cutoffs and
/// weak-collection templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Sigil written as `# typed: <strictness>`
    pub strictness: String,
    /// Command the header tells readers to rerun, followed by the package name
    pub regen_command: String,
    /// Extra comment lines emitted after the regeneration notice
    pub banner: Vec<String>,
    /// Version cutoffs of the downstream type checker
    pub capabilities: Vec<CapabilityRule>,
    /// Generic families rendered bare unless their capability holds
    pub gated_generics: IndexMap<String, Capability>,
    /// Classes whose instances are typed as `Template[T.untyped]`
    pub weak_collection_templates: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            strictness: DEFAULT_STRICTNESS.to_string(),
            regen_command: DEFAULT_REGEN_COMMAND.to_string(),
            banner: Vec::new(),
            capabilities: default_rules(),
            gated_generics: default_gated_generics(),
            weak_collection_templates: SymbolWalker::default().templates().to_vec(),
        }
    }
}

impl CompilerConfig {
    /// Create a configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> GemRbiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| GemRbiError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> GemRbiResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `GEMRBI_REGEN_COMMAND` and `GEMRBI_STRICTNESS` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(command) = lookup("GEMRBI_REGEN_COMMAND").filter(|v| !v.trim().is_empty()) {
            self.regen_command = command;
        }
        if let Some(strictness) = lookup("GEMRBI_STRICTNESS").filter(|v| !v.trim().is_empty()) {
            self.strictness = strictness;
        }
        self
    }

    pub fn registry(&self) -> CapabilityRegistry {
        CapabilityRegistry::new(self.capabilities.clone(), self.gated_generics.clone())
    }

    pub fn walker(&self) -> SymbolWalker {
        SymbolWalker::new(self.weak_collection_templates.clone())
    }

    /// The comment block written above every interface file body.
    pub fn header_for(&self, package: &str) -> String {
        let mut lines = vec![
            format!("# typed: {}", self.strictness),
            String::new(),
            "# DO NOT EDIT MANUALLY".to_string(),
            format!(
                "# This is an autogenerated file for types exported from the `{}` gem.",
                package
            ),
            format!(
                "# Please instead update this file by running `{} {}`.",
                self.regen_command, package
            ),
        ];
        lines.extend(self.banner.iter().map(|line| format!("# {}", line)));
        lines.join("\n")
    }
}
