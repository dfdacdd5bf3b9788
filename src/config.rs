#![forbid(unsafe_code)]

//! Alias definitions loaded from TOML
//!
//! ```toml
//! [variant]
//! name = "UserValidations"
//!
//! [[alias]]
//! name = "required"
//! validation = "presence"
//! params = true
//! ```
//!
//! Aliases are defined in file order, so an alias may target any alias
//! declared above it.

use crate::error::{ConfigError, Error};
use crate::types::{ValidationName, Value};
use crate::variant::{RESERVED_NAMES, Variant};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Contents of an alias file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AliasConfig {
    /// Variant metadata
    #[serde(default)]
    pub variant: VariantMeta,

    /// Value aliases, in definition order
    #[serde(default, rename = "alias")]
    pub aliases: Vec<AliasEntry>,
}

/// `[variant]` section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VariantMeta {
    /// Name of the derived variant; anonymous when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A single `[[alias]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasEntry {
    /// Name of the new alias
    pub name: ValidationName,

    /// Validation or alias the new alias forwards to
    pub validation: ValidationName,

    /// Fixed parameters passed to the target
    pub params: Value,
}

impl AliasConfig {
    /// Load alias definitions from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse alias definitions from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AliasConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for entry in &self.aliases {
            if RESERVED_NAMES.contains(&entry.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Alias '{}' uses a reserved name",
                    entry.name
                )));
            }
        }
        if let Some(name) = &self.variant.name
            && name.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "Variant name must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Derives a variant from `parent` and defines every alias on it
    ///
    /// # Errors
    ///
    /// Returns `Error::Define` for the first alias whose target is unknown.
    /// Nothing is defined on `parent`.
    pub fn build(&self, parent: &Variant) -> Result<Variant, Error> {
        let variant = match &self.variant.name {
            Some(name) => parent.derive_named(name.clone()),
            None => parent.derive(),
        };
        for entry in &self.aliases {
            variant.define_value(
                entry.name.as_str(),
                entry.validation.as_str(),
                entry.params.clone(),
            )?;
        }
        tracing::debug!(
            variant = %variant.display_name(),
            aliases = self.aliases.len(),
            "Built variant from alias file"
        );
        Ok(variant)
    }
}
