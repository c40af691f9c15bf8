// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Expression Configuration Module
//!
//! Layered configuration for composite expressions. Properties can come from
//! several sources and are merged by precedence.
//!
//! ## Configuration Sources (Priority: Low to High)
//!
//! 1. **RustDefault** - Built-in defaults
//! 2. **TomlFile** - A TOML document (`[match]`, `[composite]`, `[notification]`)
//! 3. **Programmatic** - Values set in code by the embedding application
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use eventflux_combinators::core::config::*;
//!
//! let mut config = FlatConfig::with_defaults();
//! config.merge_toml_str("[match]\ncapacity = 8\n")?;
//! config.set(KEY_COMPOSITE_CAPACITY, "4", PropertySource::Programmatic);
//!
//! let settings = CombinatorSettings::from_flat_config(&config)?;
//! assert_eq!(settings.match_capacity, 8);
//! ```

use crate::core::error::{CombinatorError, CombinatorResult};
use std::collections::HashMap;
use std::path::Path;

/// Default capacity of each component's match window
pub const KEY_MATCH_CAPACITY: &str = "match.capacity";
/// Capacity of a composite's own window of triggering events
pub const KEY_COMPOSITE_CAPACITY: &str = "composite.capacity";
/// Whether to emit the single-event notification
pub const KEY_SINGLE_EVENT: &str = "notification.single-event";
/// Whether to emit the combination notification
pub const KEY_COMPLEX: &str = "notification.complex";

pub const DEFAULT_MATCH_CAPACITY: usize = 64;
pub const DEFAULT_COMPOSITE_CAPACITY: usize = 64;

/// Property source identifier with priority ordering
///
/// Higher priority sources override lower priority sources during merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertySource {
    /// Built-in defaults (priority: 0)
    RustDefault,
    /// TOML document (priority: 1)
    TomlFile,
    /// Set in code (priority: 2)
    Programmatic,
}

impl PropertySource {
    #[inline]
    pub const fn priority(&self) -> u8 {
        match self {
            PropertySource::RustDefault => 0,
            PropertySource::TomlFile => 1,
            PropertySource::Programmatic => 2,
        }
    }

    #[inline]
    pub const fn description(&self) -> &'static str {
        match self {
            PropertySource::RustDefault => "Rust default",
            PropertySource::TomlFile => "TOML file",
            PropertySource::Programmatic => "programmatic",
        }
    }
}

/// Flat key-value configuration with source tracking
#[derive(Debug, Clone, Default)]
pub struct FlatConfig {
    properties: HashMap<String, String>,
    sources: HashMap<String, PropertySource>,
}

impl FlatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration pre-populated with every built-in default
    pub fn with_defaults() -> Self {
        let mut config = Self::new();
        config.set(
            KEY_MATCH_CAPACITY,
            DEFAULT_MATCH_CAPACITY.to_string(),
            PropertySource::RustDefault,
        );
        config.set(
            KEY_COMPOSITE_CAPACITY,
            DEFAULT_COMPOSITE_CAPACITY.to_string(),
            PropertySource::RustDefault,
        );
        config.set(KEY_SINGLE_EVENT, "true", PropertySource::RustDefault);
        config.set(KEY_COMPLEX, "true", PropertySource::RustDefault);
        config
    }

    /// Set a property; only overrides values from an equal or lower priority source.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>, source: PropertySource) {
        let key = key.into();
        if let Some(existing) = self.sources.get(&key) {
            if existing.priority() > source.priority() {
                return;
            }
        }
        self.properties.insert(key.clone(), value.into());
        self.sources.insert(key, source);
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&String> {
        self.properties.get(key)
    }

    #[inline]
    pub fn get_with_source(&self, key: &str) -> Option<(&String, PropertySource)> {
        self.properties
            .get(key)
            .and_then(|value| self.sources.get(key).map(|source| (value, *source)))
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Merge another configuration into this one (respects priorities)
    pub fn merge(&mut self, other: &FlatConfig) {
        for (key, value) in &other.properties {
            if let Some(source) = other.sources.get(key) {
                self.set(key.clone(), value.clone(), *source);
            }
        }
    }

    /// Merge a TOML document; nested tables become dotted keys.
    pub fn merge_toml_str(&mut self, text: &str) -> CombinatorResult<()> {
        let table: toml::Table = toml::from_str(text)?;
        let mut flat = Vec::new();
        flatten_table("", &table, &mut flat)?;
        for (key, value) in flat {
            self.set(key, value, PropertySource::TomlFile);
        }
        Ok(())
    }

    /// Read and merge a TOML file.
    pub fn merge_toml_file(&mut self, path: impl AsRef<Path>) -> CombinatorResult<()> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loading combinator config from {}", path.as_ref().display());
        self.merge_toml_str(&text)
    }
}

fn flatten_table(
    prefix: &str,
    table: &toml::Table,
    out: &mut Vec<(String, String)>,
) -> CombinatorResult<()> {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(inner) => flatten_table(&full_key, inner, out)?,
            toml::Value::String(s) => out.push((full_key, s.clone())),
            toml::Value::Integer(i) => out.push((full_key, i.to_string())),
            toml::Value::Float(f) => out.push((full_key, f.to_string())),
            toml::Value::Boolean(b) => out.push((full_key, b.to_string())),
            other => {
                return Err(CombinatorError::configuration_with_key(
                    format!("unsupported value type '{}'", other.type_str()),
                    full_key,
                ))
            }
        }
    }
    Ok(())
}

/// Typed, validated settings used when building expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinatorSettings {
    pub match_capacity: usize,
    pub composite_capacity: usize,
    pub emit_single_event: bool,
    pub emit_complex: bool,
}

impl Default for CombinatorSettings {
    fn default() -> Self {
        Self {
            match_capacity: DEFAULT_MATCH_CAPACITY,
            composite_capacity: DEFAULT_COMPOSITE_CAPACITY,
            emit_single_event: true,
            emit_complex: true,
        }
    }
}

impl CombinatorSettings {
    /// Resolve settings; keys missing from `config` fall back to defaults.
    pub fn from_flat_config(config: &FlatConfig) -> CombinatorResult<Self> {
        let defaults = Self::default();
        let settings = Self {
            match_capacity: parse_capacity(config, KEY_MATCH_CAPACITY, defaults.match_capacity)?,
            composite_capacity: parse_capacity(
                config,
                KEY_COMPOSITE_CAPACITY,
                defaults.composite_capacity,
            )?,
            emit_single_event: parse_bool(config, KEY_SINGLE_EVENT, defaults.emit_single_event)?,
            emit_complex: parse_bool(config, KEY_COMPLEX, defaults.emit_complex)?,
        };
        Ok(settings)
    }

    /// Load from a TOML file layered over the defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> CombinatorResult<Self> {
        let mut config = FlatConfig::with_defaults();
        config.merge_toml_file(path)?;
        Self::from_flat_config(&config)
    }

    pub fn with_match_capacity(mut self, capacity: usize) -> Self {
        self.match_capacity = capacity;
        self
    }

    pub fn with_composite_capacity(mut self, capacity: usize) -> Self {
        self.composite_capacity = capacity;
        self
    }
}

fn parse_capacity(config: &FlatConfig, key: &str, default: usize) -> CombinatorResult<usize> {
    let Some(raw) = config.get(key) else {
        return Ok(default);
    };
    let value: usize = raw.trim().parse().map_err(|_| {
        CombinatorError::configuration_with_key(
            format!("'{raw}' is not a valid capacity"),
            key,
        )
    })?;
    if value == 0 {
        return Err(CombinatorError::configuration_with_key(
            "capacity must be at least 1",
            key,
        ));
    }
    Ok(value)
}

fn parse_bool(config: &FlatConfig, key: &str, default: bool) -> CombinatorResult<bool> {
    match config.get(key).map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) if v == "true" => Ok(true),
        Some(v) if v == "false" => Ok(false),
        Some(v) => Err(CombinatorError::configuration_with_key(
            format!("'{v}' is not a boolean (expected 'true' or 'false')"),
            key,
        )),
    }
}
