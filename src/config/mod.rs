//! Configuration Management
//!
//! This module handles loading and saving database profiles.
//!
//! # Profile Location
//! Profiles live in one per-user registry file:
//! `~/.config/bazaar/profiles.json`
//!
//! # Resolution Precedence
//! 1. Explicit `--db` path (highest priority)
//! 2. Named profile (`--profile`)
//! 3. Default profile from the registry
//! 4. `bazaar.db` in the current directory

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BazaarError, Result};

/// A named database profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Path to the database file
    pub file: PathBuf,
}

/// Profile registry (stored in `~/.config/bazaar/profiles.json`)
///
/// Format: `{ "profiles": { "dev": { "file": "dev.db" } }, "default": "dev" }`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileRegistry {
    /// Named profiles
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    /// Name of the default profile (must exist in the profiles map)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ProfileRegistry {
    /// Look up a named profile's database path.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        self.profiles
            .get(name)
            .map(|p| p.file.clone())
            .ok_or_else(|| BazaarError::config_error(format!("Profile '{name}' not found")))
    }

    /// Database path of the default profile, if one is configured.
    #[must_use]
    pub fn default_database(&self) -> Option<PathBuf> {
        let name = self.default.as_deref()?;
        self.profiles.get(name).map(|p| p.file.clone())
    }
}

/// Get the path to the registry file (`~/.config/bazaar/profiles.json`)
pub fn registry_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| BazaarError::config_error("Could not determine user config directory"))?;

    Ok(config_dir.join("bazaar").join("profiles.json"))
}

/// Load the profile registry from a file
///
/// A missing file yields an empty registry; a malformed file is an error.
pub fn load_registry(path: &Path) -> Result<ProfileRegistry> {
    if !path.exists() {
        return Ok(ProfileRegistry::default());
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| BazaarError::config_error(format!("Could not read profile file: {e}")))?;

    serde_json::from_str(&contents)
        .map_err(|e| BazaarError::config_error(format!("Could not parse profile file: {e}")))
}

/// Save the profile registry to a file, creating parent directories as needed
pub fn save_registry(path: &Path, registry: &ProfileRegistry) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            BazaarError::config_error(format!("Could not create config directory: {e}"))
        })?;
    }

    let contents = serde_json::to_string_pretty(registry)
        .map_err(|e| BazaarError::config_error(format!("Could not serialize profiles: {e}")))?;

    fs::write(path, contents)
        .map_err(|e| BazaarError::config_error(format!("Could not write profile file: {e}")))
}

/// Resolve the database path from the command line and the registry.
pub fn resolve_database(explicit: Option<PathBuf>, profile: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    let registry = load_registry(&registry_path()?)?;

    if let Some(name) = profile {
        return registry.resolve(name);
    }

    Ok(registry.default_database().unwrap_or_else(|| PathBuf::from("bazaar.db")))
}
