// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./cita.toml` > `~/.config/cita/cita.toml` > `/etc/cita/cita.toml`
//! with environment variable overrides via `CITA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CitaConfig;

/// System-wide config file location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/cita/cita.toml";

/// Local config file name, looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "cita.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/cita/cita.toml` (system-wide)
/// 3. `~/.config/cita/cita.toml` (user XDG config)
/// 4. `./cita.toml` (local directory)
/// 5. `CITA_*` environment variables
pub fn load_config() -> Result<CitaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CitaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CitaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CitaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CitaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CitaConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Path of the per-user config file, if the platform has a config directory.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("cita").join(LOCAL_CONFIG_FILE))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CITA_STORAGE_DATABASE_PATH` must map to `storage.database_path`,
/// not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("CITA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("scheduling_", "scheduling.", 1);
        mapped.into()
    })
}
