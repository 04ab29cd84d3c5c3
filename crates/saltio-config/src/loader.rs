// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./saltio.toml` > `~/.config/saltio/saltio.toml` > `/etc/saltio/saltio.toml`
//! with environment variable overrides via `SALTIO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SaltioConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/saltio/saltio.toml` (system-wide)
/// 3. `~/.config/saltio/saltio.toml` (user XDG config)
/// 4. `./saltio.toml` (local directory)
/// 5. `SALTIO_*` environment variables
pub fn load_config() -> Result<SaltioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SaltioConfig::default()))
        .merge(Toml::file("/etc/saltio/saltio.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("saltio/saltio.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("saltio.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<SaltioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SaltioConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SaltioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SaltioConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `SALTIO_STORAGE_DATABASE_PATH` must map
/// to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("SALTIO_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: SALTIO_RECONCILE_SWEEP_INTERVAL_SECS -> "reconcile_sweep_interval_secs"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("facility_", "facility.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("reconcile_", "reconcile.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_string_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [facility]
            company_id = "park-01"
            hourly_rate = 55.0

            [reconcile]
            sweep_interval_secs = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.facility.company_id, "park-01");
        assert_eq!(config.facility.hourly_rate, 55.0);
        assert_eq!(config.reconcile.sweep_interval_secs, 2);
        // Untouched sections keep defaults.
        assert_eq!(config.service.log_level, "info");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = load_config_from_str(
            r#"
            [service]
            naem = "typo"
            "#,
        );
        assert!(result.is_err());
    }
}
