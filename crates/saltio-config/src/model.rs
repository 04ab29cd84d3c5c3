// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Saltio service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Saltio configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SaltioConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// The facility this instance serves.
    #[serde(default)]
    pub facility: FacilityConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Reconciliation scheduler settings.
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service instance.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "saltio".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Facility configuration: the company all controllers operate under.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FacilityConfig {
    /// Company identifier scoping sessions, tills, and tabs.
    #[serde(default = "default_company_id")]
    pub company_id: String,

    /// Default hourly price for session time items.
    #[serde(default = "default_hourly_rate")]
    pub hourly_rate: f64,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            company_id: default_company_id(),
            hourly_rate: default_hourly_rate(),
        }
    }
}

fn default_company_id() -> String {
    "default".to_string()
}

fn default_hourly_rate() -> f64 {
    40.0
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Whether to enable WAL journaling mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("saltio/saltio.db").display().to_string())
        .unwrap_or_else(|| "saltio.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Reconciliation scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Seconds between expiry sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Seconds between suppression cleanup passes.
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,

    /// Lifetime of a suppression entry before a still-expired session
    /// re-notifies.
    #[serde(default = "default_suppression_ttl_secs")]
    pub suppression_ttl_secs: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            suppression_ttl_secs: default_suppression_ttl_secs(),
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    5
}

fn default_cleanup_interval_secs() -> u64 {
    30
}

fn default_suppression_ttl_secs() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = SaltioConfig::default();
        assert_eq!(config.service.name, "saltio");
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.facility.company_id, "default");
        assert!(config.storage.wal_mode);
        assert_eq!(config.reconcile.sweep_interval_secs, 5);
        assert_eq!(config.reconcile.cleanup_interval_secs, 30);
        assert_eq!(config.reconcile.suppression_ttl_secs, 60);
    }
}
