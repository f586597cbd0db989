// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::{debug, warn};

use super::{Config, ConfigError, CONFIG_SCHEMA};

/// Routes owned by the frontend itself; the callback path must not shadow them.
const RESERVED_PATHS: &[&str] = &[
    "/",
    "/login",
    "/logout",
    "/unauthorized",
    "/devices",
    "/objects",
    "/policies",
    "/globalprotect",
    "/vpn",
    "/settings",
];

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// # Example
///
/// ```bash
/// ./network_frontend --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Check if a string is a valid IP address
///
/// Validates that a string represents a valid IPv4 or IPv6 address,
/// or is one of the special values like "localhost" or "0.0.0.0".
pub fn is_valid_ip_address(addr: &str) -> bool {
    if addr.parse::<std::net::IpAddr>().is_ok() {
        return true;
    }

    // Special cases
    matches!(addr, "localhost" | "::" | "::0" | "0.0.0.0")
}

/// Validates the configuration against rules the JSON schema cannot express.
///
/// # Validation Rules
///
/// - **Callback path**: `redirect-uri` is an absolute path, carries no query
///   string and does not collide with a page route
/// - **Groups**: the admin and helpdesk groups are not blank
/// - **Addresses**: web and api addresses that are neither IP literals nor
///   special values only raise a warning, since host names are legitimate
pub fn validate_specific_rules(config: &Config) -> Result<(), ConfigError> {
    debug!("Performing additional validation checks");

    let redirect = config.azure.redirect_uri.as_str();
    if !redirect.starts_with('/') {
        return Err(ConfigError::Invalid(format!(
            "azure redirect-uri must be a path starting with '/', got '{redirect}'"
        )));
    }
    if redirect.contains('?') || redirect.contains('#') {
        return Err(ConfigError::Invalid(format!(
            "azure redirect-uri must not contain a query or fragment, got '{redirect}'"
        )));
    }
    let normalized = match redirect.trim_end_matches('/') {
        "" => "/",
        path => path,
    };
    if RESERVED_PATHS.contains(&normalized) || normalized.starts_with("/static") {
        return Err(ConfigError::Invalid(format!(
            "azure redirect-uri '{redirect}' collides with a page route"
        )));
    }

    if config.azure.admin_group.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "azure admin-group must not be blank".to_string(),
        ));
    }
    if config.azure.helpdesk_group.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "azure helpdesk-group must not be blank".to_string(),
        ));
    }

    if config.web.port == 0 || config.api.port == 0 {
        return Err(ConfigError::Invalid("port 0 is not allowed".to_string()));
    }

    if !is_valid_ip_address(&config.web.ip) {
        warn!("Potentially invalid web address format: {}", config.web.ip);
    }
    if !is_valid_ip_address(&config.api.ip) {
        warn!("Potentially invalid API address format: {}", config.api.ip);
    }

    if config.web.debug {
        warn!("Debug mode is enabled: login and group checks are bypassed");
    }

    Ok(())
}
