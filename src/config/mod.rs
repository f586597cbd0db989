// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the network frontend
//!
//! This module provides functionality for loading, validating, and saving the
//! configuration of the web frontend. The configuration is backed by a YAML
//! file and validated against a JSON schema before it is deserialized.
//!
//! ## Configuration Structure
//!
//! - `azure`: Application registration and authorization groups
//! - `web`: Settings for the frontend web server
//! - `api`: Location of the backend network-management API
//!
//! All three sections are mandatory. Unlike most settings files, a missing
//! or invalid configuration is never replaced by defaults: the loader fails
//! closed and the process refuses to start. A `config.sample.yaml` is written
//! next to the requested file so the operator has something to edit.
//!
//! ## Usage
//!
//! ```no_run
//! use network_frontend::config::Config;
//!
//! let config = Config::from_file("config.yaml").unwrap();
//! println!("Backend API: {}", config.api.base_url());
//! ```

pub mod api;
pub mod azure;
pub mod utils;
pub mod web;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, error};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use api::ApiConfig;
pub use azure::AzureConfig;
pub use utils::{is_valid_ip_address, output_config_schema, validate_specific_rules};
pub use web::WebConfig;

/// JSON schema every configuration file must satisfy.
pub(crate) const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Errors raised while loading or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found at {0:?}")]
    NotFound(PathBuf),

    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML, or does not match the expected types.
    #[error("failed to parse configuration file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The file is valid YAML but misses a section or a key, or breaks a rule.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The configuration could not be written back to disk.
    #[error("failed to write configuration file {path:?}: {message}")]
    Write { path: PathBuf, message: String },
}

impl ConfigError {
    /// `true` when the file is absent, as opposed to present but unusable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::NotFound(_))
    }
}

/// Root configuration structure.
///
/// Deserialized from and serialized to YAML with serde. Field names follow
/// the kebab-case keys of the file (`redirect-uri`, `tenant-id`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Identity provider settings.
    pub azure: AzureConfig,

    /// Frontend web server settings.
    pub web: WebConfig,

    /// Backend API settings.
    pub api: ApiConfig,
}

impl Config {
    /// Write a `*.sample.yaml` file with placeholder values next to `path`.
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<PathBuf, ConfigError> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Creating sample configuration file at {:?}", sample_path);

        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                    path: parent.to_path_buf(),
                    message: e.to_string(),
                })?;
            }
        }

        Self::default().save_to_file(&sample_path)?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(sample_path)
    }

    /// Best-effort variant used on the error paths of [`Config::from_file`].
    fn offer_sample_config(path: &Path) {
        if let Err(e) = Self::create_sample_config(path) {
            error!("Failed to create sample config: {}", e);
        }
    }

    /// Validate a raw document against the embedded JSON schema.
    ///
    /// All violations are reported, each prefixed with the location of the
    /// offending value so the operator can tell which section is wrong.
    pub fn validate_document(document: &serde_json::Value) -> Result<(), ConfigError> {
        let schema: serde_json::Value = serde_json::from_str(CONFIG_SCHEMA)
            .map_err(|e| ConfigError::Invalid(format!("embedded schema is not valid JSON: {e}")))?;

        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)
            .map_err(|e| ConfigError::Invalid(format!("embedded schema is unusable: {e}")))?;

        let messages: Vec<String> = validator
            .iter_errors(document)
            .map(|err| {
                let location = err.instance_path.to_string();
                if location.is_empty() {
                    err.to_string()
                } else {
                    format!("{location}: {err}")
                }
            })
            .collect();

        if messages.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(messages.join("; ")))
        }
    }

    /// Load configuration from a file.
    ///
    /// Steps, any of which may fail:
    ///
    /// 1. the file must exist
    /// 2. it must be YAML
    /// 3. it must satisfy `resources/config.schema.json`
    /// 4. it must deserialize into [`Config`]
    /// 5. it must pass [`validate_specific_rules`]
    ///
    /// On every failure except a read error a sample file is created.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            error!("Config file not found at {:?}", path);
            Self::offer_sample_config(path);
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        // First step: convert YAML to a generic Value
        let yaml_value: serde_yml::Value =
            serde_yml::from_str(&contents).map_err(|e| {
                error!("Configuration is not valid YAML: {}", e);
                Self::offer_sample_config(path);
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?;

        // Convert to JSON Value for validation
        let json_value = serde_json::to_value(&yaml_value).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: format!("cannot convert YAML to JSON for validation: {e}"),
        })?;

        debug!("Validating {} against schema", path.display());
        if let Err(err) = Self::validate_document(&json_value) {
            error!("Config file is invalid: {}", err);
            Self::offer_sample_config(path);
            return Err(err);
        }

        let config: Config = serde_json::from_value(json_value).map_err(|e| {
            error!("Configuration deserialization error: {}", e);
            Self::offer_sample_config(path);
            ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        if let Err(err) = validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            Self::offer_sample_config(path);
            return Err(err);
        }

        Ok(config)
    }

    /// Save the configuration to a file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let write_error = |message: String| ConfigError::Write {
            path: path.to_path_buf(),
            message,
        };

        let yaml = serde_yml::to_string(self).map_err(|e| write_error(e.to_string()))?;
        let mut file = File::create(path).map_err(|e| write_error(e.to_string()))?;
        file.write_all(yaml.as_bytes())
            .map_err(|e| write_error(e.to_string()))?;

        Ok(())
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only values that are explicitly provided override the file.
    ///
    /// # Parameters
    ///
    /// * `web_port` - TCP port for the web server
    /// * `web_address` - Network address for the web server to bind to
    /// * `debug` - Force debug mode on
    pub fn apply_args(&mut self, web_port: Option<u16>, web_address: Option<String>, debug: bool) {
        if let Some(web_port) = web_port {
            debug!("Overriding port from command line: {}", web_port);
            self.web.port = web_port;
        }

        if let Some(web_address) = web_address {
            debug!("Overriding address from command line: {}", web_address);
            self.web.ip = web_address;
        }

        if debug {
            debug!("Enabling debug mode from command line");
            self.web.debug = true;
        }
    }
}
