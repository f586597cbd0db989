// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Web server configuration

use serde::{Deserialize, Serialize};

/// Settings for the front end's own HTTP server.
///
/// `debug` is mandatory and must be a literal boolean. When it is `true` the
/// authorization gate lets every request through with a placeholder user, so
/// the pages can be worked on without an identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WebConfig {
    /// Address the server binds to.
    pub ip: String,

    /// TCP port the server listens on.
    pub port: u16,

    /// Bypass login and group checks.
    pub debug: bool,

    /// JSON file listing release notes, shown on the index page.
    #[serde(default = "default_changelog")]
    pub changelog: String,

    /// Lifetime of the login session cookie, in hours.
    #[serde(default = "default_session_hours")]
    pub session_hours: i64,
}

fn default_changelog() -> String {
    "changelog.json".to_string()
}

fn default_session_hours() -> i64 {
    8
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            ip: "127.0.0.1".to_string(),
            port: 5000,
            debug: false,
            changelog: default_changelog(),
            session_hours: default_session_hours(),
        }
    }
}
