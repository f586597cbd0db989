// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Azure AD (Entra ID) configuration
//!
//! This module defines the `azure` section of the configuration file: the
//! application registration used for the authorization-code grant and the
//! two identity-provider groups the authorization gate checks against.

use serde::{Deserialize, Serialize};

/// Application registration settings for the identity provider.
///
/// The YAML keys are kebab-case, matching the format operators already use:
///
/// ```yaml
/// azure:
///   redirect-uri: /callback
///   tenant-id: 8f4a1c2e-...
///   app-id: 0b6d5e4f-...
///   app-secret: "..."
///   admin-group: 3c9e7a10-...
///   helpdesk-group: 5d1f8b22-...
/// ```
///
/// ### Groups
///
/// `admin-group` and `helpdesk-group` are group object IDs as they appear in
/// the `groups` claim of the identity token. Members of either group may view
/// the dashboards; only members of the admin group may open the settings page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AzureConfig {
    /// Path of the OAuth2 callback route, e.g. `/callback`.
    ///
    /// The absolute redirect URL sent to the identity provider is built from
    /// the host of the incoming request and this path, so the same value must
    /// be registered (with scheme and host) in the application registration.
    pub redirect_uri: String,

    /// Directory (tenant) ID.
    pub tenant_id: String,

    /// Application (client) ID.
    pub app_id: String,

    /// Client secret of the application registration.
    pub app_secret: String,

    /// Group object ID granting full access.
    pub admin_group: String,

    /// Group object ID granting access to the dashboards.
    pub helpdesk_group: String,

    /// Base URL of the identity provider.
    ///
    /// Defaults to the public Azure cloud. Sovereign clouds use a different
    /// login host.
    #[serde(default = "default_authority")]
    pub authority: String,

    /// Delegated permissions requested in addition to `openid profile`.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

fn default_authority() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_scopes() -> Vec<String> {
    vec!["User.Read".to_string()]
}

impl AzureConfig {
    /// Tenant-scoped base URL, `{authority}/{tenant}`.
    pub fn tenant_url(&self) -> String {
        format!(
            "{}/{}",
            self.authority.trim_end_matches('/'),
            self.tenant_id
        )
    }

    /// Groups allowed to view the dashboards.
    pub fn staff_groups(&self) -> Vec<&str> {
        vec![self.admin_group.as_str(), self.helpdesk_group.as_str()]
    }

    /// Groups allowed to change or view the application settings.
    pub fn admin_groups(&self) -> Vec<&str> {
        vec![self.admin_group.as_str()]
    }
}

impl Default for AzureConfig {
    /// Placeholder values written into `config.sample.yaml`.
    fn default() -> Self {
        Self {
            redirect_uri: "/callback".to_string(),
            tenant_id: "00000000-0000-0000-0000-000000000000".to_string(),
            app_id: "00000000-0000-0000-0000-000000000000".to_string(),
            app_secret: "change-me".to_string(),
            admin_group: "00000000-0000-0000-0000-000000000001".to_string(),
            helpdesk_group: "00000000-0000-0000-0000-000000000002".to_string(),
            authority: default_authority(),
            scopes: default_scopes(),
        }
    }
}
