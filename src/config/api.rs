// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Backend API configuration

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Location of the network-management API the dashboards read from.
///
/// The browser also talks to this service directly, so the base URL is
/// passed to every template as `api_base_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApiConfig {
    /// Host name or address of the API service.
    pub ip: String,

    /// TCP port of the API service.
    pub port: u16,

    /// Request timeout in seconds for server-side calls.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_timeout() -> u64 {
    10
}

impl ApiConfig {
    /// `http://{ip}:{port}`, with IPv6 literals in brackets.
    pub fn base_url(&self) -> String {
        match self.ip.parse::<IpAddr>() {
            Ok(IpAddr::V6(ip)) => format!("http://[{}]:{}", ip, self.port),
            _ => format!("http://{}:{}", self.ip, self.port),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            ip: "127.0.0.1".to_string(),
            port: 5100,
            timeout: default_timeout(),
        }
    }
}
