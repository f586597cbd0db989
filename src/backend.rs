// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Client for the backend network-management API
//!
//! The pages are mostly static shells whose scripts call the API from the
//! browser. Only the devices page is filled server-side, from three listing
//! calls of the form `GET /api/{resource}?action={action}`. A failed call is
//! not fatal: the page renders with an empty list for that resource.

use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ApiConfig;

/// Failures talking to the backend API.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request could not be sent or the connection failed.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with something other than 200 OK.
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body was not JSON.
    #[error("{url} returned an unreadable body: {message}")]
    Decode { url: String, message: String },
}

/// Listing data rendered on the devices page.
///
/// Each list is `None` when its call failed, and its count is then 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceOverview {
    pub device_list: Option<Value>,
    pub ha_list: Option<Value>,
    pub site_list: Option<Value>,
    pub device_count: usize,
    pub ha_count: usize,
    pub site_count: usize,
}

/// Number of entries in a listing, whether the API sent an array or a map.
fn entry_count(value: Option<&Value>) -> usize {
    match value {
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(map)) => map.len(),
        _ => 0,
    }
}

/// HTTP client bound to the configured API base URL.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client from the `api` configuration section.
    pub fn from_config(config: &ApiConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url(),
        })
    }

    /// Base URL of the API, as handed to the page scripts.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}{path}?action={action}` and decode the JSON body.
    pub async fn get_json(&self, path: &str, action: &str) -> Result<Value, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Backend request: {}?action={}", url, action);

        let response = self
            .http
            .get(&url)
            .query(&[("action", action)])
            .send()
            .await
            .map_err(|source| BackendError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(BackendError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| BackendError::Decode {
                url,
                message: e.to_string(),
            })
    }

    /// Like [`BackendClient::get_json`], but a failure only logs a warning.
    pub async fn get_list(&self, path: &str, action: &str) -> Option<Value> {
        match self.get_json(path, action).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Backend listing unavailable: {}", e);
                None
            }
        }
    }

    /// Fetch devices, HA pairs and sites concurrently.
    pub async fn device_overview(&self) -> DeviceOverview {
        let (device_list, ha_list, site_list) = tokio::join!(
            self.get_list("/api/device", "list"),
            self.get_list("/api/device", "ha"),
            self.get_list("/api/site", "list"),
        );

        DeviceOverview {
            device_count: entry_count(device_list.as_ref()),
            ha_count: entry_count(ha_list.as_ref()),
            site_count: entry_count(site_list.as_ref()),
            device_list,
            ha_list,
            site_list,
        }
    }
}
