// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Dashboard pages
//!
//! Every page is a template rendered with a common base context:
//!
//! - `debug_mode`: whether the authorization gate is bypassed
//! - `api_base_url`: where the page scripts reach the backend API
//! - `app_version`: version of this program
//! - `user`: display name of the signed-in user, when known
//! - `is_admin`: whether the settings link is shown
//! - `page`: name of the page, for the navigation bar
//!
//! plus the page's own values, merged on top.

use std::path::Path;
use std::sync::Arc;

use log::{error, warn};
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::{get, State};
use serde_json::{json, Map, Value};

use super::guards::{AccessPolicy, AdminAccess, Authorized, StaffAccess};
use super::request_guard::ConnectionInfo;
use super::session::UserSession;
use super::templates::TemplateRenderer;
use crate::backend::BackendClient;
use crate::config::Config;

/// Web framework reported on the index page.
const FRAMEWORK: &str = "Rocket 0.5";

/// Context shared by every page.
fn base_context(config: &Config, user: Option<&UserSession>, page: &str) -> Map<String, Value> {
    let is_admin = config.web.debug
        || user
            .map(|user| user.is_member_of_any(&AdminAccess::allowed_groups(&config.azure)))
            .unwrap_or(false);

    let mut context = Map::new();
    context.insert("debug_mode".into(), json!(config.web.debug));
    context.insert("api_base_url".into(), json!(config.api.base_url()));
    context.insert("app_version".into(), json!(env!("CARGO_PKG_VERSION")));
    context.insert(
        "user".into(),
        json!(user.and_then(|user| user.display_name())),
    );
    context.insert("is_admin".into(), json!(is_admin));
    context.insert("page".into(), json!(page));
    context
}

/// Render `template` with the base context and `extra`.
pub(crate) fn render_page(
    renderer: &TemplateRenderer,
    config: &Config,
    user: Option<&UserSession>,
    template: &str,
    extra: Value,
) -> Result<RawHtml<String>, Status> {
    let mut context = base_context(config, user, template);
    if let Value::Object(values) = extra {
        context.extend(values);
    }

    renderer
        .render(template, &Value::Object(context))
        .map(RawHtml)
        .map_err(|e| {
            error!("Failed to render {}: {}", template, e);
            Status::InternalServerError
        })
}

/// Release notes shown on the index page.
///
/// A missing or malformed file is not an error: the page renders with an
/// empty list.
pub async fn load_changelog(path: &Path) -> Value {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Changelog {} unavailable: {}", path.display(), e);
            return json!([]);
        }
    };

    match serde_json::from_str(&contents) {
        Ok(changelog) => changelog,
        Err(e) => {
            warn!("Changelog {} is not valid JSON: {}", path.display(), e);
            json!([])
        }
    }
}

/// Hide all but the first four characters of a secret.
fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "*".repeat(8)
    } else {
        format!("{visible}{}", "*".repeat(8))
    }
}

/// Home page: environment, signed-in identity and release notes.
#[get("/")]
pub async fn index(
    auth: Authorized<StaffAccess>,
    connection: ConnectionInfo,
    renderer: &State<TemplateRenderer>,
    config: &State<Arc<Config>>,
) -> Result<RawHtml<String>, Status> {
    let changelog = load_changelog(Path::new(&config.web.changelog)).await;
    let user = &auth.user;

    render_page(
        renderer,
        config,
        Some(user),
        "index",
        json!({
            "framework_version": FRAMEWORK,
            "ip_address": connection.ip.to_string(),
            "os_version": format!("{} ({})", std::env::consts::OS, std::env::consts::FAMILY),
            "arch": std::env::consts::ARCH,
            "user_name": user.preferred_username,
            "groups": user.groups,
            "changelog": changelog,
        }),
    )
}

/// Landing page for signed-in users outside the allowed groups.
#[get("/unauthorized")]
pub fn unauthorized(
    renderer: &State<TemplateRenderer>,
    config: &State<Arc<Config>>,
) -> Result<RawHtml<String>, Status> {
    render_page(renderer, config, None, "unauthorized", json!({}))
}

/// Device inventory, HA pairs and sites, fetched from the backend.
#[get("/devices")]
pub async fn devices(
    auth: Authorized<StaffAccess>,
    renderer: &State<TemplateRenderer>,
    config: &State<Arc<Config>>,
    backend: &State<BackendClient>,
) -> Result<RawHtml<String>, Status> {
    let overview = backend.device_overview().await;
    let extra = serde_json::to_value(&overview).map_err(|e| {
        error!("Failed to serialize device overview: {}", e);
        Status::InternalServerError
    })?;

    render_page(renderer, config, Some(&auth.user), "devices", extra)
}

#[get("/objects")]
pub fn objects(
    auth: Authorized<StaffAccess>,
    renderer: &State<TemplateRenderer>,
    config: &State<Arc<Config>>,
) -> Result<RawHtml<String>, Status> {
    render_page(renderer, config, Some(&auth.user), "objects", json!({}))
}

#[get("/policies")]
pub fn policies(
    auth: Authorized<StaffAccess>,
    renderer: &State<TemplateRenderer>,
    config: &State<Arc<Config>>,
) -> Result<RawHtml<String>, Status> {
    render_page(renderer, config, Some(&auth.user), "policies", json!({}))
}

#[get("/globalprotect")]
pub fn globalprotect(
    auth: Authorized<StaffAccess>,
    renderer: &State<TemplateRenderer>,
    config: &State<Arc<Config>>,
) -> Result<RawHtml<String>, Status> {
    render_page(renderer, config, Some(&auth.user), "gp", json!({}))
}

#[get("/vpn")]
pub fn vpn(
    auth: Authorized<StaffAccess>,
    renderer: &State<TemplateRenderer>,
    config: &State<Arc<Config>>,
) -> Result<RawHtml<String>, Status> {
    render_page(renderer, config, Some(&auth.user), "vpn", json!({}))
}

/// Running configuration, admins only. The client secret is masked.
#[get("/settings")]
pub fn settings(
    auth: Authorized<AdminAccess>,
    renderer: &State<TemplateRenderer>,
    config: &State<Arc<Config>>,
) -> Result<RawHtml<String>, Status> {
    render_page(
        renderer,
        config,
        Some(&auth.user),
        "settings",
        json!({
            "tenant_id": config.azure.tenant_id,
            "app_id": config.azure.app_id,
            "app_secret": mask_secret(&config.azure.app_secret),
            "callback_url": config.azure.redirect_uri,
            "authority": config.azure.authority,
            "web_ip": config.web.ip,
            "web_port": config.web.port,
            "web_debug": config.web.debug,
            "web_admin_group": config.azure.admin_group,
            "web_helpdesk_group": config.azure.helpdesk_group,
            "api_ip": config.api.ip,
            "api_port": config.api.port,
        }),
    )
}
