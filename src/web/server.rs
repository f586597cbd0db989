// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rocket server builder
//!
//! This module assembles the Rocket instance: managed state, page and
//! authentication routes, the OAuth2 callback mounted at the configured
//! path, and the error catchers.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};
use rocket::figment::Figment;
use rocket::http::uri::Origin;
use rocket::{routes, Build, Rocket};

use super::templates::TemplateRenderer;
use super::{auth, catchers, handlers, pages};
use crate::backend::BackendClient;
use crate::config::Config;
use crate::identity::AzureIdentity;

/// Build a configured Rocket server instance
///
/// ### Parameters
///
/// * `figment` - The Rocket configuration figment (address, port, secret key...)
/// * `config` - The validated application configuration
///
/// ### Managed state
///
/// * `Arc<Config>` - read by the authorization gate and the pages
/// * [`AzureIdentity`] - identity provider client
/// * [`BackendClient`] - backend API client
/// * [`TemplateRenderer`] - compiled page templates
///
/// ### Errors
///
/// Fails when the callback path is not a valid URI path, or when a client
/// or the templates cannot be prepared.
///
/// ### Example
///
/// ```no_run
/// use std::sync::Arc;
/// use network_frontend::{config::Config, web::server};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Arc::new(Config::from_file("config.yaml")?);
/// let figment = rocket::Config::figment().merge(("port", config.web.port));
/// let rocket = server::build_rocket(figment, config)?;
/// rocket.launch().await?;
/// # Ok(())
/// # }
/// ```
pub fn build_rocket(figment: Figment, config: Arc<Config>) -> Result<Rocket<Build>> {
    let callback_path = config.azure.redirect_uri.clone();
    Origin::parse(&callback_path)
        .map_err(|e| anyhow::anyhow!("invalid azure redirect-uri '{}': {}", callback_path, e))?;

    let identity =
        AzureIdentity::from_config(&config.azure).context("Failed to prepare identity client")?;
    let backend =
        BackendClient::from_config(&config.api).context("Failed to prepare backend API client")?;
    let renderer = TemplateRenderer::embedded().context("Failed to compile page templates")?;

    info!("Identity provider issuer: {}", identity.issuer());
    info!("Backend API: {}", backend.base_url());
    debug!("OAuth2 callback mounted at {}", callback_path);

    let rocket = rocket::custom(figment)
        .mount(
            "/",
            routes![
                pages::index,
                pages::unauthorized,
                pages::devices,
                pages::objects,
                pages::policies,
                pages::globalprotect,
                pages::vpn,
                pages::settings,
                auth::login,
                auth::logout,
                handlers::assets,
            ],
        )
        .mount(callback_path.as_str(), routes![auth::callback])
        .register(
            "/",
            rocket::catchers![
                catchers::unauthorized,
                catchers::forbidden,
                catchers::not_found,
                catchers::internal_error,
            ],
        )
        .manage(config)
        .manage(identity)
        .manage(backend)
        .manage(renderer);

    Ok(rocket)
}
