// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Login, callback and logout endpoints
//!
//! ```text
//! browser            frontend                       identity provider
//!   | GET /login?next=/x  |                                  |
//!   |-------------------->| store auth_flow cookie           |
//!   |<---- 303 ---------- |                                  |
//!   | GET {authority}/.../authorize?state&nonce&code_challenge |
//!   |------------------------------------------------------->|
//!   |<------------------- 302 {redirect-uri}?code&state ------|
//!   | GET {redirect-uri}  |                                  |
//!   |-------------------->| POST token (code, verifier)       |
//!   |                     |--------------------------------->|
//!   |                     | GET keys, validate id_token       |
//!   |<---- 303 /x ------- | store user_session cookie         |
//! ```

use std::sync::Arc;

use log::{info, warn};
use rocket::http::{CookieJar, Status};
use rocket::response::Redirect;
use rocket::{get, State};

use super::request_guard::ConnectionInfo;
use super::session::{clear_session, load_session, store_flow, store_session, take_flow, UserSession};
use crate::config::Config;
use crate::identity::{AuthError, AzureIdentity};

/// Response of the callback when the login cannot complete.
pub type CallbackFailure = (Status, String);

/// `next` if it is a path on this site, `None` otherwise.
///
/// Rejects absolute URLs and protocol-relative `//host` forms so the login
/// cannot be used to bounce users to another site.
pub fn local_path(next: Option<&str>) -> Option<String> {
    let next = next?;
    let is_local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.starts_with("/\\")
        && !next.chars().any(char::is_control);
    is_local.then(|| next.to_string())
}

fn failure(err: AuthError) -> CallbackFailure {
    let status = if err.is_client_error() {
        Status::BadRequest
    } else {
        Status::BadGateway
    };
    warn!("Login failed: {}", err);
    (status, err.to_string())
}

/// Start a login: remember the flow and send the browser to the provider.
#[get("/login?<next>")]
pub fn login(
    next: Option<String>,
    connection: ConnectionInfo,
    identity: &State<AzureIdentity>,
    config: &State<Arc<Config>>,
    cookies: &CookieJar<'_>,
) -> Result<Redirect, Status> {
    let redirect_url = connection.url_for(&config.azure.redirect_uri);
    let next = local_path(next.as_deref());

    let (url, flow) = identity
        .authorization_url(&redirect_url, next)
        .map_err(|e| {
            warn!("Cannot build authorization URL: {}", e);
            Status::InternalServerError
        })?;

    store_flow(cookies, &flow);
    Ok(Redirect::to(url.to_string()))
}

/// OAuth2 redirect target, mounted at the configured `redirect-uri`.
#[get("/?<code>&<state>&<error>&<error_description>")]
pub async fn callback(
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
    connection: ConnectionInfo,
    identity: &State<AzureIdentity>,
    config: &State<Arc<Config>>,
    cookies: &CookieJar<'_>,
) -> Result<Redirect, CallbackFailure> {
    if let Some(error) = error {
        take_flow(cookies);
        return Err(failure(AuthError::Provider {
            error,
            description: error_description,
        }));
    }

    let code = code.ok_or_else(|| failure(AuthError::MissingCode))?;
    let flow = take_flow(cookies).ok_or_else(|| failure(AuthError::NoPendingLogin))?;
    if state.as_deref() != Some(flow.state.as_str()) {
        return Err(failure(AuthError::StateMismatch));
    }

    let redirect_url = connection.url_for(&config.azure.redirect_uri);
    let claims = identity
        .exchange_code(&code, &redirect_url, &flow)
        .await
        .map_err(failure)?;

    if claims.has_group_overage() {
        warn!(
            "Group claim overage for {}: the token lists no groups",
            claims.preferred_username.as_deref().unwrap_or("unknown user")
        );
    }

    let session = UserSession::from_claims(&claims, &config.azure.staff_groups());
    info!(
        "{} signed in with {} authorizing group(s)",
        session.preferred_username.as_deref().unwrap_or("unknown user"),
        session.groups.len()
    );
    store_session(cookies, &session, config.web.session_hours);

    let target = local_path(flow.next.as_deref()).unwrap_or_else(|| "/".to_string());
    Ok(Redirect::to(target))
}

/// Sign out locally and at the provider.
#[get("/logout")]
pub fn logout(
    connection: ConnectionInfo,
    identity: &State<AzureIdentity>,
    cookies: &CookieJar<'_>,
) -> Redirect {
    if let Some(session) = load_session(cookies) {
        info!(
            "{} signed out",
            session.preferred_username.as_deref().unwrap_or("unknown user")
        );
    }
    clear_session(cookies);

    let url = identity.logout_url(&connection.url_for("/"));
    Redirect::to(url.to_string())
}
