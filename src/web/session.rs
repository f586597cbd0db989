// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Cookie-backed login state
//!
//! Two private cookies are used. Rocket encrypts and authenticates them with
//! the application secret key, so their content can be trusted as long as
//! the key is kept secret.
//!
//! - `auth_flow` lives between `/login` and the callback and holds the
//!   [`AuthorizationFlow`] values
//! - `user_session` holds the signed-in [`UserSession`]
//!
//! Both are `SameSite=Lax`: the callback is a top-level navigation coming
//! from the identity provider's site and must still see them.

use base64::Engine;
use log::{debug, warn};
use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::time::{Duration, OffsetDateTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::identity::{AuthorizationFlow, IdTokenClaims};

/// Name of the cookie carrying the signed-in user.
pub const SESSION_COOKIE: &str = "user_session";

/// Name of the cookie carrying the pending login.
pub const FLOW_COOKIE: &str = "auth_flow";

/// Lifetime of a pending login.
const FLOW_MINUTES: i64 = 10;

/// Placeholder shown for every user field when debug mode bypasses login.
pub const DEBUG_PLACEHOLDER: &str = "N/A - Debug Mode";

/// Profile and group membership of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub name: Option<String>,
    pub preferred_username: Option<String>,
    pub oid: Option<String>,
    /// Group object ids, limited to the groups that grant access.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Unix time after which the session is refused. Cookies without it are
    /// treated as expired.
    #[serde(default)]
    pub expires_at: i64,
}

impl UserSession {
    /// Keep the profile claims and the groups listed in `relevant`.
    ///
    /// Users can belong to hundreds of groups; storing all of them would
    /// push the cookie past the 4 KiB browsers accept.
    pub fn from_claims(claims: &IdTokenClaims, relevant: &[&str]) -> Self {
        let groups = claims
            .groups
            .iter()
            .filter(|group| relevant.contains(&group.as_str()))
            .cloned()
            .collect();

        Self {
            name: claims.name.clone(),
            preferred_username: claims.preferred_username.clone(),
            oid: claims.oid.clone(),
            groups,
            expires_at: 0,
        }
    }

    /// Stand-in user for debug mode.
    pub fn debug_placeholder() -> Self {
        Self {
            name: Some(DEBUG_PLACEHOLDER.to_string()),
            preferred_username: Some(DEBUG_PLACEHOLDER.to_string()),
            oid: None,
            groups: vec![DEBUG_PLACEHOLDER.to_string()],
            expires_at: i64::MAX,
        }
    }

    /// `true` once the session lifetime has passed.
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc().unix_timestamp() >= self.expires_at
    }

    /// `true` if the user is in at least one of `allowed`.
    pub fn is_member_of_any(&self, allowed: &[&str]) -> bool {
        allowed
            .iter()
            .any(|group| self.groups.iter().any(|member| member == group))
    }

    /// Best name to greet the user with.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.preferred_username.as_deref())
    }
}

/// Serialize a value as base64 JSON for a cookie body.
fn encode_cookie_value<T: Serialize>(value: &T) -> Option<String> {
    match serde_json::to_vec(value) {
        Ok(json) => Some(base64::engine::general_purpose::STANDARD.encode(json)),
        Err(e) => {
            warn!("Failed to serialize cookie value: {}", e);
            None
        }
    }
}

/// Reverse of [`encode_cookie_value`]; `None` on any malformed input.
fn decode_cookie_value<T: for<'de> Deserialize<'de>>(cookie_value: &str) -> Option<T> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(cookie_value)
        .ok()?;
    serde_json::from_slice(&decoded).ok()
}

/// Encode a session into a cookie value.
pub fn encode_user_session(session: &UserSession) -> Option<String> {
    encode_cookie_value(session)
}

/// Decode a cookie value into a session.
pub fn decode_user_session(cookie_value: &str) -> Option<UserSession> {
    decode_cookie_value(cookie_value)
}

/// Store the signed-in user for `hours` hours.
///
/// The expiry is written into the session itself as well as into the
/// cookie's `Max-Age`, so a copied cookie stops working on time.
pub fn store_session(cookies: &CookieJar<'_>, session: &UserSession, hours: i64) {
    let lifetime = Duration::hours(hours);
    let session = UserSession {
        expires_at: (OffsetDateTime::now_utc() + lifetime).unix_timestamp(),
        ..session.clone()
    };
    if let Some(value) = encode_user_session(&session) {
        let cookie = Cookie::build((SESSION_COOKIE, value))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(lifetime);
        cookies.add_private(cookie);
    }
}

/// The signed-in user, if the session cookie is present, intact and not
/// expired.
pub fn load_session(cookies: &CookieJar<'_>) -> Option<UserSession> {
    let cookie = cookies.get_private(SESSION_COOKIE)?;
    let Some(session) = decode_user_session(cookie.value()) else {
        debug!("Session cookie present but unreadable");
        return None;
    };
    if session.is_expired() {
        debug!(
            "Session of {} has expired",
            session.preferred_username.as_deref().unwrap_or("unknown user")
        );
        return None;
    }
    Some(session)
}

/// Forget the signed-in user.
pub fn clear_session(cookies: &CookieJar<'_>) {
    cookies.remove_private(SESSION_COOKIE);
}

/// Remember a pending login.
pub fn store_flow(cookies: &CookieJar<'_>, flow: &AuthorizationFlow) {
    if let Some(value) = encode_cookie_value(flow) {
        let cookie = Cookie::build((FLOW_COOKIE, value))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::minutes(FLOW_MINUTES));
        cookies.add_private(cookie);
    }
}

/// Read and discard the pending login. A flow can be used only once.
pub fn take_flow(cookies: &CookieJar<'_>) -> Option<AuthorizationFlow> {
    let cookie = cookies.get_private(FLOW_COOKIE)?;
    cookies.remove_private(FLOW_COOKIE);
    decode_cookie_value(cookie.value())
}

/// Cookie secret key for Rocket's `secret_key` setting.
///
/// Derived from the master password with SHA-256 so that every instance
/// sharing the password can read the others' cookies. Without a password a
/// random key is generated and sessions end when the process stops.
pub fn derive_secret_key(master_password: Option<&str>) -> String {
    let bytes: [u8; 32] = match master_password {
        Some(password) if !password.is_empty() => {
            let mut key = [0u8; 32];
            key.copy_from_slice(&Sha256::digest(password.as_bytes()));
            key
        }
        _ => {
            warn!("API_MASTER_PW is not set: using a random cookie key, sessions will not survive a restart");
            rand::random()
        }
    };
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
