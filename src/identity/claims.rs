// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Identity token claims and their validation
//!
//! The token endpoint returns an OpenID Connect identity token alongside the
//! access token. Its claims carry the caller's profile and group membership.
//! Before they are trusted the token is verified against the tenant's
//! published signing keys (JWKS):
//!
//! 1. the header names a key id (`kid`) present in the key set
//! 2. the signature verifies with that key using RS256
//! 3. `aud` is the application id, `iss` the tenant issuer, `exp` in the future

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use super::error::AuthError;

/// Claims read from a validated identity token.
///
/// Azure AD only emits `groups` when the application registration has
/// group claims enabled. Users in more groups than fit in a token get a
/// `_claim_names` overage pointer instead, see [`IdTokenClaims::has_group_overage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Sign-in name, usually the UPN or e-mail address.
    #[serde(default)]
    pub preferred_username: Option<String>,

    /// Object id of the user in the directory.
    #[serde(default)]
    pub oid: Option<String>,

    /// Tenant id the user signed in to.
    #[serde(default)]
    pub tid: Option<String>,

    /// Group object ids the user is a member of.
    #[serde(default)]
    pub groups: Vec<String>,

    /// Value echoed from the authorization request.
    #[serde(default)]
    pub nonce: Option<String>,

    /// Distributed claims, present on group overage.
    #[serde(rename = "_claim_names", default, skip_serializing_if = "Option::is_none")]
    pub claim_names: Option<serde_json::Value>,
}

impl IdTokenClaims {
    /// `true` when the token says the group list was too long to embed.
    pub fn has_group_overage(&self) -> bool {
        self.claim_names
            .as_ref()
            .and_then(|names| names.get("groups"))
            .is_some()
    }
}

/// Validate `token` against `keys` and return its claims.
///
/// # Parameters
///
/// * `token` - The compact JWS identity token
/// * `keys` - Signing keys of the tenant
/// * `audience` - Expected `aud`, the application (client) id
/// * `issuer` - Expected `iss`, `{authority}/{tenant}/v2.0`
pub fn validate_id_token(
    token: &str,
    keys: &JwkSet,
    audience: &str,
    issuer: &str,
) -> Result<IdTokenClaims, AuthError> {
    let header = decode_header(token)?;
    let kid = header
        .kid
        .ok_or_else(|| AuthError::InvalidIdToken("token header has no key id".to_string()))?;

    let jwk = keys.find(&kid).ok_or_else(|| {
        AuthError::InvalidIdToken(format!("signing key '{kid}' is not published by the tenant"))
    })?;
    let key = DecodingKey::from_jwk(jwk)?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[audience]);
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["exp", "aud", "iss"]);

    let data = decode::<IdTokenClaims>(token, &key, &validation)?;
    Ok(data.claims)
}
