// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Identity provider integration
//!
//! This module wraps the `oauth2` client for the Azure AD (Entra ID) v2.0
//! endpoints of one tenant. It implements the two halves of the
//! authorization-code grant:
//!
//! - [`AzureIdentity::authorization_url`] builds the URL the browser is sent
//!   to, together with the per-login [`AuthorizationFlow`] values that must be
//!   remembered until the callback (state, nonce, PKCE verifier)
//! - [`AzureIdentity::exchange_code`] redeems the returned code at the token
//!   endpoint and validates the identity token it yields
//!
//! Endpoints are derived from the configured authority and tenant:
//!
//! | Purpose   | URL                                           |
//! |-----------|-----------------------------------------------|
//! | authorize | `{authority}/{tenant}/oauth2/v2.0/authorize`  |
//! | token     | `{authority}/{tenant}/oauth2/v2.0/token`      |
//! | keys      | `{authority}/{tenant}/discovery/v2.0/keys`    |
//! | logout    | `{authority}/{tenant}/oauth2/v2.0/logout`     |

pub mod claims;
pub mod error;

use std::borrow::Cow;
use std::time::Duration;

use jsonwebtoken::jwk::JwkSet;
use log::debug;
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, ExtraTokenFields, PkceCodeChallenge, PkceCodeVerifier,
    RedirectUrl, Scope, StandardRevocableToken, StandardTokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::config::AzureConfig;

pub use claims::{validate_id_token, IdTokenClaims};
pub use error::AuthError;

/// Timeout applied to every call made to the identity provider.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(15);

/// Extra fields of the token response: the OpenID Connect identity token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdTokenFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl ExtraTokenFields for IdTokenFields {}

/// Token endpoint response carrying an identity token.
pub type AzureTokenResponse = StandardTokenResponse<IdTokenFields, BasicTokenType>;

/// `oauth2` client with the authorization and token endpoints set.
type AzureClient = Client<
    BasicErrorResponse,
    AzureTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Values generated by `/login` and checked by the callback.
///
/// Kept in an encrypted cookie for the few minutes the user spends at the
/// identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationFlow {
    /// Anti-CSRF value echoed back in the callback query string.
    pub state: String,

    /// Replay protection value echoed back inside the identity token.
    pub nonce: String,

    /// PKCE secret proving the callback belongs to the same login.
    pub pkce_verifier: String,

    /// Local path to return to once signed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Client for one tenant of the identity provider.
pub struct AzureIdentity {
    client: AzureClient,
    http: reqwest::Client,
    app_id: String,
    issuer: String,
    keys_url: String,
    logout_url: Url,
    scopes: Vec<String>,
}

impl AzureIdentity {
    /// Build the client from the `azure` configuration section.
    ///
    /// No network traffic happens here. The HTTP client never follows
    /// redirects, as required for token requests.
    pub fn from_config(config: &AzureConfig) -> Result<Self, AuthError> {
        let tenant_url = config.tenant_url();

        let client = Client::new(ClientId::new(config.app_id.clone()))
            .set_client_secret(ClientSecret::new(config.app_secret.clone()))
            .set_auth_uri(AuthUrl::new(format!("{tenant_url}/oauth2/v2.0/authorize"))?)
            .set_token_uri(TokenUrl::new(format!("{tenant_url}/oauth2/v2.0/token"))?)
            .set_auth_type(AuthType::RequestBody);

        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            http,
            app_id: config.app_id.clone(),
            issuer: format!("{tenant_url}/v2.0"),
            keys_url: format!("{tenant_url}/discovery/v2.0/keys"),
            logout_url: Url::parse(&format!("{tenant_url}/oauth2/v2.0/logout"))?,
            scopes: config.scopes.clone(),
        })
    }

    /// Issuer every identity token of the tenant must carry.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Build the provider URL that starts a login.
    ///
    /// `redirect_url` is the absolute URL of the callback route. `next` is
    /// stored in the returned flow untouched, the caller decides whether it
    /// is safe to follow.
    pub fn authorization_url(
        &self,
        redirect_url: &str,
        next: Option<String>,
    ) -> Result<(Url, AuthorizationFlow), AuthError> {
        let redirect = RedirectUrl::new(redirect_url.to_string())?;
        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        let state = Uuid::new_v4().to_string();
        let nonce = Uuid::new_v4().to_string();

        let request_state = state.clone();
        let (url, _) = self
            .client
            .authorize_url(move || CsrfToken::new(request_state))
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .add_extra_param("nonce", nonce.clone())
            .set_pkce_challenge(challenge)
            .set_redirect_uri(Cow::Owned(redirect))
            .url();

        debug!("Authorization request prepared for redirect {}", redirect_url);

        Ok((
            url,
            AuthorizationFlow {
                state,
                nonce,
                pkce_verifier: verifier.secret().to_string(),
                next,
            },
        ))
    }

    /// Redeem an authorization code and return the validated identity claims.
    ///
    /// The token response must contain an access token and an identity
    /// token. The identity token is checked against the tenant keys, the
    /// application id, the issuer and the nonce of `flow`.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_url: &str,
        flow: &AuthorizationFlow,
    ) -> Result<IdTokenClaims, AuthError> {
        let redirect = RedirectUrl::new(redirect_url.to_string())?;

        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(flow.pkce_verifier.clone()))
            .set_redirect_uri(Cow::Owned(redirect))
            .request_async(&self.http)
            .await
            .map_err(AuthError::from_token_error)?;

        let id_token = response
            .extra_fields()
            .id_token
            .as_deref()
            .ok_or(AuthError::MissingIdToken)?;

        let keys = self.fetch_keys().await?;
        let claims = validate_id_token(id_token, &keys, &self.app_id, &self.issuer)?;

        if claims.nonce.as_deref() != Some(flow.nonce.as_str()) {
            return Err(AuthError::NonceMismatch);
        }

        Ok(claims)
    }

    /// Download the signing keys published by the tenant.
    pub async fn fetch_keys(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .http
            .get(&self.keys_url)
            .send()
            .await
            .map_err(|e| AuthError::Keys(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Keys(format!(
                "{} answered {}",
                self.keys_url, status
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::Keys(e.to_string()))
    }

    /// Provider sign-out URL returning the browser to `post_logout_redirect`.
    pub fn logout_url(&self, post_logout_redirect: &str) -> Url {
        let mut url = self.logout_url.clone();
        url.query_pairs_mut()
            .append_pair("post_logout_redirect_uri", post_logout_redirect);
        url
    }
}
