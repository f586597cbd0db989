// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Errors of the login flow

use oauth2::basic::BasicErrorResponse;
use oauth2::RequestTokenError;
use thiserror::Error;

/// Everything that can go wrong between `/login` and a stored session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity provider returned `error` / `error_description`, either on
    /// the callback query string or from the token endpoint.
    #[error("Error: {error} - {}", .description.as_deref().unwrap_or("None"))]
    Provider {
        error: String,
        description: Option<String>,
    },

    /// The callback carried neither a code nor an error.
    #[error("No code provided")]
    MissingCode,

    /// No login was started from this browser, or it expired.
    #[error("Error: login_expired - no pending login for this browser, please sign in again")]
    NoPendingLogin,

    /// The `state` parameter does not belong to the pending login.
    #[error("Error: state_mismatch - the login response does not match this browser")]
    StateMismatch,

    /// The identity token was issued for a different authorization request.
    #[error("Error: nonce_mismatch - the identity token does not match this login")]
    NonceMismatch,

    /// The token endpoint could not be reached or answered garbage.
    #[error("Error: token_request_failed - {0}")]
    Exchange(String),

    /// The token response had an access token but no identity token.
    #[error("Error: missing_id_token - the token response did not include an identity token")]
    MissingIdToken,

    /// The identity token failed signature or claim validation.
    #[error("Error: invalid_id_token - {0}")]
    InvalidIdToken(String),

    /// The signing keys of the tenant could not be fetched.
    #[error("Error: signing_keys_unavailable - {0}")]
    Keys(String),

    /// A URL built from the configuration is malformed.
    #[error("Error: configuration - {0}")]
    Configuration(String),
}

impl AuthError {
    /// Map an `oauth2` token request failure, keeping the provider's error
    /// code and description when the server sent them.
    pub fn from_token_error<RE>(err: RequestTokenError<RE, BasicErrorResponse>) -> Self
    where
        RE: std::error::Error + 'static,
    {
        match err {
            RequestTokenError::ServerResponse(response) => AuthError::Provider {
                error: response.error().to_string(),
                description: response.error_description().cloned(),
            },
            RequestTokenError::Request(e) => AuthError::Exchange(e.to_string()),
            RequestTokenError::Parse(e, _) => {
                AuthError::Exchange(format!("unexpected token response: {e}"))
            }
            RequestTokenError::Other(message) => AuthError::Exchange(message),
        }
    }

    /// `true` when the failure was caused by the browser or the user rather
    /// than by this server or the identity provider being unreachable.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::Provider { .. }
                | AuthError::MissingCode
                | AuthError::NoPendingLogin
                | AuthError::StateMismatch
                | AuthError::NonceMismatch
        )
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AuthError::InvalidIdToken(err.to_string())
    }
}

impl From<oauth2::url::ParseError> for AuthError {
    fn from(err: oauth2::url::ParseError) -> Self {
        AuthError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_message_matches_callback_format() {
        let err = AuthError::Provider {
            error: "access_denied".to_string(),
            description: Some("The user has denied access".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Error: access_denied - The user has denied access"
        );

        let err = AuthError::Provider {
            error: "invalid_request".to_string(),
            description: None,
        };
        assert_eq!(err.to_string(), "Error: invalid_request - None");
    }

    #[test]
    fn test_client_errors() {
        assert!(AuthError::MissingCode.is_client_error());
        assert!(AuthError::StateMismatch.is_client_error());
        assert!(!AuthError::Keys("down".to_string()).is_client_error());
    }
}
