// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Helpers shared by the web integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Once};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use network_frontend::config::{ApiConfig, AzureConfig, Config, WebConfig};
use network_frontend::web::build_rocket;
use network_frontend::web::session::{derive_secret_key, encode_user_session, SESSION_COOKIE};
use network_frontend::web::UserSession;
use rocket::config::LogLevel;
use rocket::http::Cookie;
use rocket::local::asynchronous::Client;
use serde_json::json;
use url::Url;

pub const ADMIN_GROUP: &str = "g-admin";
pub const HELPDESK_GROUP: &str = "g-help";
pub const APP_ID: &str = "app-123";
pub const TENANT: &str = "tenant";
pub const SIGNING_KEY: &str = include_str!("../fixtures/id_token_signing.pem");
pub const JWKS: &str = include_str!("../fixtures/jwks.json");

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    });
}

/// Configuration pointing at `authority` for the identity provider and at
/// `api` for the backend.
pub fn test_config(authority: &str, api: &ApiConfig, debug: bool) -> Config {
    Config {
        azure: AzureConfig {
            redirect_uri: "/callback".to_string(),
            tenant_id: TENANT.to_string(),
            app_id: APP_ID.to_string(),
            app_secret: "super-secret-value".to_string(),
            admin_group: ADMIN_GROUP.to_string(),
            helpdesk_group: HELPDESK_GROUP.to_string(),
            authority: authority.to_string(),
            scopes: vec!["User.Read".to_string()],
        },
        web: WebConfig {
            debug,
            changelog: "/nonexistent/changelog.json".to_string(),
            ..WebConfig::default()
        },
        api: api.clone(),
    }
}

/// API settings for a backend that is not expected to be called.
pub fn unused_api() -> ApiConfig {
    ApiConfig {
        ip: "127.0.0.1".to_string(),
        port: 9,
        timeout: 1,
    }
}

pub async fn client_for(config: Config) -> Client {
    init_test_logging();
    let figment = rocket::Config::figment()
        .merge(("port", 8080))
        .merge(("address", "127.0.0.1"))
        .merge(("secret_key", derive_secret_key(Some("integration-tests"))))
        .merge(("log_level", LogLevel::Off));
    let rocket = build_rocket(figment, Arc::new(config)).expect("rocket builds");
    Client::tracked(rocket).await.expect("valid rocket instance")
}

pub fn session_with_groups(groups: &[&str]) -> UserSession {
    UserSession {
        name: Some("Ada Lovelace".to_string()),
        preferred_username: Some("ada@example.test".to_string()),
        oid: Some("oid-1".to_string()),
        groups: groups.iter().map(|g| g.to_string()).collect(),
        expires_at: chrono::Utc::now().timestamp() + 3600,
    }
}

/// Same as [`session_with_groups`] but whose lifetime ended a minute ago.
pub fn expired_session_with_groups(groups: &[&str]) -> UserSession {
    UserSession {
        expires_at: chrono::Utc::now().timestamp() - 60,
        ..session_with_groups(groups)
    }
}

pub fn session_cookie(session: &UserSession) -> Cookie<'static> {
    Cookie::new(
        SESSION_COOKIE,
        encode_user_session(session).expect("session encodes"),
    )
}

/// Query parameters of an absolute or relative URL.
pub fn query_params(location: &str) -> HashMap<String, String> {
    let url = Url::parse(location)
        .or_else(|_| Url::parse("http://localhost").and_then(|base| base.join(location)))
        .expect("valid URL");
    url.query_pairs().into_owned().collect()
}

/// Identity token as the provider would issue it.
pub fn signed_id_token(issuer: &str, nonce: &str, groups: &[&str]) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some("test-signing-key".to_string());
    let claims = json!({
        "aud": APP_ID,
        "iss": issuer,
        "iat": chrono::Utc::now().timestamp(),
        "exp": chrono::Utc::now().timestamp() + 600,
        "name": "Ada Lovelace",
        "preferred_username": "ada@example.test",
        "oid": "oid-1",
        "tid": TENANT,
        "groups": groups,
        "nonce": nonce,
    });
    let key = EncodingKey::from_rsa_pem(SIGNING_KEY.as_bytes()).expect("valid test key");
    encode(&header, &claims, &key).expect("token signs")
}
