// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

mod common;

use common::*;
use network_frontend::web::session::{decode_user_session, FLOW_COOKIE, SESSION_COOKIE};
use rocket::http::Status;
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Provider {
    server: MockServer,
}

impl Provider {
    async fn start() -> Self {
        let server = MockServer::start().await;
        let keys: Value = serde_json::from_str(JWKS).unwrap();
        Mock::given(method("GET"))
            .and(path(format!("/{TENANT}/discovery/v2.0/keys")))
            .respond_with(ResponseTemplate::new(200).set_body_json(keys))
            .mount(&server)
            .await;
        Self { server }
    }

    fn issuer(&self) -> String {
        format!("{}/{}/v2.0", self.server.uri(), TENANT)
    }

    /// Answer the token request for `code` with `body` and `status`.
    async fn token_response(&self, code: &str, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(format!("/{TENANT}/oauth2/v2.0/token")))
            .and(body_string_contains(format!("code={code}")))
            .and(body_string_contains("code_verifier="))
            .and(body_string_contains("client_secret=super-secret-value"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}

/// Run `/login?next=...` and return the authorize URL parameters.
async fn start_login(client: &Client, next: &str) -> std::collections::HashMap<String, String> {
    let response = client.get(format!("/login?next={next}")).dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    let location = response.headers().get_one("Location").unwrap().to_string();
    assert!(client.cookies().get_private(FLOW_COOKIE).is_some());
    query_params(&location)
}

#[rocket::async_test]
async fn test_login_redirects_to_provider() {
    let provider = Provider::start().await;
    let client = client_for(test_config(&provider.server.uri(), &unused_api(), false)).await;

    let response = client.get("/login?next=/devices").dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    let location = response.headers().get_one("Location").unwrap();
    assert!(
        location.starts_with(&format!(
            "{}/{}/oauth2/v2.0/authorize?",
            provider.server.uri(),
            TENANT
        )),
        "{location}"
    );

    let params = query_params(location);
    assert_eq!(params["client_id"], APP_ID);
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["code_challenge_method"], "S256");
    assert!(params["redirect_uri"].starts_with("http://"));
    assert!(params["redirect_uri"].ends_with("/callback"));
    assert!(params["scope"].contains("openid"));

    let cookie = response.cookies().get(FLOW_COOKIE).unwrap();
    assert_eq!(cookie.same_site(), Some(rocket::http::SameSite::Lax));
}

#[rocket::async_test]
async fn test_full_login_stores_session_and_returns_to_next() {
    let provider = Provider::start().await;
    let client = client_for(test_config(&provider.server.uri(), &unused_api(), false)).await;

    let params = start_login(&client, "/objects").await;
    let token = signed_id_token(
        &provider.issuer(),
        &params["nonce"],
        &[HELPDESK_GROUP, "g-unrelated-1", "g-unrelated-2"],
    );
    provider
        .token_response(
            "auth-code-1",
            200,
            json!({
                "access_token": "access-token",
                "token_type": "Bearer",
                "expires_in": 3600,
                "id_token": token,
            }),
        )
        .await;

    let response = client
        .get(format!(
            "/callback?code=auth-code-1&state={}&session_state=abc",
            params["state"]
        ))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/objects"));

    let cookie = client.cookies().get_private(SESSION_COOKIE).unwrap();
    let session = decode_user_session(cookie.value()).unwrap();
    assert_eq!(session.name.as_deref(), Some("Ada Lovelace"));
    assert_eq!(session.groups, vec![HELPDESK_GROUP.to_string()]);
    // web.session-hours defaults to 8
    let remaining = session.expires_at - chrono::Utc::now().timestamp();
    assert!((8 * 3600 - 60..=8 * 3600).contains(&remaining), "{remaining}");
    assert!(client.cookies().get_private(FLOW_COOKIE).is_none());

    let response = client.get("/objects").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().await.unwrap();
    assert!(body.contains("Ada Lovelace"));

    // The flow is single use
    let response = client
        .get(format!("/callback?code=auth-code-1&state={}", params["state"]))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn test_external_next_is_ignored() {
    let provider = Provider::start().await;
    let client = client_for(test_config(&provider.server.uri(), &unused_api(), false)).await;

    let params = start_login(&client, "https://evil.test/").await;
    let token = signed_id_token(&provider.issuer(), &params["nonce"], &[ADMIN_GROUP]);
    provider
        .token_response(
            "auth-code-2",
            200,
            json!({"access_token": "a", "token_type": "Bearer", "id_token": token}),
        )
        .await;

    let response = client
        .get(format!("/callback?code=auth-code-2&state={}", params["state"]))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/"));
}

#[rocket::async_test]
async fn test_provider_error_is_reported() {
    let provider = Provider::start().await;
    let client = client_for(test_config(&provider.server.uri(), &unused_api(), false)).await;

    let response = client
        .get("/callback?error=access_denied&error_description=The%20user%20cancelled")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(
        response.into_string().await.unwrap(),
        "Error: access_denied - The user cancelled"
    );
}

#[rocket::async_test]
async fn test_missing_code() {
    let provider = Provider::start().await;
    let client = client_for(test_config(&provider.server.uri(), &unused_api(), false)).await;

    let response = client.get("/callback?state=whatever").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(response.into_string().await.unwrap(), "No code provided");
}

#[rocket::async_test]
async fn test_state_mismatch_is_rejected() {
    let provider = Provider::start().await;
    let client = client_for(test_config(&provider.server.uri(), &unused_api(), false)).await;

    start_login(&client, "/").await;
    let response = client
        .get("/callback?code=auth-code-3&state=forged")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert!(client.cookies().get_private(SESSION_COOKIE).is_none());
}

#[rocket::async_test]
async fn test_token_endpoint_error_is_reported() {
    let provider = Provider::start().await;
    let client = client_for(test_config(&provider.server.uri(), &unused_api(), false)).await;

    let params = start_login(&client, "/").await;
    provider
        .token_response(
            "expired-code",
            400,
            json!({
                "error": "invalid_grant",
                "error_description": "The code has expired"
            }),
        )
        .await;

    let response = client
        .get(format!("/callback?code=expired-code&state={}", params["state"]))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(
        response.into_string().await.unwrap(),
        "Error: invalid_grant - The code has expired"
    );
}

#[rocket::async_test]
async fn test_replayed_identity_token_is_rejected() {
    let provider = Provider::start().await;
    let client = client_for(test_config(&provider.server.uri(), &unused_api(), false)).await;

    let params = start_login(&client, "/").await;
    let token = signed_id_token(&provider.issuer(), "nonce-of-another-login", &[ADMIN_GROUP]);
    provider
        .token_response(
            "auth-code-4",
            200,
            json!({"access_token": "a", "token_type": "Bearer", "id_token": token}),
        )
        .await;

    let response = client
        .get(format!("/callback?code=auth-code-4&state={}", params["state"]))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert!(response.into_string().await.unwrap().contains("nonce_mismatch"));
}

#[rocket::async_test]
async fn test_missing_identity_token_is_a_gateway_error() {
    let provider = Provider::start().await;
    let client = client_for(test_config(&provider.server.uri(), &unused_api(), false)).await;

    let params = start_login(&client, "/").await;
    provider
        .token_response(
            "auth-code-5",
            200,
            json!({"access_token": "a", "token_type": "Bearer"}),
        )
        .await;

    let response = client
        .get(format!("/callback?code=auth-code-5&state={}", params["state"]))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadGateway);
}

#[rocket::async_test]
async fn test_logout_clears_session() {
    let provider = Provider::start().await;
    let client = client_for(test_config(&provider.server.uri(), &unused_api(), false)).await;

    let session = session_with_groups(&[ADMIN_GROUP]);
    let response = client
        .get("/logout")
        .private_cookie(session_cookie(&session))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);

    let location = response.headers().get_one("Location").unwrap();
    assert!(location.starts_with(&format!(
        "{}/{}/oauth2/v2.0/logout?",
        provider.server.uri(),
        TENANT
    )));
    assert!(query_params(location)["post_logout_redirect_uri"].ends_with('/'));
    assert!(client.cookies().get_private(SESSION_COOKIE).is_none());
}
