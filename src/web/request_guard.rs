// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use rocket::http::{ContentType, Header};
use rocket::request::{FromRequest, Outcome};
use rocket::response::Responder;

use rocket::async_trait;
use rocket::{Request, Response};

use std::convert::Infallible;
use std::fmt::Debug;
use std::io::Cursor;
use std::net::{IpAddr, Ipv4Addr};

/// Response type for serving embedded static files
///
/// # Fields
///
/// * `0` - The binary content of the file
/// * `1` - The content type of the file
pub struct StaticFileResponse(pub Vec<u8>, pub ContentType);

/// Prints text content truncated, and only the content type for binaries.
impl Debug for StaticFileResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.1.is_text() || self.1.is_css() || self.1.is_javascript() {
            let text_content = String::from_utf8_lossy(&self.0);
            f.debug_struct("StaticFileResponse")
                .field(
                    "content",
                    &text_content.chars().take(200).collect::<String>(),
                )
                .field("content_type", &self.1)
                .finish()
        } else {
            f.debug_struct("StaticFileResponse")
                .field("length", &self.0.len())
                .field("content_type", &self.1)
                .finish()
        }
    }
}

#[async_trait]
impl<'r> Responder<'r, 'r> for StaticFileResponse {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        Response::build()
            .header(self.1) // Content-Type header
            .header(Header {
                name: "Cache-Control".into(),
                value: "max-age=604800".into(), // 1 week cache
            })
            .sized_body(self.0.len(), Cursor::new(self.0))
            .ok()
    }
}

/// Request guard describing how the client reached the server
///
/// Used to build absolute URLs handed to the identity provider (the
/// callback and the post-logout page) and to show the client address on
/// the index page.
///
/// # Fields
///
/// * `ip` - The client's IP address (`X-Real-IP` aware), or 127.0.0.1
/// * `scheme` - `https` when TLS is enabled or a proxy says so, else `http`
/// * `host` - The `Host` header, or the bound address when absent
/// * `base_url` - `{scheme}://{host}`
///
/// # Usage in Routes
///
/// ```
/// use rocket::get;
/// use network_frontend::web::request_guard::ConnectionInfo;
///
/// #[get("/whoami")]
/// fn whoami(conn_info: ConnectionInfo) -> String {
///     format!("{} via {}", conn_info.ip, conn_info.base_url)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub ip: IpAddr,
    pub scheme: String,
    pub host: String,
    pub base_url: String,
}

impl ConnectionInfo {
    /// Absolute URL of a local `path`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ConnectionInfo {
    type Error = Infallible;

    /// Never fails: missing headers fall back to the server's own settings.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = req.rocket().config();

        let host = match req.host() {
            Some(host) => host.to_string(),
            None => format!("{}:{}", config.address, config.port),
        };

        let forwarded_https = req
            .headers()
            .get_one("X-Forwarded-Proto")
            .map(|proto| proto.eq_ignore_ascii_case("https"))
            .unwrap_or(false);
        let scheme = if config.tls_enabled() || forwarded_https {
            "https".to_string()
        } else {
            "http".to_string()
        };

        let ip = req
            .client_ip()
            .unwrap_or(Ipv4Addr::new(127, 0, 0, 1).into());

        let base_url = format!("{}://{}", scheme, host);
        Outcome::Success(ConnectionInfo {
            ip,
            scheme,
            host,
            base_url,
        })
    }
}
