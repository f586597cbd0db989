// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Error catchers
//!
//! 401 and 403 are produced by the authorization gate and turned into
//! redirects. The others render the error page.

use std::sync::Arc;

use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::{catch, Request};
use serde_json::json;
use url::form_urlencoded;

use super::pages::render_page;
use super::templates::TemplateRenderer;
use crate::config::Config;

/// Not signed in: go to the login, then come back.
#[catch(401)]
pub fn unauthorized(req: &Request<'_>) -> Redirect {
    let next: String = form_urlencoded::byte_serialize(req.uri().to_string().as_bytes()).collect();
    Redirect::to(format!("/login?next={next}"))
}

/// Signed in without the right group.
#[catch(403)]
pub fn forbidden() -> Redirect {
    Redirect::to("/unauthorized")
}

fn error_page(status: Status, req: &Request<'_>) -> RawHtml<String> {
    let reason = status.reason().unwrap_or("Error");
    let rendered = match (
        req.rocket().state::<TemplateRenderer>(),
        req.rocket().state::<Arc<Config>>(),
    ) {
        (Some(renderer), Some(config)) => render_page(
            renderer,
            config,
            None,
            "error",
            json!({ "status": status.code, "reason": reason }),
        )
        .ok(),
        _ => None,
    };

    rendered.unwrap_or_else(|| RawHtml(format!("<h1>{} {}</h1>", status.code, reason)))
}

#[catch(404)]
pub fn not_found(req: &Request<'_>) -> RawHtml<String> {
    error_page(Status::NotFound, req)
}

#[catch(500)]
pub fn internal_error(req: &Request<'_>) -> RawHtml<String> {
    error_page(Status::InternalServerError, req)
}
