// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Route handlers for static files
//!
//! Stylesheets and page scripts are embedded in the binary at compile time,
//! so the server has no file dependency besides its configuration.

use std::path::PathBuf;

use include_dir::{include_dir, Dir};
use rocket::get;
use rocket::http::ContentType;

use super::request_guard::StaticFileResponse;

/// Static directory containing the stylesheets and page scripts.
static STATIC_DIR: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/static");

/// Look up an embedded file by its path relative to `static/`.
pub fn static_file(path: &str) -> Option<StaticFileResponse> {
    STATIC_DIR.get_file(path).map(|file| {
        let content_type = file
            .path()
            .extension()
            .and_then(|extension| extension.to_str())
            .and_then(ContentType::from_extension)
            .unwrap_or(ContentType::Binary);
        StaticFileResponse(file.contents().to_vec(), content_type)
    })
}

/// Serve `/static/<path..>` from the embedded directory.
///
/// `PathBuf` segments are already sanitized by Rocket, `..` never reaches
/// this handler.
#[get("/static/<path..>")]
pub fn assets(path: PathBuf) -> Option<StaticFileResponse> {
    let path = path.to_str()?;
    static_file(path)
}
