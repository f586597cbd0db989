// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Server-side page templates
//!
//! Templates are Handlebars files embedded in the binary at compile time:
//! `templates/*.hbs` are pages, registered under their file stem, and
//! `templates/partials/*.hbs` are partials shared by the pages
//! (`{{> header}}`, `{{> footer}}`).

use std::path::Path;

use handlebars::Handlebars;
use include_dir::{include_dir, Dir, File};
use log::debug;
use serde::Serialize;
use thiserror::Error;

static TEMPLATE_DIR: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Failures preparing or rendering a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// An embedded file is not valid UTF-8.
    #[error("template {0} is not valid UTF-8")]
    Encoding(String),

    /// An embedded template does not parse.
    #[error("template {name} does not compile: {source}")]
    Compile {
        name: String,
        #[source]
        source: handlebars::TemplateError,
    },

    /// No page of that name is embedded.
    #[error("no template named {0}")]
    Missing(String),

    /// Rendering failed, usually a helper applied to the wrong data.
    #[error(transparent)]
    Render(#[from] handlebars::RenderError),
}

/// Name a file is registered under: its stem, `index.hbs` -> `index`.
fn template_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

/// Every `.hbs` file directly in `dir`.
fn hbs_files<'a>(dir: &'a Dir<'a>) -> impl Iterator<Item = &'a File<'a>> + 'a {
    dir.files()
        .filter(|file| file.path().extension().and_then(|e| e.to_str()) == Some("hbs"))
}

/// Registry of the embedded pages and partials.
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Compile every embedded template.
    pub fn embedded() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();

        if let Some(partials) = TEMPLATE_DIR.get_dir("partials") {
            for file in hbs_files(partials) {
                Self::register(&mut registry, file, true)?;
            }
        }
        for file in hbs_files(&TEMPLATE_DIR) {
            Self::register(&mut registry, file, false)?;
        }

        Ok(Self { registry })
    }

    fn register(
        registry: &mut Handlebars<'static>,
        file: &File<'_>,
        partial: bool,
    ) -> Result<(), TemplateError> {
        let display = file.path().display().to_string();
        let name = template_name(file.path()).ok_or_else(|| TemplateError::Encoding(display.clone()))?;
        let source = file
            .contents_utf8()
            .ok_or_else(|| TemplateError::Encoding(display.clone()))?;

        let result = if partial {
            registry.register_partial(&name, source)
        } else {
            registry.register_template_string(&name, source)
        };
        result.map_err(|source| TemplateError::Compile {
            name: display,
            source,
        })?;

        debug!("Registered template {}", name);
        Ok(())
    }

    /// Render page `name` with `context`.
    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String, TemplateError> {
        if !self.registry.has_template(name) {
            return Err(TemplateError::Missing(name.to_string()));
        }
        Ok(self.registry.render(name, context)?)
    }
}
