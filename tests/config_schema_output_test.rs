// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::Result;
use network_frontend::config::{self, Config};

#[test]
fn test_config_schema_output() -> Result<()> {
    // Output goes to stdout, only the absence of error is checked
    config::output_config_schema()?;
    Ok(())
}

#[test]
fn test_sample_config_matches_schema() -> Result<()> {
    let document = serde_json::to_value(Config::default())?;
    Config::validate_document(&document)?;
    Ok(())
}
