// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the network frontend
use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use network_frontend::config::{self, Config};
use network_frontend::web::{build_rocket, session::derive_secret_key};
use rocket::config::LogLevel;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

/// Web front end for the network-management API
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (YAML format)
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Web server port, overrides `web.port`
    #[arg(short = 'p', long)]
    web_port: Option<u16>,

    /// Web server address, overrides `web.ip`
    #[arg(short = 'a', long)]
    web_address: Option<String>,

    /// Bypass login and group checks, overrides `web.debug`
    #[arg(long)]
    debug: bool,

    /// Output the configuration schema as JSON and exit
    #[arg(long)]
    show_config_schema: bool,

    /// Enable verbose logging (debug level)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Disable all logging output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[rocket::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if args.show_config_schema {
        return config::output_config_schema();
    }

    let mut config = match Config::from_file(&args.config) {
        Ok(config) => config,
        Err(err) if err.is_not_found() => {
            error!("Config file not found, exiting");
            return Err(err.into());
        }
        Err(err) => {
            error!("Config file is invalid, exiting");
            return Err(err.into());
        }
    };
    config.apply_args(args.web_port, args.web_address.clone(), args.debug);

    let master_password = env::var("API_MASTER_PW").ok();
    let secret_key = derive_secret_key(master_password.as_deref());

    let figment = rocket::Config::figment()
        .merge((
            "ident",
            format!("NetworkFrontend/{}", env!("CARGO_PKG_VERSION")),
        ))
        .merge(("address", config.web.ip.clone()))
        .merge(("port", config.web.port))
        .merge(("secret_key", secret_key))
        .merge((
            "log_level",
            if args.verbose {
                LogLevel::Normal
            } else {
                LogLevel::Critical
            },
        ));

    info!(
        "Starting web server on {}:{}",
        config.web.ip, config.web.port
    );

    let rocket = build_rocket(figment, Arc::new(config))?;
    rocket
        .launch()
        .await
        .context("Web server terminated with an error")?;

    Ok(())
}
