// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Network frontend library
//!
//! A browser-facing front end for a network-management API. Users sign in
//! with Azure AD (Entra ID), are admitted according to their group
//! membership, and browse server-rendered dashboards that read from the
//! backend API.
//!
//! - [`config`]: YAML configuration, validated against a JSON schema
//! - [`identity`]: OAuth2 authorization-code grant and identity tokens
//! - [`backend`]: calls to the network-management API
//! - [`web`]: Rocket routes, authorization gate, sessions and templates

pub mod backend;
pub mod config;
pub mod identity;
pub mod web;
