// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Web layer: routes, request guards, sessions and templates

pub mod auth;
pub mod catchers;
pub mod guards;
pub mod handlers;
pub mod pages;
pub mod request_guard;
pub mod server;
pub mod session;
pub mod templates;

pub use guards::{AccessPolicy, AdminAccess, Authorized, StaffAccess};
pub use server::build_rocket;
pub use session::UserSession;
