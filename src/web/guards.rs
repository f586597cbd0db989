// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the network-frontend project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Authorization gate
//!
//! [`Authorized<P>`] is a request guard: adding it to a handler's arguments
//! makes the handler run only for signed-in members of the groups named by
//! the policy `P`.
//!
//! | Situation                         | Outcome                               |
//! |-----------------------------------|---------------------------------------|
//! | `web.debug` is `true`             | success with a placeholder user       |
//! | no session cookie                 | 401, caught and sent to `/login`      |
//! | session, but no allowed group     | 403, caught and sent to `/unauthorized` |
//! | session with an allowed group     | success                               |
//!
//! ```
//! use rocket::get;
//! use network_frontend::web::guards::{AdminAccess, Authorized};
//!
//! #[get("/audit")]
//! fn audit(auth: Authorized<AdminAccess>) -> String {
//!     format!("hello {:?}", auth.user.display_name())
//! }
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use log::{debug, info};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};

use super::session::{load_session, UserSession};
use crate::config::{AzureConfig, Config};

/// Which groups may pass a gate.
pub trait AccessPolicy: Send + Sync + 'static {
    /// Group object ids allowed through.
    fn allowed_groups(config: &AzureConfig) -> Vec<&str>;
}

/// Admin or helpdesk group: every dashboard page.
pub struct StaffAccess;

impl AccessPolicy for StaffAccess {
    fn allowed_groups(config: &AzureConfig) -> Vec<&str> {
        config.staff_groups()
    }
}

/// Admin group only: the settings page.
pub struct AdminAccess;

impl AccessPolicy for AdminAccess {
    fn allowed_groups(config: &AzureConfig) -> Vec<&str> {
        config.admin_groups()
    }
}

/// A request that passed the gate of policy `P`.
pub struct Authorized<P: AccessPolicy> {
    /// The signed-in user, or the placeholder in debug mode.
    pub user: UserSession,
    /// Set when the gate was bypassed by debug mode.
    pub debug: bool,
    _policy: PhantomData<P>,
}

impl<P: AccessPolicy> Authorized<P> {
    fn new(user: UserSession, debug: bool) -> Self {
        Self {
            user,
            debug,
            _policy: PhantomData,
        }
    }
}

#[rocket::async_trait]
impl<'r, P: AccessPolicy> FromRequest<'r> for Authorized<P> {
    type Error = &'static str;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = match request.guard::<&State<Arc<Config>>>().await {
            Outcome::Success(config) => config,
            _ => {
                return Outcome::Error((Status::InternalServerError, "Missing config state"));
            }
        };

        if config.web.debug {
            return Outcome::Success(Authorized::new(UserSession::debug_placeholder(), true));
        }

        let session = match load_session(request.cookies()) {
            Some(session) => session,
            None => {
                debug!("No session for {}, login required", request.uri());
                return Outcome::Error((Status::Unauthorized, "Login required"));
            }
        };

        if !session.is_member_of_any(&P::allowed_groups(&config.azure)) {
            info!(
                "Access to {} denied for {}",
                request.uri(),
                session.preferred_username.as_deref().unwrap_or("unknown user")
            );
            return Outcome::Error((Status::Forbidden, "Not a member of an allowed group"));
        }

        Outcome::Success(Authorized::new(session, false))
    }
}
