//! Client container for the Strata API.
//!
//! # Design
//! `Client` owns the immutable [`Config`], the shared transport, and the one
//! piece of mutable state in the crate: the session-token slot. It performs
//! no I/O itself — each resource accessor returns a borrowing handle whose
//! methods build a fresh [`RequestContext`] per call. The context snapshots
//! the credential at build time, so setting or clearing the token between or
//! during concurrent calls never affects requests already dispatched.

use std::sync::{Arc, RwLock};

use crate::auth::Auth;
use crate::config::Config;
use crate::database::Databases;
use crate::pipeline::RequestContext;
use crate::record::Records;
use crate::schema::Schema;
use crate::transport::{ReqwestTransport, Transport};

pub struct Client {
    config: Config,
    transport: Arc<dyn Transport>,
    /// Session token set after a login; overrides the configured API key
    /// while present. Opaque — never validated locally.
    token: RwLock<Option<String>>,
}

impl Client {
    /// Build a client over the default reqwest-backed transport.
    pub fn new(config: Config) -> Client {
        Client::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    /// Build a client over an injected transport. Test suites use this to
    /// substitute a scripted responder for the network.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Client {
        Client {
            config,
            transport,
            token: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Store a session token; subsequent requests use it in place of the
    /// configured API key.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
    }

    /// Drop the session token; subsequent requests fall back to the API key.
    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Snapshot everything one dispatch needs. Called once per outgoing
    /// request by the resource modules.
    pub(crate) fn context(&self) -> RequestContext<'_> {
        let credential = self
            .token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or_else(|| self.config.api_key().to_string());
        RequestContext {
            base_url: self.config.base_url(),
            credential,
            scheme: self.config.scheme(),
            timeout: self.config.timeout(),
            transport: self.transport.as_ref(),
        }
    }

    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    pub fn databases(&self) -> Databases<'_> {
        Databases::new(self)
    }

    pub fn schema(&self) -> Schema<'_> {
        Schema::new(self)
    }

    pub fn records(&self) -> Records<'_> {
        Records::new(self)
    }
}
