//! Session cookies and the in-memory session registry.
//!
//! A session is an opaque random id mapped to an immutable grant snapshot.
//! Refreshing permissions builds a new snapshot and swaps it in wholesale;
//! snapshots are never mutated in place, so evaluations running against an
//! old `Arc` keep a consistent view.

use crate::access::types::{GrantMap, PermissionResource};
use crate::settings::Settings;
use axum::http::HeaderMap;
use base64ct::Encoding;
use chrono::Utc;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

pub const SESSION_COOKIE_NAME: &str = "breakwater_session";

#[derive(Clone, Debug)]
pub struct SessionCookie {
    pub session_id: String,
}

impl SessionCookie {
    pub fn new(session_id: String) -> Self {
        Self { session_id }
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let cookie_header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;

        // Parse cookie header for our session cookie
        for cookie in cookie_header.split(';') {
            let cookie = cookie.trim();
            if let Some(value) = cookie
                .strip_prefix(SESSION_COOKIE_NAME)
                .and_then(|s| s.strip_prefix('='))
            {
                return Some(Self {
                    session_id: value.to_string(),
                });
            }
        }
        None
    }

    pub fn to_cookie_header(&self, settings: &Settings) -> String {
        let secure = settings.base_url().starts_with("https://");

        format!(
            "{}={}; HttpOnly; {}SameSite=Lax; Path=/; Max-Age={}",
            SESSION_COOKIE_NAME,
            self.session_id,
            if secure { "Secure; " } else { "" },
            settings.session.ttl_secs
        )
    }

    pub fn delete_cookie_header() -> String {
        format!(
            "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
            SESSION_COOKIE_NAME
        )
    }
}

/// Immutable per-session snapshot of compiled grants.
#[derive(Debug)]
pub struct SessionSnapshot {
    pub grants: GrantMap,
    pub allow_resources: Vec<PermissionResource>,
    /// Policy names the snapshot was compiled from.
    pub policies: Vec<String>,
    /// Unix timestamp after which the session reads as absent.
    pub expires_at: i64,
}

/// In-memory registry of active sessions. Cloning shares the underlying map.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Arc<SessionSnapshot>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session and return its id.
    pub fn create(&self, snapshot: SessionSnapshot) -> String {
        let session_id = random_id();
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id.clone(), Arc::new(snapshot));
        session_id
    }

    /// Fetch a session's snapshot. Expired sessions read as absent.
    pub fn get(&self, session_id: &str) -> Option<Arc<SessionSnapshot>> {
        let snapshot = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()?;
        if snapshot.expires_at <= Utc::now().timestamp() {
            return None;
        }
        Some(snapshot)
    }

    /// Swap in a fresh snapshot for an existing session. Returns false if the
    /// session does not exist.
    pub fn replace(&self, session_id: &str, snapshot: SessionSnapshot) -> bool {
        let mut sessions = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match sessions.get_mut(session_id) {
            Some(existing) => {
                *existing = Arc::new(snapshot);
                true
            }
            None => false,
        }
    }

    /// Drop a session. Returns whether it existed.
    pub fn remove(&self, session_id: &str) -> bool {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id)
            .is_some()
    }

    /// Delete expired sessions, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now().timestamp();
        let mut sessions = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, snapshot| snapshot.expires_at > now);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn random_id() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64ct::Base64UrlUnpadded::encode_string(&bytes)
}
