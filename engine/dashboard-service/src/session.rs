//! In-memory browser sessions and the per-request context built from them

use crate::error::DashboardError;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;
use yahoo_fetcher::SessionToken;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "wrapped_session";

/// State held for one browser
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    /// Pending OAuth state, consumed by the callback
    pub csrf_state: Option<String>,
    pub token: Option<SessionToken>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    fn new(id: Uuid) -> Self {
        Self { id, csrf_state: None, token: None, last_seen: Utc::now() }
    }
}

/// Credentials available to a single request
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub session_id: Option<Uuid>,
    pub token: Option<SessionToken>,
}

impl RequestContext {
    /// The bearer token, or [`DashboardError::NotAuthenticated`] when absent or expired
    pub fn require_token(&self) -> Result<&str, DashboardError> {
        match &self.token {
            Some(token) if !token.is_expired(Utc::now()) => Ok(&token.access_token),
            _ => Err(DashboardError::NotAuthenticated),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.require_token().is_ok()
    }
}

/// Concurrent session map keyed by the cookie's UUID
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<Uuid, Session>,
    max_age: Duration,
}

impl SessionStore {
    pub fn new(max_age: Duration) -> Self {
        Self { sessions: DashMap::new(), max_age }
    }

    /// Reuse the cookie's session if it is still live, otherwise start a new one
    pub fn get_or_create(&self, cookie: Option<Uuid>) -> Uuid {
        if let Some(id) = cookie {
            if let Some(mut session) = self.sessions.get_mut(&id) {
                session.last_seen = Utc::now();
                return id;
            }
        }
        let id = Uuid::new_v4();
        self.sessions.insert(id, Session::new(id));
        tracing::debug!("Created session {}", id);
        id
    }

    /// Snapshot the session's credentials for one request
    pub fn context(&self, cookie: Option<Uuid>) -> RequestContext {
        let Some(id) = cookie else {
            return RequestContext::default();
        };
        match self.sessions.get_mut(&id) {
            Some(mut session) => {
                session.last_seen = Utc::now();
                RequestContext { session_id: Some(id), token: session.token.clone() }
            }
            None => RequestContext::default(),
        }
    }

    pub fn set_csrf_state(&self, id: Uuid, state: String) {
        if let Some(mut session) = self.sessions.get_mut(&id) {
            session.csrf_state = Some(state);
        }
    }

    /// Remove and return the pending OAuth state
    pub fn take_csrf_state(&self, id: Uuid) -> Option<String> {
        self.sessions.get_mut(&id).and_then(|mut session| session.csrf_state.take())
    }

    pub fn store_token(&self, id: Uuid, token: SessionToken) {
        if let Some(mut session) = self.sessions.get_mut(&id) {
            session.token = Some(token);
        }
    }

    pub fn clear_token(&self, id: Uuid) {
        if let Some(mut session) = self.sessions.get_mut(&id) {
            session.token = None;
        }
    }

    pub fn remove(&self, id: Uuid) {
        self.sessions.remove(&id);
    }

    /// Drop sessions idle longer than the max age; returns how many were removed
    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| now - session.last_seen < self.max_age);
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Session id from the raw cookie value; malformed values are treated as absent
pub fn parse_session_cookie(value: Option<String>) -> Option<Uuid> {
    value.and_then(|v| Uuid::parse_str(v.trim()).ok())
}

/// `Set-Cookie` value binding the browser to a session
pub fn session_cookie(id: Uuid, secure: bool, max_age_secs: u64) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value expiring the session cookie
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
