/*!
 * Session store and auth lifecycle state.
 *
 * The session store is the sole signal of signed-in state: while it holds no
 * token the application shows only the sign-in prompt and issues no data
 * query. It is an explicit object owned by the controller and passed where
 * needed, never a global, and the token lives in memory only for the
 * lifetime of the process.
 */

use chrono::{DateTime, Utc};
use log::info;

/// An established sign-in
///
/// Held in memory only; nothing here is ever persisted.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque bearer token returned by the identity provider
    pub access_token: String,
    /// Email the session was established for
    pub email: String,
    /// When the sign-in completed
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    /// Create a session for a freshly issued token
    pub fn new(access_token: String, email: String) -> Self {
        Self {
            access_token,
            email,
            signed_in_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (signed in {})",
            self.email,
            self.signed_in_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

/// Holder of the current session, if any
///
/// Lifecycle: `establish` on successful sign-in, `clear` on sign-out.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: Option<Session>,
}

impl SessionStore {
    /// Create an empty, unauthenticated store
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Install a session after a successful sign-in
    pub fn establish(&mut self, session: Session) {
        info!("Session established for {}", session.email);
        self.current = Some(session);
    }

    /// Drop the current session synchronously
    ///
    /// After this returns, `current_token` is `None` and the next render
    /// cycle must show the sign-in prompt.
    pub fn clear(&mut self) {
        if let Some(session) = self.current.take() {
            info!("Session cleared for {}", session.email);
        }
    }

    /// The current bearer token, if signed in
    pub fn current_token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.access_token.as_str())
    }

    /// The current session, if signed in
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Whether a session is established
    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }
}
