//! Active IPMI sessions.
//!
//! The store is shared by every datagram handler. Lookups take a read lock
//! on the table only; the per-session state sits behind its own mutex so that
//! traffic on different sessions never contends.

pub mod auth;

use std::{collections::HashMap, sync::Arc};

use parking_lot::{Mutex, RwLock};

use auth::AuthType;

/// A password, zero-padded to the 16 bytes IPMI v1.5 authentication uses.
#[derive(Clone, PartialEq)]
pub struct Password([u8; 16]);

impl Password {
    /// Returns `None` if `password` is longer than 16 bytes.
    pub fn new(password: &[u8]) -> Option<Self> {
        if password.len() > 16 {
            return None;
        }

        let mut padded = [0u8; 16];
        padded[..password.len()].copy_from_slice(password);
        Some(Self(padded))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl core::fmt::Debug for Password {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Password(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub name: String,
    pub password: Password,
}

impl User {
    pub fn new(name: impl Into<String>, password: Password) -> Self {
        Self {
            name: name.into(),
            password,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: u32,
    user: User,
    auth_type: AuthType,
    local_sequence: u32,
    remote_sequence: u32,
}

impl Session {
    pub fn new(id: u32, user: User, auth_type: AuthType, initial_sequence: u32) -> Self {
        Self {
            id,
            user,
            auth_type,
            local_sequence: initial_sequence,
            remote_sequence: initial_sequence,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    pub fn local_sequence(&self) -> u32 {
        self.local_sequence
    }

    pub fn remote_sequence(&self) -> u32 {
        self.remote_sequence
    }

    /// Move both sequence counters forward by one. Called exactly once per
    /// response.
    pub fn advance(&mut self) {
        self.local_sequence = self.local_sequence.wrapping_add(1);
        self.remote_sequence = self.remote_sequence.wrapping_add(1);
    }
}

/// A session as held by the [`SessionStore`]. Lock it for the whole
/// verify/advance/stamp cycle of a response.
pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<u32, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session with a random, unused, non-zero session ID.
    pub fn open(&self, user: User, auth_type: AuthType, initial_sequence: u32) -> u32 {
        let mut sessions = self.sessions.write();

        let id = loop {
            let id: u32 = rand::random();
            if id != 0 && !sessions.contains_key(&id) {
                break id;
            }
        };

        log::debug!("Opening session 0x{id:08X} for user '{}'", user.name);

        let session = Session::new(id, user, auth_type, initial_sequence);
        sessions.insert(id, Arc::new(Mutex::new(session)));

        id
    }

    /// Register a session that was established elsewhere. Returns the
    /// session it replaced, if any.
    ///
    /// Session ID 0 is reserved for sessionless traffic and is refused.
    pub fn insert(&self, session: Session) -> Result<Option<Session>, Session> {
        if session.id == 0 {
            return Err(session);
        }

        let previous = self
            .sessions
            .write()
            .insert(session.id, Arc::new(Mutex::new(session)));

        Ok(previous.map(|handle| handle.lock().clone()))
    }

    pub fn lookup(&self, session_id: u32) -> Option<SessionHandle> {
        self.sessions.read().get(&session_id).cloned()
    }

    /// Close a session. Subsequent lookups of `session_id` fail.
    pub fn close(&self, session_id: u32) -> Option<Session> {
        let handle = self.sessions.write().remove(&session_id)?;
        log::debug!("Closed session 0x{session_id:08X}");
        let session = handle.lock().clone();
        Some(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
