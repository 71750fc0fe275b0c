//! Session identity and resume position.

/// Session-scoped state: identity, last seen sequence number, and whether
/// the gateway will accept a resume. Connection-scoped state (socket,
/// heartbeat timer) lives in the client and is rebuilt on every reconnect;
/// this struct survives across reconnects.
#[derive(Debug, Clone, Default)]
pub struct Session {
    session_id: Option<String>,
    last_sequence: Option<u64>,
    resumable: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sequence number seen on an inbound frame. Keeps the maximum
    /// seen so far; sequence numbers never move backwards.
    pub fn record_sequence(&mut self, n: u64) {
        match self.last_sequence {
            Some(current) if current >= n => {}
            _ => self.last_sequence = Some(n),
        }
    }

    /// Forget the previous session entirely; the next handshake must
    /// identify from scratch.
    pub fn begin_new_session(&mut self) {
        self.session_id = None;
        self.last_sequence = None;
        self.resumable = false;
    }

    /// Store the session id announced by the ready event and mark the
    /// session resumable.
    pub fn capture_session_id(&mut self, id: String) {
        self.session_id = Some(id);
        self.resumable = true;
    }

    /// True iff a session id was captured and the gateway has not
    /// invalidated it since.
    pub fn can_resume(&self) -> bool {
        self.resumable && self.session_id.is_some()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }
}
