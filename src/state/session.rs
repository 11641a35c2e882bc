//! Per-connection lifecycle of a socket session.

use thiserror::Error;

/// Phases a socket connection moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Socket upgraded, token not yet verified.
    Connecting,
    /// Room token verified.
    Authenticated,
    /// Member of a room, relaying events.
    JoinedRoom,
    /// Terminal: socket closed or rejected.
    Disconnected,
}

/// Events applied to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Room token verified successfully.
    Authenticate,
    /// Missing cookie or verification failure.
    AuthFailed,
    /// Socket joined its room.
    JoinRoom,
    /// Socket closed (client close, error, or server kick).
    Disconnect,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidSessionTransition {
    /// Phase the session was in.
    pub from: SessionPhase,
    /// Event that cannot be applied from there.
    pub event: SessionEvent,
}

impl SessionPhase {
    /// Apply an event, returning the next phase.
    ///
    /// Auth failure jumps straight from `Connecting` to the terminal phase;
    /// `Disconnect` is accepted from every non-terminal phase.
    pub fn apply(self, event: SessionEvent) -> Result<SessionPhase, InvalidSessionTransition> {
        use SessionEvent::*;
        use SessionPhase::*;

        match (self, event) {
            (Connecting, Authenticate) => Ok(Authenticated),
            (Connecting, AuthFailed) => Ok(Disconnected),
            (Authenticated, JoinRoom) => Ok(JoinedRoom),
            (Connecting | Authenticated | JoinedRoom, Disconnect) => Ok(Disconnected),
            (from, event) => Err(InvalidSessionTransition { from, event }),
        }
    }

    /// Whether the session reached its terminal phase.
    pub fn is_terminal(self) -> bool {
        self == SessionPhase::Disconnected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_reaches_joined_room() {
        let phase = SessionPhase::Connecting
            .apply(SessionEvent::Authenticate)
            .unwrap()
            .apply(SessionEvent::JoinRoom)
            .unwrap();
        assert_eq!(phase, SessionPhase::JoinedRoom);

        let done = phase.apply(SessionEvent::Disconnect).unwrap();
        assert!(done.is_terminal());
    }

    #[test]
    fn auth_failure_goes_straight_to_disconnected() {
        let phase = SessionPhase::Connecting
            .apply(SessionEvent::AuthFailed)
            .unwrap();
        assert!(phase.is_terminal());
    }

    #[test]
    fn cannot_join_room_before_authenticating() {
        assert!(SessionPhase::Connecting.apply(SessionEvent::JoinRoom).is_err());
    }

    #[test]
    fn terminal_phase_accepts_nothing() {
        for event in [
            SessionEvent::Authenticate,
            SessionEvent::AuthFailed,
            SessionEvent::JoinRoom,
            SessionEvent::Disconnect,
        ] {
            assert!(SessionPhase::Disconnected.apply(event).is_err());
        }
    }
}
