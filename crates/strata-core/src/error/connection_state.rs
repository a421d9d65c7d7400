use super::Error;

/// Error when an operation is not valid in the current connection state.
///
/// This occurs when:
/// - `close()` is called on a `Db` that is already disconnected
/// - a query is issued before `connect()` completed
/// - `connect()` is called while a connection is open or being opened
#[derive(Debug)]
pub(super) enum ConnectionStateError {
    AlreadyClosed,
    NotConnected,
    InvalidTransition { from: Box<str>, to: Box<str> },
}

impl std::error::Error for ConnectionStateError {}

impl core::fmt::Display for ConnectionStateError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            ConnectionStateError::AlreadyClosed => f.write_str("connection is already closed"),
            ConnectionStateError::NotConnected => f.write_str("not connected"),
            ConnectionStateError::InvalidTransition { from, to } => {
                write!(f, "cannot move connection from {from} to {to}")
            }
        }
    }
}

impl Error {
    /// Creates an error for closing a connection that is not open.
    pub fn already_closed() -> Error {
        Error::from(super::ErrorKind::ConnectionState(
            ConnectionStateError::AlreadyClosed,
        ))
    }

    /// Creates an error for using a connection before it is connected.
    pub fn not_connected() -> Error {
        Error::from(super::ErrorKind::ConnectionState(
            ConnectionStateError::NotConnected,
        ))
    }

    /// Creates an error for an illegal state transition, e.g. calling
    /// `connect()` twice.
    pub fn connection_state(from: impl core::fmt::Display, to: impl core::fmt::Display) -> Error {
        Error::from(super::ErrorKind::ConnectionState(
            ConnectionStateError::InvalidTransition {
                from: from.to_string().into(),
                to: to.to_string().into(),
            },
        ))
    }

    /// Returns `true` if this error is an already-closed error.
    pub fn is_already_closed(&self) -> bool {
        matches!(
            self.kind(),
            super::ErrorKind::ConnectionState(ConnectionStateError::AlreadyClosed)
        )
    }

    /// Returns `true` if this error is a not-connected error.
    pub fn is_not_connected(&self) -> bool {
        matches!(
            self.kind(),
            super::ErrorKind::ConnectionState(ConnectionStateError::NotConnected)
        )
    }

    /// Returns `true` if this error is any connection state error.
    pub fn is_connection_state(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ConnectionState(_))
    }
}
