use super::Error;

/// Error when the configuration is invalid.
///
/// This occurs before any I/O, when:
/// - the connection URL is malformed or uses an unknown scheme
/// - the backend the URL selects was not compiled in
/// - a configuration file cannot be parsed
#[derive(Debug)]
pub(super) struct InvalidConfiguration {
    message: Box<str>,
}

impl std::error::Error for InvalidConfiguration {}

impl core::fmt::Display for InvalidConfiguration {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid configuration: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidConfiguration(InvalidConfiguration {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid configuration error.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidConfiguration(_))
    }
}
