use super::Error;

/// Error when a caller uses a reserved key with the options store.
///
/// Keys starting with `_` belong to the engine (fingerprint, key registry,
/// locks).
#[derive(Debug)]
pub(super) struct InvalidOptionKey {
    key: Box<str>,
}

impl std::error::Error for InvalidOptionKey {}

impl core::fmt::Display for InvalidOptionKey {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "option key `{}` is reserved", self.key)
    }
}

impl Error {
    /// Creates an invalid option key error.
    pub fn invalid_option_key(key: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidOptionKey(InvalidOptionKey {
            key: key.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid option key error.
    pub fn is_invalid_option_key(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidOptionKey(_))
    }
}
