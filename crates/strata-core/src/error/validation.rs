use super::Error;
use crate::stmt::ValidationErrors;

/// Error when records fail field validation.
///
/// Nothing reaches the backend when this is returned.
#[derive(Debug)]
pub(super) struct ValidationFailed {
    errors: ValidationErrors,
}

impl std::error::Error for ValidationFailed {}

impl core::fmt::Display for ValidationFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "validation failed: {}", self.errors)
    }
}

impl Error {
    /// Creates a validation error from a field-keyed error map.
    pub fn validation(errors: ValidationErrors) -> Error {
        Error::from(super::ErrorKind::Validation(ValidationFailed { errors }))
    }

    /// Returns `true` if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        self.validation_errors().is_some()
    }

    /// The field-keyed errors, if this is a validation error.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        self.find(|kind| match kind {
            super::ErrorKind::Validation(err) => Some(&err.errors),
            _ => None,
        })
    }
}
