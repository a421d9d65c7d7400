use super::Error;
use crate::stmt::ConditionError;

#[derive(Debug)]
pub(super) struct InvalidCondition {
    leaf: ConditionError,
}

impl std::error::Error for InvalidCondition {}

impl core::fmt::Display for InvalidCondition {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid condition: {}", self.leaf)
    }
}

impl Error {
    /// Creates an error for a filter whose leaf failed operator validation.
    pub fn invalid_condition(leaf: ConditionError) -> Error {
        Error::from(super::ErrorKind::InvalidCondition(InvalidCondition { leaf }))
    }

    /// Returns `true` if this error is an invalid condition error.
    pub fn is_invalid_condition(&self) -> bool {
        self.condition_error().is_some()
    }

    /// The first invalid leaf of the rejected filter.
    pub fn condition_error(&self) -> Option<&ConditionError> {
        self.find(|kind| match kind {
            super::ErrorKind::InvalidCondition(err) => Some(&err.leaf),
            _ => None,
        })
    }
}
