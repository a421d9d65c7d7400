use serde::Serialize;

/// How a field is populated automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoStrategy {
    /// Set to the current time when a record is inserted.
    Now,

    /// Set to the current time when a record is inserted or updated.
    NowOnUpdate,
}
