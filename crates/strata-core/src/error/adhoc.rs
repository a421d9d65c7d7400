/// An error built from a free-form message.
///
/// Created through the [`err!`](crate::err) and [`bail!`](crate::bail) macros, or when a
/// plain string is passed as context.
#[derive(Debug)]
pub(super) struct AdhocError {
    message: Box<str>,
}

impl AdhocError {
    pub(super) fn new(message: String) -> AdhocError {
        AdhocError {
            message: message.into_boxed_str(),
        }
    }

    pub(super) fn from_args(args: core::fmt::Arguments<'_>) -> AdhocError {
        match args.as_str() {
            Some(s) => AdhocError::new(s.to_string()),
            None => AdhocError::new(args.to_string()),
        }
    }
}

impl std::error::Error for AdhocError {}

impl core::fmt::Display for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}
