use core::fmt;

/// Errors returned by the RDS parser.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// `parse_string` was given a line that isn't 16 or 18 hex digits.
    MalformedLine,

    /// A `parse`/`parse_string`/`clear` call was made while a [`Handler`]
    /// callback from an outer call was still running.
    ///
    /// [`Handler`]: crate::dispatch::Handler
    ReEntrant,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::MalformedLine => "malformed ASCII-hex group line",
            Error::ReEntrant => "parser re-entered from within a callback",
        })
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
