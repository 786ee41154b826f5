//! Error types for the PDF generator.

/// Result type alias for PDF generation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building or saving a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Backing storage could not grow
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// An argument did not refer to a usable object (missing page,
    /// bad parent bookmark, unknown font, ...)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced object does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// IO error while writing the output file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Negated POSIX-style code for this error, as stored in the
    /// document's error slot (`-ENOMEM`, `-EINVAL`, `-ENOENT`, `-EIO`).
    pub fn code(&self) -> i32 {
        match self {
            Error::OutOfMemory(_) => -12,
            Error::InvalidArgument(_) => -22,
            Error::NotFound(_) => -2,
            Error::Io(_) => -5,
        }
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(err: std::collections::TryReserveError) -> Self {
        Error::OutOfMemory(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::OutOfMemory("x".into()).code(), -12);
        assert_eq!(Error::InvalidArgument("x".into()).code(), -22);
        assert_eq!(Error::NotFound("x".into()).code(), -2);
        let io = Error::from(std::io::Error::other("boom"));
        assert_eq!(io.code(), -5);
    }

    #[test]
    fn test_error_messages() {
        let err = Error::InvalidArgument("no pages available".into());
        let msg = format!("{}", err);
        assert!(msg.contains("invalid argument"));
        assert!(msg.contains("no pages available"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
