use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn unsupported_buffer_kind(kind: impl Into<String>) -> Error {
        Error(ErrorKind::UnsupportedBufferKind { kind: kind.into() }.into())
    }

    pub fn invalid_range(address: u64, length: usize, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidRange {
                address,
                length,
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    /// Returns `true` if this error was raised for a buffer without a native address.
    pub fn is_unsupported_buffer_kind(&self) -> bool {
        matches!(self.kind(), ErrorKind::UnsupportedBufferKind { .. })
    }

    /// Returns `true` if this error was raised for a rejected address range.
    pub fn is_invalid_range(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidRange { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("buffer of kind '{kind}' is not backed by addressable native memory")]
    UnsupportedBufferKind { kind: String },

    #[error("invalid range at {address:#x} (length {length}): {message}")]
    InvalidRange {
        address: u64,
        length: usize,
        message: String,
    },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}
