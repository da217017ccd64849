use thiserror::Error;

/// Coarse classification of a [`CenterError`].
///
/// Operators (and scripts wrapping the CLI) care about one question first:
/// did the call reach the service, and if so did the service refuse it?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The exchange never completed: connect, I/O, framing or decoding failed.
    Transport,
    /// The service answered with an exception (access denied, bad password, ...).
    Service,
    /// The caller supplied something that could not be turned into a request.
    Input,
    /// The result could not be written out (closed pipe, full disk, ...).
    Output,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport error",
            ErrorKind::Service => "service error",
            ErrorKind::Input => "invalid input",
            ErrorKind::Output => "output error",
        }
    }
}

#[derive(Error, Debug)]
pub enum CenterError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Frame too large: {size} bytes (max {max} bytes)")]
    FrameTooLarge { size: usize, max: usize },

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// The service raised an exception it declares in its interface.
    #[error("{method} failed: {detail}")]
    Service {
        method: String,
        field_id: i16,
        detail: String,
    },

    /// The service failed the call outside its declared interface
    /// (unknown method, internal error, ...).
    #[error("{method} failed with application exception (kind {code}): {message}")]
    Application {
        method: String,
        code: i32,
        message: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid endpoint '{0}': expected <port> or <host>:<port>")]
    InvalidEndpoint(String),

    /// Writing to the console failed; the remote call itself is unaffected.
    #[error("Failed to write output: {0}")]
    Output(#[source] std::io::Error),
}

impl CenterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CenterError::Service { .. } | CenterError::Application { .. } => ErrorKind::Service,
            CenterError::InvalidArgument(_) | CenterError::InvalidEndpoint(_) => ErrorKind::Input,
            CenterError::Output(_) => ErrorKind::Output,
            CenterError::Connection(_)
            | CenterError::Io(_)
            | CenterError::Timeout(_)
            | CenterError::Protocol(_)
            | CenterError::FrameTooLarge { .. }
            | CenterError::JsonSerialization(_) => ErrorKind::Transport,
        }
    }

    pub fn is_service(&self) -> bool {
        self.kind() == ErrorKind::Service
    }
}

pub type Result<T> = std::result::Result<T, CenterError>;
