//! Error kinds for the rule engine, grounded in §7 of the design notes.
//!
//! Decode/resolution/FEN errors are expected and routed by callers (a
//! malformed move just ends a game, it doesn't unwind the process), so they
//! carry a closed [`ErrorKind`] rather than an opaque [`anyhow::Error`].

use std::error;
use std::fmt::{self, Display};
use std::result;

/// The crate's result type.
pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Ill-formed SAN text (C4).
    Decode,
    /// No legal move matches, or more than one does, or a disambiguator is
    /// inconsistent with the board (C5).
    Resolution,
    /// Illegal castling attempt specifically (subset of `Resolution`, kept
    /// distinct because callers often want to report it differently).
    IllegalCastle,
    /// Structurally malformed FEN/EPD (C7).
    Fen,
    /// Two ECO entries share a `(required_hash, cumulative_hash, half_moves)`
    /// key (C11).
    TableCollision,
    /// Malformed textual/positional/endings specification file.
    SpecParse,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Decode => "decode error",
            ErrorKind::Resolution => "resolution error",
            ErrorKind::IllegalCastle => "illegal castling",
            ErrorKind::Fen => "fen error",
            ErrorKind::TableCollision => "table collision",
            ErrorKind::SpecParse => "spec parse error",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The engine's error type. Carries the [`ErrorKind`] plus a human-readable
/// message and, occasionally, an underlying error.
#[derive(Debug)]
pub enum Error {
    Simple(ErrorKind),
    Message(ErrorKind, String),
    Custom(ErrorKind, Box<dyn error::Error + Send + Sync>),
}

impl Error {
    pub fn new<E>(kind: ErrorKind, inner: E) -> Self
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Self::Custom(kind, inner.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Simple(k) | Error::Message(k, _) | Error::Custom(k, _) => *k,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Simple(kind) => write!(f, "{kind}"),
            Error::Message(kind, msg) => write!(f, "{kind}: {msg}"),
            Error::Custom(kind, inner) => write!(f, "{kind}: {inner}"),
        }
    }
}

impl error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::Simple(kind)
    }
}

impl<S: ToString> From<(ErrorKind, S)> for Error {
    fn from((kind, msg): (ErrorKind, S)) -> Self {
        Self::Message(kind, msg.to_string())
    }
}

/// Shorthand for building a [`Error::Message`] inline, in the style of
/// `anyhow::bail!`.
macro_rules! bail {
    ($kind:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::Message($kind, format!($($arg)*)))
    };
}
pub use bail;
