//! Structured codec errors with a context-frame trail.
//!
//! Every encode/decode failure in this crate is an [`Error`]: a message
//! kind plus a stack of context frames pushed by named codecs and
//! combinators on the way out.  Rendering joins the frames outermost-first:
//! `header/size/5 is greater than maximum value 3 for 2-bit unsigned integer`.
//!
//! [`Attempt`] is a plain `Result` alias, so `?`, `map` and `and_then`
//! provide the short-circuiting composition decoders rely on.  The core
//! never panics; the only panicking entry points are the explicit
//! `encode_valid`/`decode_valid_value` conveniences on `Codec`.

use std::fmt;
use thiserror::Error as ThisError;

/// Result of any fallible codec operation.
pub type Attempt<A> = Result<A, Error>;

/// The kinds of failure the codec algebra can report.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("{0}")]
    General(String),
    #[error("cannot acquire {needed} bits from a vector that contains {have} bits")]
    InsufficientBits { needed: u64, have: u64 },
    #[error("unknown discriminator {0}")]
    NoDiscriminatorMatch(String),
}

/// A codec failure: an [`ErrorKind`] plus the context frames accumulated
/// while the failure bubbled out of a composite codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    /// Outermost frame first.
    context: Vec<String>,
}

impl Error {
    pub fn new(message: impl Into<String>) -> Self {
        Self { kind: ErrorKind::General(message.into()), context: Vec::new() }
    }

    pub fn insufficient_bits(needed: u64, have: u64) -> Self {
        Self { kind: ErrorKind::InsufficientBits { needed, have }, context: Vec::new() }
    }

    pub fn no_discriminator_match(tag: impl Into<String>) -> Self {
        Self { kind: ErrorKind::NoDiscriminatorMatch(tag.into()), context: Vec::new() }
    }

    /// Prepend a context frame.  Combinators call this as the error
    /// propagates outward, so the outermost codec's frame ends up first.
    #[must_use]
    pub fn push_context(mut self, frame: impl Into<String>) -> Self {
        self.context.insert(0, frame.into());
        self
    }

    /// The message without any context frames.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn context(&self) -> &[String] {
        &self.context
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn is_insufficient_bits(&self) -> bool {
        matches!(self.kind, ErrorKind::InsufficientBits { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.context {
            write!(f, "{frame}/")?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for Error {}
