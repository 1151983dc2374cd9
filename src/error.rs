//! Error types for the decode path, the hotkey grammar, and engine configuration.
//!
//! Every other failure mode in this crate degrades gracefully instead of
//! returning an error: a missing layout makes `process_key` act as
//! passthrough, a composing buffer overflow truncates and logs, and a
//! rematch budget exhaustion just stops iterating. Only the KM2 decode
//! path and the hotkey grammar are user-visible failure channels.

use thiserror::Error;

/// Where in the byte stream a [`DecodeError`] was detected.
pub type ByteOffset = usize;

/// A KM2 layout file failed to decode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid KM2 layout at byte {offset}: {kind}")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub offset: ByteOffset,
}

impl DecodeError {
    pub fn new(kind: DecodeErrorKind, offset: ByteOffset) -> Self {
        Self { kind, offset }
    }
}

/// The specific way a KM2 byte stream was malformed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    #[error("buffer ended before the expected data")]
    UnexpectedEof,
    #[error("magic code is not 'KMKL'")]
    BadMagic,
    #[error("unsupported major version")]
    UnsupportedMajorVersion,
    #[error("opcode sequence ends mid-opcode")]
    TruncatedOpcode,
    #[error("STRING literal length overruns its opcode sequence")]
    StringOverrun,
    #[error("VARIABLE/ANYOF/NANYOF index is out of range of the string table")]
    StringIndexOutOfRange,
    #[error("REFERENCE index is out of range of the rule's captures")]
    ReferenceIndexOutOfRange,
    #[error("unknown opcode {0:#06x}")]
    UnknownOpcode(u16),
    #[error("MODIFIER opcode without a preceding PREDEFINED")]
    DanglingModifier,
    #[error("opcode is not legal in this position")]
    IllegalOpcode,
}

/// A hotkey string failed to parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("hotkey string is empty")]
    Empty,
    #[error("hotkey string ends with a trailing separator")]
    TrailingSeparator,
    #[error("unknown hotkey token {0:?}")]
    UnknownToken(String),
    #[error("hotkey has no key token, only modifiers")]
    ModifierOnly,
    #[error("hotkey names more than one key token")]
    MultipleKeys,
}
