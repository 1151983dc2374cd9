//! `keymagic-core`: decodes KM2 keyboard layout files and turns keystrokes
//! into composing-buffer edit actions.
//!
//! The crate is a small bytecode interpreter: [`format`] decodes the
//! binary layout into a [`layout::Layout`], [`matcher`] scans rules in
//! declaration order against the composing buffer and the current key,
//! [`executor`] runs a matched rule's RHS opcodes, and [`engine::Engine`]
//! ties the loop together behind a single `process_key` entry point. None
//! of this touches any platform input API directly — that is the host
//! shim's job; this crate only computes what the host should do.

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod format;
pub mod hotkey;
pub mod key;
pub mod layout;
pub mod matcher;
pub mod state;
pub mod vk;

pub use action::{ActionKind, EditAction};
pub use config::EngineLimits;
pub use engine::Engine;
pub use error::{DecodeError, DecodeErrorKind, HotkeyError};
pub use hotkey::Hotkey;
pub use key::KeyEvent;
pub use layout::Layout;
pub use vk::VirtualKey;
