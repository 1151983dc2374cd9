//! The immutable, decoded layout value types produced by
//! [`crate::format::decode`]. Nothing in this module touches raw bytes;
//! that is entirely the decoder's job.

use crate::format::opcode::{LhsOp, RhsOp};

/// KM2 format version, gating which sections/fields are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    /// The major version this crate understands at all (magic + major
    /// check only; distinct from full compatibility).
    pub fn is_known_format(&self) -> bool {
        self.major == 1
    }

    /// Full compatibility: major version 1, minor in the supported range.
    pub fn is_compatible(&self) -> bool {
        self.major == 1 && (1..=5).contains(&self.minor)
    }

    /// Info section present: minor >= 4.
    pub fn has_info_section(&self) -> bool {
        self.minor >= 4
    }

    /// Right-alt option byte present: minor >= 5.
    pub fn has_right_alt_option(&self) -> bool {
        self.minor >= 5
    }
}

/// Layout behavior flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub track_caps: bool,
    pub auto_bksp: bool,
    pub eat: bool,
    pub pos_based: bool,
    pub right_alt: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            track_caps: true,
            auto_bksp: false,
            eat: false,
            pos_based: false,
            right_alt: true,
        }
    }
}

/// The type tag of an [`InfoEntry`] (info section).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoTag {
    Name,
    Description,
    Font,
    Icon,
    Hotkey,
    Unknown(u32),
}

pub const INFO_NAME: u32 = 0x6E61_6D65;
pub const INFO_DESC: u32 = 0x6465_7363;
pub const INFO_FONT: u32 = 0x666F_6E74;
pub const INFO_ICON: u32 = 0x6963_6F6E;
pub const INFO_HOTKEY: u32 = 0x686B_6579;

impl InfoTag {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            INFO_NAME => InfoTag::Name,
            INFO_DESC => InfoTag::Description,
            INFO_FONT => InfoTag::Font,
            INFO_ICON => InfoTag::Icon,
            INFO_HOTKEY => InfoTag::Hotkey,
            other => InfoTag::Unknown(other),
        }
    }
}

/// A single metadata entry from the info section. Purely descriptive;
/// the matcher and executor never read these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoEntry {
    pub tag: InfoTag,
    pub data: Vec<u8>,
}

impl InfoEntry {
    pub fn is_name(&self) -> bool {
        matches!(self.tag, InfoTag::Name)
    }

    pub fn is_description(&self) -> bool {
        matches!(self.tag, InfoTag::Description)
    }

    pub fn is_font(&self) -> bool {
        matches!(self.tag, InfoTag::Font)
    }

    pub fn is_icon(&self) -> bool {
        matches!(self.tag, InfoTag::Icon)
    }

    pub fn is_hotkey(&self) -> bool {
        matches!(self.tag, InfoTag::Hotkey)
    }

    /// Entry contents decoded as UTF-16LE text, for the entries that carry
    /// text (name/description/hotkey); lossy on malformed input since this
    /// is metadata, not something the matcher depends on.
    pub fn as_text(&self) -> String {
        let units: Vec<u16> = self
            .data
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    }
}

/// A single rule: `(lhs_ops, rhs_ops)`, matched in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub lhs: Vec<LhsOp>,
    pub rhs: Vec<RhsOp>,
}

impl Rule {
    /// Number of LHS sub-patterns that produce a capture (switches don't).
    pub fn capture_count(&self) -> usize {
        self.lhs.iter().filter(|op| op.is_capturing()).count()
    }
}

/// A fully decoded, immutable KM2 layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub version: Version,
    pub options: Options,
    pub info: Vec<InfoEntry>,
    /// String table, indexed from 1 in the file format; stored 0-based
    /// here (`strings[0]` is string-table index 1).
    pub strings: Vec<Vec<u16>>,
    pub rules: Vec<Rule>,
}

impl Layout {
    /// Resolves a 1-based string-table index to its UTF-16 content.
    pub fn string(&self, index: u16) -> Option<&[u16]> {
        if index == 0 {
            return None;
        }
        self.strings.get(index as usize - 1).map(|v| v.as_slice())
    }
}
