//! Raw KM2 opcode words and the structured LHS/RHS intermediate
//! representation built from them.
//!
//! The decoder walks each rule's raw `u16` word stream exactly once and
//! produces a tagged sum (`LhsOp`/`RhsOp`) so the matcher and executor never
//! re-scan raw words on every keystroke.

/// Canonical on-disk opcode codes.
pub const OP_STRING: u16 = 0xF0;
pub const OP_VARIABLE: u16 = 0xF1;
pub const OP_REFERENCE: u16 = 0xF2;
pub const OP_PREDEFINED: u16 = 0xF3;
pub const OP_MODIFIER: u16 = 0xF4;
pub const OP_ANYOF: u16 = 0xF5;
pub const OP_AND: u16 = 0xF6;
pub const OP_NANYOF: u16 = 0xF7;
pub const OP_ANY: u16 = 0xF8;
pub const OP_SWITCH: u16 = 0xF9;

/// `MODIFIER` operand bits.
pub const MOD_SHIFT: u16 = 0x01;
pub const MOD_CTRL: u16 = 0x02;
pub const MOD_ALT: u16 = 0x04;
pub const MOD_CAPS: u16 = 0x08;
pub const MOD_ANY: u16 = 0x10;

/// A decoded LHS sub-pattern. `Switch` never consumes a matching
/// position; everything else does, and everything but `Switch` yields a
/// capture in LHS order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LhsOp {
    /// Literal UTF-16 code units to match verbatim.
    StringLit(Vec<u16>),
    /// Match the string-table entry at this (1-based) index verbatim.
    Variable(u16),
    /// Match any single code point present in the string-table entry at
    /// this index (the class).
    AnyOf(u16),
    /// Match any single code point *absent* from the string-table entry.
    NAnyOf(u16),
    /// Match any single code point.
    Any,
    /// Match the incoming key's virtual-key code, with an optional
    /// required modifier state (`None` means no modifier constraint).
    Predefined { vk: u16, modifiers: Option<u16> },
    /// Require the named switch to be active; consumes no input.
    Switch(u16),
}

/// A decoded RHS opcode, executed in sequence against a rule's captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RhsOp {
    /// Emit this literal verbatim.
    StringLit(Vec<u16>),
    /// Emit the string-table entry at this index verbatim.
    Variable(u16),
    /// Emit the value of the N-th LHS capture (1-based).
    Reference(u16),
    /// Activate the named switch.
    Switch(u16),
}

impl LhsOp {
    /// `true` for ops that occupy a matching position and thus produce a
    /// capture; `false` only for `Switch`.
    pub fn is_capturing(&self) -> bool {
        !matches!(self, LhsOp::Switch(_))
    }
}
