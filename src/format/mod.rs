//! Binary Layout Loader — the KM2 decoder.
//!
//! Parses a `.km2` byte stream into an in-memory [`Layout`](crate::layout::Layout):
//! header, options, info entries, string table, and rule list. Validation
//! happens inline while building the LHS/RHS intermediate representation
//! (`LhsOp`/`RhsOp`) rather than as a separate pre-pass, since building that
//! IR already walks every opcode word once — the same shortcut the upstream
//! `KM2Validator` takes when it validates LHS/RHS streams generically instead
//! of opcode-stream-specific passes (`km2/validator.cpp`).

pub mod opcode;

use crate::error::{DecodeError, DecodeErrorKind};
use crate::layout::{InfoEntry, InfoTag, Layout, Options, Rule, Version};
use opcode::{LhsOp, RhsOp};

const MAGIC: &[u8; 4] = b"KMKL";

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn err(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::new(kind, self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.pos + n > self.bytes.len() {
            return Err(self.err(DecodeErrorKind::UnexpectedEof));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u16_words(&mut self, count: usize) -> Result<Vec<u16>, DecodeError> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.u16()?);
        }
        Ok(out)
    }
}

/// Decodes a `.km2` byte buffer into an immutable [`Layout`].
///
/// Rejects: magic mismatch, major version > 1, opcode sequences
/// that run off the end of their declared length, STRING literals whose
/// declared length overruns the sequence, out-of-range VARIABLE/REFERENCE
/// indices, unknown opcodes, and a MODIFIER not immediately preceded by a
/// PREDEFINED in LHS. Any violation returns a [`DecodeError`] without
/// partial state — the caller's prior layout, if any, is untouched.
pub fn decode(bytes: &[u8]) -> Result<Layout, DecodeError> {
    let mut r = ByteReader::new(bytes);

    let magic = r.take(4)?;
    if magic != MAGIC {
        return Err(r.err(DecodeErrorKind::BadMagic));
    }

    let major = r.u8()?;
    let minor = r.u8()?;
    let version = Version { major, minor };
    if !version.is_known_format() {
        return Err(r.err(DecodeErrorKind::UnsupportedMajorVersion));
    }

    let string_cnt = r.u16()? as usize;
    let info_cnt = if version.has_info_section() {
        r.u16()? as usize
    } else {
        0
    };
    let rule_cnt = r.u16()? as usize;

    let track_caps = r.u8()? != 0;
    let auto_bksp = r.u8()? != 0;
    let eat = r.u8()? != 0;
    let pos_based = r.u8()? != 0;
    let right_alt = if version.has_right_alt_option() {
        r.u8()? != 0
    } else {
        true
    };
    let options = Options {
        track_caps,
        auto_bksp,
        eat,
        pos_based,
        right_alt,
    };

    let mut info = Vec::with_capacity(info_cnt);
    if version.has_info_section() {
        for _ in 0..info_cnt {
            let raw_tag = r.u32()?;
            let len = r.u32()? as usize;
            let data = r.take(len)?.to_vec();
            info.push(InfoEntry {
                tag: InfoTag::from_raw(raw_tag),
                data,
            });
        }
    }

    let mut strings = Vec::with_capacity(string_cnt);
    for _ in 0..string_cnt {
        let len = r.u16()? as usize;
        let units = r.u16_words(len)?;
        strings.push(normalize_null_string(units));
    }

    let mut rules = Vec::with_capacity(rule_cnt);
    for _ in 0..rule_cnt {
        let lhs_len = r.u16()? as usize;
        let lhs_base = r.pos;
        let lhs_words = r.u16_words(lhs_len)?;
        let lhs = parse_lhs(&lhs_words, string_cnt, lhs_base)?;

        let rhs_len = r.u16()? as usize;
        let rhs_base = r.pos;
        let rhs_words = r.u16_words(rhs_len)?;
        let capture_count = lhs.iter().filter(|op| op.is_capturing()).count();
        let rhs = parse_rhs(&rhs_words, string_cnt, capture_count, rhs_base)?;

        rules.push(Rule { lhs, rhs });
    }

    Ok(Layout {
        version,
        options,
        info,
        strings,
        rules,
    })
}

/// The special NULL word (`0x0000`) is KM2's way of writing "the empty
/// string" into a string-table slot or inline literal. A table
/// entry that is exactly one NULL word collapses to empty; any other
/// content containing embedded NULLs is left as-is (not otherwise special).
fn normalize_null_string(units: Vec<u16>) -> Vec<u16> {
    if units.as_slice() == [0u16] {
        Vec::new()
    } else {
        units
    }
}

/// A cursor over one rule's raw opcode word stream.
struct WordCursor<'a> {
    words: &'a [u16],
    pos: usize,
    byte_base: usize,
}

impl<'a> WordCursor<'a> {
    fn new(words: &'a [u16], byte_base: usize) -> Self {
        Self {
            words,
            pos: 0,
            byte_base,
        }
    }

    fn err(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::new(kind, self.byte_base + self.pos * 2)
    }

    fn peek(&self) -> Option<u16> {
        self.words.get(self.pos).copied()
    }

    fn next(&mut self) -> Result<u16, DecodeError> {
        let w = self
            .words
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.err(DecodeErrorKind::TruncatedOpcode))?;
        self.pos += 1;
        Ok(w)
    }

    fn next_string_lit(&mut self) -> Result<Vec<u16>, DecodeError> {
        let len = self.next()? as usize;
        if self.pos + len > self.words.len() {
            return Err(self.err(DecodeErrorKind::StringOverrun));
        }
        let lit = self.words[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Ok(normalize_null_string(lit))
    }
}

fn check_string_index(idx: u16, string_cnt: usize, cur: &WordCursor) -> Result<(), DecodeError> {
    if idx == 0 || idx as usize > string_cnt {
        return Err(cur.err(DecodeErrorKind::StringIndexOutOfRange));
    }
    Ok(())
}

fn parse_lhs(words: &[u16], string_cnt: usize, byte_base: usize) -> Result<Vec<LhsOp>, DecodeError> {
    use opcode::*;

    let mut cur = WordCursor::new(words, byte_base);
    let mut ops = Vec::new();

    while cur.peek().is_some() {
        let op = cur.next()?;
        match op {
            OP_AND => { /* syntactic separator; sub-patterns are already sequential */ }
            OP_STRING => {
                let lit = cur.next_string_lit()?;
                ops.push(LhsOp::StringLit(lit));
            }
            OP_VARIABLE => {
                let idx = cur.next()?;
                check_string_index(idx, string_cnt, &cur)?;
                ops.push(LhsOp::Variable(idx));
            }
            OP_ANYOF | OP_NANYOF => {
                let negated = op == OP_NANYOF;
                let inner = cur.next()?;
                if inner != OP_VARIABLE {
                    return Err(cur.err(DecodeErrorKind::IllegalOpcode));
                }
                let idx = cur.next()?;
                check_string_index(idx, string_cnt, &cur)?;
                ops.push(if negated {
                    LhsOp::NAnyOf(idx)
                } else {
                    LhsOp::AnyOf(idx)
                });
            }
            OP_ANY => ops.push(LhsOp::Any),
            OP_PREDEFINED => {
                let vk = cur.next()?;
                let modifiers = if cur.peek() == Some(OP_MODIFIER) {
                    cur.next()?;
                    Some(cur.next()?)
                } else {
                    None
                };
                ops.push(LhsOp::Predefined { vk, modifiers });
            }
            OP_MODIFIER => {
                // A MODIFIER is only legal directly after PREDEFINED, which
                // already consumes it above. Seeing one here means it
                // wasn't preceded by PREDEFINED.
                return Err(cur.err(DecodeErrorKind::DanglingModifier));
            }
            OP_SWITCH => {
                let idx = cur.next()?;
                ops.push(LhsOp::Switch(idx));
            }
            OP_REFERENCE => {
                // REFERENCE only has meaning on the RHS.
                return Err(cur.err(DecodeErrorKind::IllegalOpcode));
            }
            unknown => return Err(cur.err(DecodeErrorKind::UnknownOpcode(unknown))),
        }
    }

    Ok(ops)
}

fn parse_rhs(
    words: &[u16],
    string_cnt: usize,
    capture_count: usize,
    byte_base: usize,
) -> Result<Vec<RhsOp>, DecodeError> {
    use opcode::*;

    let mut cur = WordCursor::new(words, byte_base);
    let mut ops = Vec::new();

    while cur.peek().is_some() {
        let op = cur.next()?;
        match op {
            OP_STRING => {
                let lit = cur.next_string_lit()?;
                ops.push(RhsOp::StringLit(lit));
            }
            OP_VARIABLE => {
                let idx = cur.next()?;
                check_string_index(idx, string_cnt, &cur)?;
                ops.push(RhsOp::Variable(idx));
            }
            OP_REFERENCE => {
                let idx = cur.next()?;
                if idx == 0 || idx as usize > capture_count {
                    return Err(cur.err(DecodeErrorKind::ReferenceIndexOutOfRange));
                }
                ops.push(RhsOp::Reference(idx));
            }
            OP_SWITCH => {
                let idx = cur.next()?;
                ops.push(RhsOp::Switch(idx));
            }
            unknown => {
                // Canonical LHS-only opcodes are "illegal here"; anything
                // else is a genuinely unrecognized opcode.
                let kind = match unknown {
                    OP_PREDEFINED | OP_MODIFIER | OP_ANYOF | OP_NANYOF | OP_AND | OP_ANY => {
                        DecodeErrorKind::IllegalOpcode
                    }
                    _ => DecodeErrorKind::UnknownOpcode(unknown),
                };
                return Err(cur.err(kind));
            }
        }
    }

    Ok(ops)
}
