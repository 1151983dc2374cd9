//! RHS Executor.
//!
//! Consumes a rule's RHS opcodes with access to its LHS captures and
//! produces the text to append to the composing buffer plus any switch
//! operations to apply.

use crate::format::opcode::RhsOp;
use crate::matcher::Capture;

/// A switch mutation requested by an RHS `SWITCH` opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchOp(pub u16);

/// The result of executing one rule's RHS.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RhsOutput {
    pub appended: Vec<u16>,
    pub switch_ops: Vec<SwitchOp>,
}

impl RhsOutput {
    /// Whether this RHS produced no text at all, including when it
    /// resolved to an explicit NULL-word empty literal. Used by the
    /// engine facade to decide whether a switch-only RHS should trigger
    /// the bounded re-match pass.
    pub fn is_switch_only(&self) -> bool {
        self.appended.is_empty()
    }
}

/// Executes `rhs` against `captures`, resolving `REFERENCE`s and the
/// ANYOF "paired transliteration" convention: a `REFERENCE n` whose
/// capture is a class index reuses that index against the nearest
/// `VARIABLE` opcode adjacent to it in the same RHS stream, if there is
/// one; otherwise it re-emits the code point that was actually matched.
pub fn execute(rhs: &[RhsOp], captures: &[Capture], strings: &[Vec<u16>]) -> RhsOutput {
    let mut appended = Vec::new();
    let mut switch_ops = Vec::new();

    for (i, op) in rhs.iter().enumerate() {
        match op {
            RhsOp::StringLit(lit) => appended.extend_from_slice(lit),
            RhsOp::Variable(idx) => {
                if let Some(s) = string_at(strings, *idx) {
                    appended.extend_from_slice(s);
                }
            }
            RhsOp::Reference(n) => {
                if let Some(capture) = captures.get(*n as usize - 1) {
                    append_capture(&mut appended, capture, rhs, i, strings);
                }
            }
            RhsOp::Switch(idx) => switch_ops.push(SwitchOp(*idx)),
        }
    }

    RhsOutput { appended, switch_ops }
}

fn append_capture(out: &mut Vec<u16>, capture: &Capture, rhs: &[RhsOp], ref_pos: usize, strings: &[Vec<u16>]) {
    match capture {
        Capture::Literal(units) => out.extend_from_slice(units),
        Capture::CodePoint(cp) => {
            if let Some(c) = char::from_u32(*cp) {
                out.extend(c.encode_utf16(&mut [0u16; 2]).iter());
            }
        }
        Capture::ClassIndex { var, index, code_point } => {
            let paired = adjacent_variable(rhs, ref_pos).and_then(|idx| string_at(strings, idx));
            match paired {
                Some(paired_str) => {
                    if let Some(cp) = decode_code_points(paired_str).get(*index).copied() {
                        if let Some(c) = char::from_u32(cp) {
                            out.extend(c.encode_utf16(&mut [0u16; 2]).iter());
                        }
                    }
                }
                None => {
                    let _ = var;
                    if let Some(c) = char::from_u32(*code_point) {
                        out.extend(c.encode_utf16(&mut [0u16; 2]).iter());
                    }
                }
            }
        }
    }
}

/// Looks immediately before and after `ref_pos` in the RHS stream for a
/// `VARIABLE` opcode — the "paired class" convention used by
/// transliteration rules.
fn adjacent_variable(rhs: &[RhsOp], ref_pos: usize) -> Option<u16> {
    if let Some(RhsOp::Variable(idx)) = rhs.get(ref_pos + 1) {
        return Some(*idx);
    }
    if ref_pos > 0 {
        if let Some(RhsOp::Variable(idx)) = rhs.get(ref_pos - 1) {
            return Some(*idx);
        }
    }
    None
}

fn string_at<'a>(strings: &'a [Vec<u16>], idx: u16) -> Option<&'a [u16]> {
    if idx == 0 {
        return None;
    }
    strings.get(idx as usize - 1).map(|v| v.as_slice())
}

fn decode_code_points(units: &[u16]) -> Vec<u32> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < units.len() {
        let u = units[i];
        if (0xD800..=0xDBFF).contains(&u) && i + 1 < units.len() && (0xDC00..=0xDFFF).contains(&units[i + 1]) {
            let c = 0x10000 + ((u as u32 - 0xD800) << 10) + (units[i + 1] as u32 - 0xDC00);
            out.push(c);
            i += 2;
        } else {
            out.push(u as u32);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_and_variable_concatenate() {
        let strings = vec!["world".encode_utf16().collect::<Vec<u16>>()];
        let rhs = vec![RhsOp::StringLit("hello ".encode_utf16().collect()), RhsOp::Variable(1)];
        let out = execute(&rhs, &[], &strings);
        assert_eq!(String::from_utf16(&out.appended).unwrap(), "hello world");
    }

    #[test]
    fn reference_emits_literal_capture() {
        let rhs = vec![RhsOp::Reference(1)];
        let captures = vec![Capture::Literal("ka".encode_utf16().collect())];
        let out = execute(&rhs, &captures, &[]);
        assert_eq!(String::from_utf16(&out.appended).unwrap(), "ka");
    }

    #[test]
    fn reference_without_paired_variable_reemits_matched_code_point() {
        let rhs = vec![RhsOp::Reference(1)];
        let captures = vec![Capture::ClassIndex { var: 1, index: 1, code_point: 'e' as u32 }];
        let out = execute(&rhs, &captures, &[]);
        assert_eq!(String::from_utf16(&out.appended).unwrap(), "e");
    }

    #[test]
    fn reference_with_paired_variable_transliterates() {
        // $u1 = "aeiou", $u2 = myanmar vowel stand-ins; capture index 1 ('e')
        // should resolve against $u2's 2nd code point via the adjacent
        // VARIABLE opcode.
        let strings = vec!["k\u{1000}\u{1001}\u{1002}\u{1003}\u{1004}".encode_utf16().collect::<Vec<u16>>()];
        let rhs = vec![RhsOp::Variable(1), RhsOp::Reference(1)];
        let captures = vec![Capture::ClassIndex { var: 99, index: 2, code_point: 'e' as u32 }];
        let out = execute(&rhs, &captures, &strings);
        let text = String::from_utf16(&out.appended).unwrap();
        assert!(text.ends_with('\u{1001}'));
    }

    #[test]
    fn switch_opcode_produces_no_text() {
        let rhs = vec![RhsOp::Switch(3)];
        let out = execute(&rhs, &[], &[]);
        assert!(out.appended.is_empty());
        assert_eq!(out.switch_ops, vec![SwitchOp(3)]);
        assert!(out.is_switch_only());
    }
}
