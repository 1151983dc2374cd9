//! Rule Matcher.
//!
//! Given the current key, composing buffer, and active switches, finds the
//! single rule that applies. Rules are tried in declaration order; the
//! first match wins. Within a rule, sub-patterns are fixed-width once the
//! variable-width class matchers (`ANYOF`/`NANYOF`/`ANY`) are resolved
//! against actual buffer content, so matching is a single deterministic
//! right-to-left walk with no backtracking.

use crate::key::KeyEvent;
use crate::layout::{Options, Rule};
use crate::format::opcode::{LhsOp, MOD_ANY, MOD_CAPS, MOD_CTRL, MOD_SHIFT};
use crate::state::SwitchSet;

/// A single LHS capture, numbered 1..N in LHS order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// A literal matched string (STRING/VARIABLE sub-patterns, or the
    /// character produced by a trailing PREDEFINED/STRING/VARIABLE key
    /// token).
    Literal(Vec<u16>),
    /// An ANYOF match: which variable it came from and the matched
    /// code point's index within that variable's class string.
    ClassIndex { var: u16, index: usize, code_point: u32 },
    /// An ANY/NANYOF match: just the matched code point.
    CodePoint(u32),
}

/// The result of a successful rule match.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub rule_index: usize,
    /// How many leading code units of the composing buffer to retain.
    pub retained_prefix_len: usize,
    pub captures: Vec<Capture>,
}

/// Scans `rules` in order and returns the first one that matches. `key`
/// is `None` for the synthetic no-key event used by the engine's bounded
/// re-match pass — only switch-only rules (whose LHS has no non-switch
/// sub-pattern) can match with no key.
pub fn find_match(
    rules: &[Rule],
    composing: &[u16],
    key: Option<&KeyEvent>,
    switches: &SwitchSet,
    options: &Options,
    strings: &[Vec<u16>],
) -> Option<MatchOutcome> {
    for (rule_index, rule) in rules.iter().enumerate() {
        if let Some(outcome) = try_match_rule(rule, composing, key, switches, options, strings) {
            return Some(MatchOutcome {
                rule_index,
                retained_prefix_len: outcome.0,
                captures: outcome.1,
            });
        }
    }
    None
}

fn try_match_rule(
    rule: &Rule,
    composing: &[u16],
    key: Option<&KeyEvent>,
    switches: &SwitchSet,
    options: &Options,
    strings: &[Vec<u16>],
) -> Option<(usize, Vec<Capture>)> {
    // SWITCH sub-patterns gate eligibility and consume no matching
    // position; check them regardless of their place in the LHS.
    for op in &rule.lhs {
        if let LhsOp::Switch(id) = op {
            if !switches.is_active(*id) {
                return None;
            }
        }
    }

    let content: Vec<&LhsOp> = rule.lhs.iter().filter(|op| !matches!(op, LhsOp::Switch(_))).collect();

    if content.is_empty() {
        // Boundary case: a SWITCH-only LHS matches on mere presence of the
        // switch, consumes nothing from the buffer, and needs no key —
        // this is exactly what lets it fire during the no-key rematch pass.
        return Some((composing.len(), Vec::new()));
    }

    // Every other rule requires a real key token at the tail: the
    // no-key synthetic pass can only ever satisfy switch-only rules.
    let key = key?;

    let (buffer_ops, key_op) = content.split_at(content.len() - 1);
    let key_op = key_op[0];

    let key_capture = match_key_token(key_op, key, options, strings)?;

    let mut pos = composing.len();
    let mut captures_rev = Vec::with_capacity(buffer_ops.len());
    for op in buffer_ops.iter().rev() {
        let (capture, width) = match_buffer_op(op, &composing[..pos], strings)?;
        captures_rev.push(capture);
        pos -= width;
    }
    captures_rev.reverse();
    captures_rev.push(key_capture);

    Some((pos, captures_rev))
}

/// Matches a non-trailing LHS sub-pattern against the tail of `composing`
/// (which has already been trimmed to the still-unconsumed prefix).
/// Returns the capture and how many code units it consumed.
fn match_buffer_op(op: &LhsOp, composing: &[u16], strings: &[Vec<u16>]) -> Option<(Capture, usize)> {
    match op {
        LhsOp::StringLit(lit) => {
            let w = lit.len();
            if w > composing.len() || &composing[composing.len() - w..] != lit.as_slice() {
                return None;
            }
            Some((Capture::Literal(lit.clone()), w))
        }
        LhsOp::Variable(idx) => {
            let s = string_at(strings, *idx)?;
            let w = s.len();
            if w > composing.len() || &composing[composing.len() - w..] != s {
                return None;
            }
            Some((Capture::Literal(s.to_vec()), w))
        }
        LhsOp::AnyOf(idx) => {
            let (cp, width) = decode_last_code_point(composing)?;
            let class = string_at(strings, *idx)?;
            let index = class_index_of(class, cp)?;
            Some((
                Capture::ClassIndex {
                    var: *idx,
                    index,
                    code_point: cp,
                },
                width,
            ))
        }
        LhsOp::NAnyOf(idx) => {
            let (cp, width) = decode_last_code_point(composing)?;
            let class = string_at(strings, *idx)?;
            if class_index_of(class, cp).is_some() {
                return None;
            }
            Some((Capture::CodePoint(cp), width))
        }
        LhsOp::Any => {
            let (cp, width) = decode_last_code_point(composing)?;
            Some((Capture::CodePoint(cp), width))
        }
        // PREDEFINED/SWITCH never appear here: SWITCH was filtered out
        // above, and a PREDEFINED anywhere but the trailing position is a
        // malformed rule this matcher simply never satisfies.
        LhsOp::Predefined { .. } => None,
        LhsOp::Switch(_) => None,
    }
}

/// Matches the trailing LHS sub-pattern — the one and only position that
/// may test the incoming key event rather than existing buffer content.
/// `PREDEFINED` tests the virtual-key identity directly; every other op
/// tests the key's produced `character`, gated by `right_alt`.
fn match_key_token(op: &LhsOp, key: &KeyEvent, options: &Options, strings: &[Vec<u16>]) -> Option<Capture> {
    match op {
        LhsOp::Predefined { vk, modifiers } => {
            if key.virtual_key != *vk {
                return None;
            }
            if let Some(bits) = modifiers {
                if bits & MOD_ANY == 0 && !modifiers_match(*bits, key, options) {
                    return None;
                }
            }
            let text = key.character.map(char_units).unwrap_or_default();
            Some(Capture::Literal(text))
        }
        LhsOp::StringLit(lit) => {
            if character_blocked(key, options) {
                return None;
            }
            let c = key.character?;
            if char_units(c) != *lit {
                return None;
            }
            Some(Capture::Literal(lit.clone()))
        }
        LhsOp::Variable(idx) => {
            if character_blocked(key, options) {
                return None;
            }
            let c = key.character?;
            let s = string_at(strings, *idx)?;
            if char_units(c) != s {
                return None;
            }
            Some(Capture::Literal(s.to_vec()))
        }
        LhsOp::AnyOf(idx) => {
            if character_blocked(key, options) {
                return None;
            }
            let c = key.character?;
            let class = string_at(strings, *idx)?;
            let index = class_index_of(class, c as u32)?;
            Some(Capture::ClassIndex {
                var: *idx,
                index,
                code_point: c as u32,
            })
        }
        LhsOp::NAnyOf(idx) => {
            if character_blocked(key, options) {
                return None;
            }
            let c = key.character?;
            let class = string_at(strings, *idx)?;
            if class_index_of(class, c as u32).is_some() {
                return None;
            }
            Some(Capture::CodePoint(c as u32))
        }
        LhsOp::Any => {
            if character_blocked(key, options) {
                return None;
            }
            let c = key.character?;
            Some(Capture::CodePoint(c as u32))
        }
        LhsOp::Switch(_) => None,
    }
}

fn string_at<'a>(strings: &'a [Vec<u16>], idx: u16) -> Option<&'a [u16]> {
    if idx == 0 {
        return None;
    }
    strings.get(idx as usize - 1).map(|v| v.as_slice())
}

fn class_index_of(class: &[u16], cp: u32) -> Option<usize> {
    decode_code_points(class).into_iter().position(|c| c == cp)
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

/// Decodes the code point ending at the tail of `units`, respecting
/// surrogate pairs. An unpaired trailing low surrogate is treated as its
/// own code point.
fn decode_last_code_point(units: &[u16]) -> Option<(u32, usize)> {
    let len = units.len();
    if len == 0 {
        return None;
    }
    let last = units[len - 1];
    if (0xDC00..=0xDFFF).contains(&last) && len >= 2 {
        let prev = units[len - 2];
        if (0xD800..=0xDBFF).contains(&prev) {
            let cp = 0x10000 + ((prev as u32 - 0xD800) << 10) + (last as u32 - 0xDC00);
            return Some((cp, 2));
        }
    }
    Some((last as u32, 1))
}

fn char_units(c: char) -> Vec<u16> {
    let mut buf = [0u16; 2];
    c.encode_utf16(&mut buf).to_vec()
}

/// Ctrl+Alt held blocks character-producing rule matching unless
/// `right_alt` is set, in which case it is treated as AltGr and does not
/// block.
fn character_blocked(key: &KeyEvent, options: &Options) -> bool {
    if key.ctrl && key.alt {
        !options.right_alt
    } else {
        key.ctrl || key.alt
    }
}

/// With `track_caps` set, the shift state used for modifier comparisons
/// is the effective shift (shift XOR caps); the caps bit itself remains
/// available, literally, for rules that test it directly.
fn modifiers_match(bits: u16, key: &KeyEvent, options: &Options) -> bool {
    let effective_shift = if options.track_caps {
        key.shift ^ key.caps
    } else {
        key.shift
    };
    let actual = (effective_shift as u16 * MOD_SHIFT)
        | (key.ctrl as u16 * MOD_CTRL)
        | (key.alt as u16 * crate::format::opcode::MOD_ALT)
        | (key.caps as u16 * MOD_CAPS);
    let mask = MOD_SHIFT | MOD_CTRL | crate::format::opcode::MOD_ALT | MOD_CAPS;
    (bits & mask) == (actual & mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Options;

    fn opts() -> Options {
        Options::default()
    }

    #[test]
    fn matches_trailing_predefined_against_buffer_prefix() {
        let rule = Rule {
            lhs: vec![
                LhsOp::StringLit(vec!['k' as u16, 'a' as u16]),
                LhsOp::Predefined { vk: 0x20, modifiers: None },
            ],
            rhs: vec![],
        };
        let composing: Vec<u16> = "aka".encode_utf16().collect();
        let key = KeyEvent::new(0x20, None, false, false, false, false);
        let switches = SwitchSet::new();
        let outcome = try_match_rule(&rule, &composing, Some(&key), &switches, &opts(), &[]).unwrap();
        assert_eq!(outcome.0, 1); // retains "a"
    }

    #[test]
    fn switch_only_rule_matches_with_no_key() {
        let rule = Rule {
            lhs: vec![LhsOp::Switch(1)],
            rhs: vec![],
        };
        let mut switches = SwitchSet::new();
        switches.activate(1);
        let outcome = try_match_rule(&rule, &[], None, &switches, &opts(), &[]);
        assert!(outcome.is_some());
    }

    #[test]
    fn switch_gated_rule_requires_active_switch() {
        let rule = Rule {
            lhs: vec![LhsOp::Switch(1), LhsOp::Predefined { vk: 0x41, modifiers: None }],
            rhs: vec![],
        };
        let switches = SwitchSet::new();
        let key = KeyEvent::new(0x41, Some('a'), false, false, false, false);
        assert!(try_match_rule(&rule, &[], Some(&key), &switches, &opts(), &[]).is_none());
    }

    #[test]
    fn anyof_matches_key_character_and_captures_index() {
        let strings = vec!["aeiou".encode_utf16().collect::<Vec<u16>>()];
        let rule = Rule {
            lhs: vec![LhsOp::AnyOf(1)],
            rhs: vec![],
        };
        let key = KeyEvent::new(0, Some('e'), false, false, false, false);
        let switches = SwitchSet::new();
        let outcome = try_match_rule(&rule, &[], Some(&key), &switches, &opts(), &strings).unwrap();
        assert_eq!(
            outcome.1,
            vec![Capture::ClassIndex { var: 1, index: 1, code_point: 'e' as u32 }]
        );
    }

    #[test]
    fn right_alt_option_gates_ctrl_alt_character_matching() {
        let rule = Rule {
            lhs: vec![LhsOp::StringLit(vec!['a' as u16])],
            rhs: vec![],
        };
        let key = KeyEvent::new(0, Some('a'), false, true, true, false);
        let switches = SwitchSet::new();

        let mut allowed = Options::default();
        allowed.right_alt = true;
        assert!(try_match_rule(&rule, &[], Some(&key), &switches, &allowed, &[]).is_some());

        let mut blocked = Options::default();
        blocked.right_alt = false;
        assert!(try_match_rule(&rule, &[], Some(&key), &switches, &blocked, &[]).is_none());
    }
}
