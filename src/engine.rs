//! The engine facade.
//!
//! Owns an optional decoded [`Layout`], the mutable [`EngineState`], and
//! the tunables in [`EngineLimits`]. This is the only place the matcher,
//! the executor, and the composing buffer are driven together.

use crate::action::EditAction;
use crate::config::EngineLimits;
use crate::error::DecodeError;
use crate::format;
use crate::key::KeyEvent;
use crate::layout::Layout;
use crate::matcher;
use crate::state::EngineState;
use crate::vk::VirtualKey;

/// The input-method core. Not thread-safe — callers serialize access.
#[derive(Debug, Default)]
pub struct Engine {
    layout: Option<Layout>,
    state: EngineState,
    limits: EngineLimits,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: EngineLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Decodes and installs a new layout, resetting composing state and
    /// switches. On failure the previously loaded layout (if any) is left
    /// untouched.
    pub fn load_layout(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        let layout = format::decode(bytes)?;
        self.layout = Some(layout);
        self.state.reset();
        Ok(())
    }

    /// Clears composing state and the active switch set without touching
    /// the loaded layout.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Current composing buffer, rendered as UTF-8.
    pub fn get_composition(&self) -> String {
        self.state.composing.to_string_lossy()
    }

    /// Replaces the composing buffer with host-authoritative text (e.g.
    /// after a cursor move). Switches are left untouched.
    pub fn set_composition(&mut self, text: &str) {
        let units: Vec<u16> = text.encode_utf16().collect();
        self.state.composing.replace_all(units, self.limits.composing_cap);
    }

    /// Runs one keystroke through the match/execute/re-match loop and
    /// returns the edit the host should apply.
    pub fn process_key(&mut self, event: KeyEvent) -> EditAction {
        let Some(layout) = self.layout.as_ref() else {
            return EditAction::passthrough(self.state.composing.to_string_lossy());
        };

        let before = self.state.composing.as_slice().to_vec();

        let mut current_key = Some(event);
        let mut any_matched = false;
        let mut rematches = 0u32;

        loop {
            let outcome = matcher::find_match(
                &layout.rules,
                self.state.composing.as_slice(),
                current_key.as_ref(),
                &self.state.switches,
                &layout.options,
                &layout.strings,
            );

            let Some(m) = outcome else {
                break;
            };

            any_matched = true;
            self.state.composing.truncate(m.retained_prefix_len);

            let rule = &layout.rules[m.rule_index];
            let output = crate::executor::execute(&rule.rhs, &m.captures, &layout.strings);
            for op in &output.switch_ops {
                self.state.switches.activate(op.0);
            }
            let switch_only = output.is_switch_only();
            self.state.composing.append_capped(&output.appended, self.limits.composing_cap);

            if (layout.options.eat || switch_only) && rematches < self.limits.rematch_budget {
                rematches += 1;
                current_key = None;
                continue;
            }
            if rematches >= self.limits.rematch_budget && (layout.options.eat || switch_only) {
                log::warn!("re-match budget of {} exhausted; stopping", self.limits.rematch_budget);
            }
            break;
        }

        if !any_matched {
            return self.fallback(event, &before);
        }

        let after = self.state.composing.as_slice().to_vec();
        EditAction::from_diff(&before, &after, true)
    }

    /// No rule fired on the real keystroke. Default-insert the produced
    /// character, or auto-backspace, or pass the key through untouched.
    fn fallback(&mut self, event: KeyEvent, before: &[u16]) -> EditAction {
        let layout = self.layout.as_ref().expect("fallback only called with a layout loaded");

        if let Some(c) = event.character {
            if event.only_shift_or_caps_held() {
                let units = char_units(c);
                self.state.composing.append_capped(&units, self.limits.composing_cap);
                let after = self.state.composing.as_slice().to_vec();
                return EditAction::from_diff(before, &after, true);
            }
        }

        if layout.options.auto_bksp && event.virtual_key == VirtualKey::Back as u16 {
            self.state.composing.pop_one_code_point();
            let after = self.state.composing.as_slice().to_vec();
            return EditAction::from_diff(before, &after, true);
        }

        EditAction::passthrough(self.state.composing.to_string_lossy())
    }
}

fn char_units(c: char) -> Vec<u16> {
    let mut buf = [0u16; 2];
    c.encode_utf16(&mut buf).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::opcode::{LhsOp, RhsOp};
    use crate::layout::{Options, Rule};

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    fn layout_with(strings: Vec<Vec<u16>>, rules: Vec<Rule>, options: Options) -> Layout {
        Layout {
            version: crate::layout::Version { major: 1, minor: 5 },
            options,
            info: vec![],
            strings,
            rules,
        }
    }

    fn engine_with(layout: Layout) -> Engine {
        let mut engine = Engine::new();
        engine.layout = Some(layout);
        engine
    }

    fn key(vk: VirtualKey, c: Option<char>) -> KeyEvent {
        KeyEvent::new(vk as u16, c, false, false, false, false)
    }

    #[test]
    fn no_rule_matches_falls_back_to_default_insertion() {
        let mut engine = engine_with(layout_with(vec![], vec![], Options::default()));
        let action = engine.process_key(key(VirtualKey::KeyA, Some('a')));
        assert_eq!(action.kind, crate::action::ActionKind::Insert);
        assert_eq!(action.text, "a");
        assert_eq!(engine.get_composition(), "a");
    }

    #[test]
    fn rule_substitution_produces_delete_then_insert() {
        let rule = Rule {
            lhs: vec![
                LhsOp::StringLit(utf16("ka")),
                LhsOp::Predefined { vk: VirtualKey::Space as u16, modifiers: None },
            ],
            rhs: vec![RhsOp::StringLit(utf16("Y"))],
        };
        let mut engine = engine_with(layout_with(vec![], vec![rule], Options::default()));
        engine.set_composition("aka");

        let action = engine.process_key(key(VirtualKey::Space, None));
        assert_eq!(action.kind, crate::action::ActionKind::DeleteThenInsert);
        assert_eq!(action.delete_count, 2);
        assert_eq!(action.text, "Y");
        assert_eq!(engine.get_composition(), "aY");
    }

    #[test]
    fn auto_bksp_deletes_one_code_point() {
        let mut options = Options::default();
        options.auto_bksp = true;
        let mut engine = engine_with(layout_with(vec![], vec![], options));
        engine.set_composition("abc");

        let action = engine.process_key(key(VirtualKey::Back, None));
        assert_eq!(action.kind, crate::action::ActionKind::Delete);
        assert_eq!(action.delete_count, 1);
        assert_eq!(engine.get_composition(), "ab");
    }

    #[test]
    fn unmatched_non_character_key_is_passthrough() {
        let mut engine = engine_with(layout_with(vec![], vec![], Options::default()));
        let action = engine.process_key(key(VirtualKey::Left, None));
        assert_eq!(action.kind, crate::action::ActionKind::None);
        assert!(!action.consumed);
    }

    #[test]
    fn switch_gated_rule_only_fires_while_active() {
        let rule_a = Rule {
            lhs: vec![LhsOp::Switch(1), LhsOp::Predefined { vk: VirtualKey::KeyA as u16, modifiers: None }],
            rhs: vec![RhsOp::StringLit(utf16("\u{03B1}"))],
        };
        let rule_b = Rule {
            lhs: vec![LhsOp::Predefined { vk: VirtualKey::KeyA as u16, modifiers: None }],
            rhs: vec![RhsOp::StringLit(utf16("a"))],
        };
        let mut engine = engine_with(layout_with(vec![], vec![rule_a, rule_b], Options::default()));

        let action = engine.process_key(key(VirtualKey::KeyA, Some('a')));
        assert_eq!(action.text, "a");

        engine.state.switches.activate(1);
        let action = engine.process_key(key(VirtualKey::KeyA, Some('a')));
        assert_eq!(action.text, "\u{03B1}");

        engine.reset();
        let action = engine.process_key(key(VirtualKey::KeyA, Some('a')));
        assert_eq!(action.text, "a");
    }

    #[test]
    fn switch_only_rhs_triggers_rematch_pass() {
        let rule_1 = Rule {
            lhs: vec![LhsOp::Predefined { vk: VirtualKey::KeyA as u16, modifiers: None }],
            rhs: vec![RhsOp::Switch(2)],
        };
        let rule_2 = Rule {
            lhs: vec![LhsOp::Switch(2)],
            rhs: vec![RhsOp::StringLit(utf16("X"))],
        };
        let mut engine = engine_with(layout_with(vec![], vec![rule_1, rule_2], Options::default()));

        let action = engine.process_key(key(VirtualKey::KeyA, Some('a')));
        assert_eq!(action.kind, crate::action::ActionKind::Insert);
        assert_eq!(action.text, "X");
        assert_eq!(engine.get_composition(), "X");
    }
}
