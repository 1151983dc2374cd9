//! Composing Buffer & Engine State.
//!
//! Holds the UTF-16 composing buffer and the active switch set. Mutated
//! only by the engine facade's `process_key`/`reset`/`set_composition`.

use std::collections::HashSet;

/// Hard cap on the composing buffer. Runaway rule sets that
/// never stop appending are bounded here rather than left to grow
/// unbounded.
pub const COMPOSING_CAP: usize = 1024;

/// The engine-owned text adjacent to the caret, as UTF-16 code units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposingBuffer {
    units: Vec<u16>,
}

impl ComposingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn clear(&mut self) {
        self.units.clear();
    }

    /// Drops everything after `new_len` code units (used to retain a
    /// matched rule's prefix before appending the RHS output).
    pub fn truncate(&mut self, new_len: usize) {
        self.units.truncate(new_len);
    }

    /// Appends code units, enforcing [`COMPOSING_CAP`] by truncating from
    /// the head (keep tail) and logging. Returns `true` if truncation
    /// happened.
    pub fn append_capped(&mut self, more: &[u16], cap: usize) -> bool {
        self.units.extend_from_slice(more);
        if self.units.len() > cap {
            let drop = self.units.len() - cap;
            self.units.drain(0..drop);
            log::warn!(
                "composing buffer exceeded cap of {cap} code units; truncated {drop} from the head"
            );
            true
        } else {
            false
        }
    }

    /// Replaces the whole buffer (used by `set_composition`), applying the
    /// same cap as `append_capped`.
    pub fn replace_all(&mut self, units: Vec<u16>, cap: usize) {
        self.units = units;
        if self.units.len() > cap {
            let drop = self.units.len() - cap;
            self.units.drain(0..drop);
            log::warn!(
                "set_composition exceeded cap of {cap} code units; truncated {drop} from the head"
            );
        }
    }

    /// Up to `max_len` trailing code units, for match-window construction.
    pub fn tail(&self, max_len: usize) -> &[u16] {
        let start = self.units.len().saturating_sub(max_len);
        &self.units[start..]
    }

    /// Up to `max_len` trailing code units as the match context,
    /// identical to `tail` but named for the public contract.
    pub fn get_context(&self, max_len: usize) -> &[u16] {
        self.tail(max_len)
    }

    /// Removes the last code point (not code unit) from the buffer,
    /// respecting surrogate pairs; a surrogate pair counts as one
    /// grapheme's worth of code units here. Returns the number of code
    /// units removed (1 or 2), or 0 if the buffer was already empty. An
    /// unpaired trailing surrogate is treated as a single code unit.
    pub fn pop_one_code_point(&mut self) -> usize {
        let len = self.units.len();
        if len == 0 {
            return 0;
        }
        let last = self.units[len - 1];
        let is_low_surrogate = (0xDC00..=0xDFFF).contains(&last);
        let width = if is_low_surrogate && len >= 2 {
            let prev = self.units[len - 2];
            if (0xD800..=0xDBFF).contains(&prev) {
                2
            } else {
                1
            }
        } else {
            1
        };
        self.units.truncate(len - width);
        width
    }

    /// UTF-8 rendering of the current buffer (`get_composition`), lossy on
    /// malformed UTF-16 since the host still needs *some* text back.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }
}

/// The active switch set. Switches are sticky —
/// only cleared by an RHS `SWITCH` on the same switch or by `reset`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchSet {
    active: HashSet<u16>,
}

impl SwitchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, id: u16) -> bool {
        self.active.contains(&id)
    }

    pub fn activate(&mut self, id: u16) {
        self.active.insert(id);
    }

    pub fn deactivate(&mut self, id: u16) {
        self.active.remove(&id);
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

/// Composing buffer + active switches, mutated only inside
/// `process_key`/`reset`/`set_composition`.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    pub composing: ComposingBuffer,
    pub switches: SwitchSet,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.composing.clear();
        self.switches.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_capped_truncates_from_head() {
        let mut buf = ComposingBuffer::new();
        buf.append_capped(&[1, 2, 3], 2);
        assert_eq!(buf.as_slice(), &[2, 3]);
    }

    #[test]
    fn pop_one_code_point_handles_surrogate_pairs() {
        let mut buf = ComposingBuffer::new();
        // U+1F600 (GRINNING FACE) as a surrogate pair.
        let units: Vec<u16> = '\u{1F600}'.encode_utf16(&mut [0u16; 2]).to_vec();
        buf.append_capped(&units, COMPOSING_CAP);
        assert_eq!(buf.len(), 2);
        let removed = buf.pop_one_code_point();
        assert_eq!(removed, 2);
        assert!(buf.is_empty());
    }

    #[test]
    fn pop_one_code_point_handles_bmp_char() {
        let mut buf = ComposingBuffer::new();
        buf.append_capped(&['a' as u16, 'b' as u16], COMPOSING_CAP);
        let removed = buf.pop_one_code_point();
        assert_eq!(removed, 1);
        assert_eq!(buf.as_slice(), &['a' as u16]);
    }

    #[test]
    fn reset_clears_composing_and_switches() {
        let mut state = EngineState::new();
        state.composing.append_capped(&['a' as u16], COMPOSING_CAP);
        state.switches.activate(1);
        state.reset();
        assert!(state.composing.is_empty());
        assert!(!state.switches.is_active(1));
    }
}
