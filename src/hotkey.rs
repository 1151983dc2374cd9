//! Hotkey grammar.
//!
//! Parses strings like `"Ctrl+Shift+F1"` into a structured [`Hotkey`]. Used
//! for the `INFO_HOTKEY` metadata entry and by hosts that let users bind a
//! layout-switch shortcut.

use crate::error::HotkeyError;
use crate::vk::VirtualKey;

/// A parsed hotkey: one key plus the modifiers that must be held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    pub key: VirtualKey,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Parses a hotkey string: tokens separated by `+` or whitespace,
/// case-insensitive, exactly one non-modifier key token required.
///
/// Rejects: an empty string, a trailing separator (`"Ctrl+"`), a string
/// naming only modifiers, an unrecognized token (including `F13` and
/// above, which this registry does not know), and more than one key
/// token (`"Ctrl+A+B"`).
pub fn parse(s: &str) -> Result<Hotkey, HotkeyError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(HotkeyError::Empty);
    }
    if trimmed.ends_with('+') {
        return Err(HotkeyError::TrailingSeparator);
    }

    let tokens: Vec<&str> = trimmed
        .split(|c: char| c == '+' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return Err(HotkeyError::Empty);
    }

    let mut shift = false;
    let mut ctrl = false;
    let mut alt = false;
    let mut meta = false;
    let mut key: Option<VirtualKey> = None;

    for tok in tokens {
        match tok.to_ascii_uppercase().as_str() {
            "SHIFT" => shift = true,
            "CTRL" | "CONTROL" => ctrl = true,
            "ALT" => alt = true,
            "META" | "CMD" | "WIN" | "WINDOWS" | "SUPER" => meta = true,
            _ => {
                let vk = VirtualKey::from_name(tok).ok_or_else(|| HotkeyError::UnknownToken(tok.to_string()))?;
                match vk {
                    VirtualKey::Shift => shift = true,
                    VirtualKey::Control => ctrl = true,
                    VirtualKey::Menu => alt = true,
                    _ => {
                        if key.is_some() {
                            return Err(HotkeyError::MultipleKeys);
                        }
                        key = Some(vk);
                    }
                }
            }
        }
    }

    let key = key.ok_or(HotkeyError::ModifierOnly)?;
    Ok(Hotkey { key, shift, ctrl, alt, meta })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_key_with_modifiers() {
        let hk = parse("Ctrl+Shift+F1").unwrap();
        assert_eq!(hk.key, VirtualKey::F1);
        assert!(hk.ctrl && hk.shift && !hk.alt && !hk.meta);
    }

    #[test]
    fn is_case_insensitive_and_tolerates_whitespace() {
        let hk = parse(" ctrl + a ").unwrap();
        assert_eq!(hk.key, VirtualKey::KeyA);
        assert!(hk.ctrl);
    }

    #[test]
    fn rejects_empty_string() {
        assert_eq!(parse(""), Err(HotkeyError::Empty));
        assert_eq!(parse("   "), Err(HotkeyError::Empty));
    }

    #[test]
    fn rejects_trailing_separator() {
        assert_eq!(parse("Ctrl+"), Err(HotkeyError::TrailingSeparator));
    }

    #[test]
    fn rejects_modifier_only() {
        assert_eq!(parse("Ctrl+Shift"), Err(HotkeyError::ModifierOnly));
    }

    #[test]
    fn rejects_multiple_keys() {
        assert_eq!(parse("Ctrl+A+B"), Err(HotkeyError::MultipleKeys));
    }

    #[test]
    fn rejects_unsupported_function_keys() {
        assert_eq!(parse("F13"), Err(HotkeyError::UnknownToken("F13".to_string())));
    }

    #[test]
    fn rejects_unknown_token() {
        assert!(matches!(parse("Ctrl+Bogus"), Err(HotkeyError::UnknownToken(_))));
    }
}
