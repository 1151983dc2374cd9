//! Virtual-Key Registry.
//!
//! A static, pure mapping between platform key codes, this crate's own
//! `VirtualKey` enum, and user-visible names. Modeled as compile-time
//! tables: no lazily-initialized global state, just `match` arms the
//! compiler turns into dense jump tables.
//!
//! The numeric values mirror the Windows `VK_*` constants the upstream
//! C++ engine (and the platform shim this core plugs into) was built
//! against, so `to_platform_code`/`from_platform_code` are identity-ish
//! on that platform and a simple lookup table elsewhere.

/// The closed set of keys the matcher and hotkey grammar understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum VirtualKey {
    Back = 0x08,
    Tab = 0x09,
    Return = 0x0D,
    Shift = 0x10,
    Control = 0x11,
    Menu = 0x12,
    Pause = 0x13,
    Capital = 0x14,
    Escape = 0x1B,
    Space = 0x20,
    Prior = 0x21,
    Next = 0x22,
    End = 0x23,
    Home = 0x24,
    Left = 0x25,
    Up = 0x26,
    Right = 0x27,
    Down = 0x28,
    Delete = 0x2E,

    Key0 = 0x30,
    Key1 = 0x31,
    Key2 = 0x32,
    Key3 = 0x33,
    Key4 = 0x34,
    Key5 = 0x35,
    Key6 = 0x36,
    Key7 = 0x37,
    Key8 = 0x38,
    Key9 = 0x39,

    KeyA = 0x41,
    KeyB = 0x42,
    KeyC = 0x43,
    KeyD = 0x44,
    KeyE = 0x45,
    KeyF = 0x46,
    KeyG = 0x47,
    KeyH = 0x48,
    KeyI = 0x49,
    KeyJ = 0x4A,
    KeyK = 0x4B,
    KeyL = 0x4C,
    KeyM = 0x4D,
    KeyN = 0x4E,
    KeyO = 0x4F,
    KeyP = 0x50,
    KeyQ = 0x51,
    KeyR = 0x52,
    KeyS = 0x53,
    KeyT = 0x54,
    KeyU = 0x55,
    KeyV = 0x56,
    KeyW = 0x57,
    KeyX = 0x58,
    KeyY = 0x59,
    KeyZ = 0x5A,

    Numpad0 = 0x60,
    Numpad1 = 0x61,
    Numpad2 = 0x62,
    Numpad3 = 0x63,
    Numpad4 = 0x64,
    Numpad5 = 0x65,
    Numpad6 = 0x66,
    Numpad7 = 0x67,
    Numpad8 = 0x68,
    Numpad9 = 0x69,
    Multiply = 0x6A,
    Add = 0x6B,
    Separator = 0x6C,
    Subtract = 0x6D,
    Decimal = 0x6E,
    Divide = 0x6F,

    F1 = 0x70,
    F2 = 0x71,
    F3 = 0x72,
    F4 = 0x73,
    F5 = 0x74,
    F6 = 0x75,
    F7 = 0x76,
    F8 = 0x77,
    F9 = 0x78,
    F10 = 0x79,
    F11 = 0x7A,
    F12 = 0x7B,

    Oem1 = 0xBA,
    OemPlus = 0xBB,
    OemComma = 0xBC,
    OemMinus = 0xBD,
    OemPeriod = 0xBE,
    Oem2 = 0xBF,
    Oem3 = 0xC0,
    Oem4 = 0xDB,
    Oem5 = 0xDC,
    Oem6 = 0xDD,
    Oem7 = 0xDE,
}

impl VirtualKey {
    pub const MAX_VALUE: u16 = 0xDE;

    /// Looks up a key from its platform (Windows `VK_*`) code.
    pub fn from_platform_code(code: u32) -> Option<Self> {
        use VirtualKey::*;
        Some(match code {
            0x08 => Back,
            0x09 => Tab,
            0x0D => Return,
            0x10 => Shift,
            0x11 => Control,
            0x12 => Menu,
            0x13 => Pause,
            0x14 => Capital,
            0x1B => Escape,
            0x20 => Space,
            0x21 => Prior,
            0x22 => Next,
            0x23 => End,
            0x24 => Home,
            0x25 => Left,
            0x26 => Up,
            0x27 => Right,
            0x28 => Down,
            0x2E => Delete,
            0x30 => Key0,
            0x31 => Key1,
            0x32 => Key2,
            0x33 => Key3,
            0x34 => Key4,
            0x35 => Key5,
            0x36 => Key6,
            0x37 => Key7,
            0x38 => Key8,
            0x39 => Key9,
            0x41 => KeyA,
            0x42 => KeyB,
            0x43 => KeyC,
            0x44 => KeyD,
            0x45 => KeyE,
            0x46 => KeyF,
            0x47 => KeyG,
            0x48 => KeyH,
            0x49 => KeyI,
            0x4A => KeyJ,
            0x4B => KeyK,
            0x4C => KeyL,
            0x4D => KeyM,
            0x4E => KeyN,
            0x4F => KeyO,
            0x50 => KeyP,
            0x51 => KeyQ,
            0x52 => KeyR,
            0x53 => KeyS,
            0x54 => KeyT,
            0x55 => KeyU,
            0x56 => KeyV,
            0x57 => KeyW,
            0x58 => KeyX,
            0x59 => KeyY,
            0x5A => KeyZ,
            0x60 => Numpad0,
            0x61 => Numpad1,
            0x62 => Numpad2,
            0x63 => Numpad3,
            0x64 => Numpad4,
            0x65 => Numpad5,
            0x66 => Numpad6,
            0x67 => Numpad7,
            0x68 => Numpad8,
            0x69 => Numpad9,
            0x6A => Multiply,
            0x6B => Add,
            0x6C => Separator,
            0x6D => Subtract,
            0x6E => Decimal,
            0x6F => Divide,
            0x70 => F1,
            0x71 => F2,
            0x72 => F3,
            0x73 => F4,
            0x74 => F5,
            0x75 => F6,
            0x76 => F7,
            0x77 => F8,
            0x78 => F9,
            0x79 => F10,
            0x7A => F11,
            0x7B => F12,
            0xBA => Oem1,
            0xBB => OemPlus,
            0xBC => OemComma,
            0xBD => OemMinus,
            0xBE => OemPeriod,
            0xBF => Oem2,
            0xC0 => Oem3,
            0xDB => Oem4,
            0xDC => Oem5,
            0xDD => Oem6,
            0xDE => Oem7,
            _ => return None,
        })
    }

    /// Converts back to the platform (Windows `VK_*`) code.
    pub fn to_platform_code(self) -> u32 {
        self as u16 as u32
    }

    /// Case-insensitive lookup by canonical name or alias.
    ///
    /// Accepts `VK_`-prefixed names, the canonical name, and the aliases
    /// (`ENTER`≡`RETURN`, `BACK`≡`BACKSPACE`,
    /// `CTRL`≡`CONTROL`, `ALT`≡`MENU`, `CMD`≡`WIN`≡`META`... note `META`/
    /// `CMD`/`WIN` do not map to a `VirtualKey` here since this engine has
    /// no dedicated "meta" key in its VK space; they are handled by the
    /// hotkey grammar as modifier tokens instead, never as a key name).
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        let upper = upper.strip_prefix("VK_").unwrap_or(&upper);
        use VirtualKey::*;
        Some(match upper {
            "BACK" | "BACKSPACE" => Back,
            "TAB" => Tab,
            "RETURN" | "ENTER" => Return,
            "SHIFT" => Shift,
            "CONTROL" | "CTRL" => Control,
            "MENU" | "ALT" => Menu,
            "PAUSE" => Pause,
            "CAPITAL" | "CAPSLOCK" => Capital,
            "ESCAPE" | "ESC" => Escape,
            "SPACE" => Space,
            "PRIOR" | "PAGEUP" => Prior,
            "NEXT" | "PAGEDOWN" => Next,
            "END" => End,
            "HOME" => Home,
            "LEFT" => Left,
            "UP" => Up,
            "RIGHT" => Right,
            "DOWN" => Down,
            "DELETE" | "DEL" => Delete,
            "0" | "KEY_0" => Key0,
            "1" | "KEY_1" => Key1,
            "2" | "KEY_2" => Key2,
            "3" | "KEY_3" => Key3,
            "4" | "KEY_4" => Key4,
            "5" | "KEY_5" => Key5,
            "6" | "KEY_6" => Key6,
            "7" | "KEY_7" => Key7,
            "8" | "KEY_8" => Key8,
            "9" | "KEY_9" => Key9,
            "A" | "KEY_A" => KeyA,
            "B" | "KEY_B" => KeyB,
            "C" | "KEY_C" => KeyC,
            "D" | "KEY_D" => KeyD,
            "E" | "KEY_E" => KeyE,
            "F" | "KEY_F" => KeyF,
            "G" | "KEY_G" => KeyG,
            "H" | "KEY_H" => KeyH,
            "I" | "KEY_I" => KeyI,
            "J" | "KEY_J" => KeyJ,
            "K" | "KEY_K" => KeyK,
            "L" | "KEY_L" => KeyL,
            "M" | "KEY_M" => KeyM,
            "N" | "KEY_N" => KeyN,
            "O" | "KEY_O" => KeyO,
            "P" | "KEY_P" => KeyP,
            "Q" | "KEY_Q" => KeyQ,
            "R" | "KEY_R" => KeyR,
            "S" | "KEY_S" => KeyS,
            "T" | "KEY_T" => KeyT,
            "U" | "KEY_U" => KeyU,
            "V" | "KEY_V" => KeyV,
            "W" | "KEY_W" => KeyW,
            "X" | "KEY_X" => KeyX,
            "Y" | "KEY_Y" => KeyY,
            "Z" | "KEY_Z" => KeyZ,
            "NUMPAD0" | "NUM0" => Numpad0,
            "NUMPAD1" | "NUM1" => Numpad1,
            "NUMPAD2" | "NUM2" => Numpad2,
            "NUMPAD3" | "NUM3" => Numpad3,
            "NUMPAD4" | "NUM4" => Numpad4,
            "NUMPAD5" | "NUM5" => Numpad5,
            "NUMPAD6" | "NUM6" => Numpad6,
            "NUMPAD7" | "NUM7" => Numpad7,
            "NUMPAD8" | "NUM8" => Numpad8,
            "NUMPAD9" | "NUM9" => Numpad9,
            "MULTIPLY" => Multiply,
            "ADD" => Add,
            "SEPARATOR" => Separator,
            "SUBTRACT" => Subtract,
            "DECIMAL" => Decimal,
            "DIVIDE" => Divide,
            "F1" => F1,
            "F2" => F2,
            "F3" => F3,
            "F4" => F4,
            "F5" => F5,
            "F6" => F6,
            "F7" => F7,
            "F8" => F8,
            "F9" => F9,
            "F10" => F10,
            "F11" => F11,
            "F12" => F12,
            ";" | "OEM1" => Oem1,
            "+" | "=" | "OEMPLUS" => OemPlus,
            "," | "OEMCOMMA" => OemComma,
            "-" | "OEMMINUS" => OemMinus,
            "." | "OEMPERIOD" => OemPeriod,
            "/" | "OEM2" => Oem2,
            "`" | "OEM3" => Oem3,
            "[" | "OEM4" => Oem4,
            "\\" | "OEM5" => Oem5,
            "]" | "OEM6" => Oem6,
            "'" | "OEM7" => Oem7,
            _ => return None,
        })
    }

    /// User-visible display name (used by hosts to render key captions).
    pub fn display_name(self) -> &'static str {
        use VirtualKey::*;
        match self {
            Back => "Backspace",
            Tab => "Tab",
            Return => "Enter",
            Shift => "Shift",
            Control => "Ctrl",
            Menu => "Alt",
            Pause => "Pause",
            Capital => "CapsLock",
            Escape => "Esc",
            Space => "Space",
            Prior => "PageUp",
            Next => "PageDown",
            End => "End",
            Home => "Home",
            Left => "Left",
            Up => "Up",
            Right => "Right",
            Down => "Down",
            Delete => "Delete",
            Key0 => "0",
            Key1 => "1",
            Key2 => "2",
            Key3 => "3",
            Key4 => "4",
            Key5 => "5",
            Key6 => "6",
            Key7 => "7",
            Key8 => "8",
            Key9 => "9",
            KeyA => "A",
            KeyB => "B",
            KeyC => "C",
            KeyD => "D",
            KeyE => "E",
            KeyF => "F",
            KeyG => "G",
            KeyH => "H",
            KeyI => "I",
            KeyJ => "J",
            KeyK => "K",
            KeyL => "L",
            KeyM => "M",
            KeyN => "N",
            KeyO => "O",
            KeyP => "P",
            KeyQ => "Q",
            KeyR => "R",
            KeyS => "S",
            KeyT => "T",
            KeyU => "U",
            KeyV => "V",
            KeyW => "W",
            KeyX => "X",
            KeyY => "Y",
            KeyZ => "Z",
            Numpad0 => "Num0",
            Numpad1 => "Num1",
            Numpad2 => "Num2",
            Numpad3 => "Num3",
            Numpad4 => "Num4",
            Numpad5 => "Num5",
            Numpad6 => "Num6",
            Numpad7 => "Num7",
            Numpad8 => "Num8",
            Numpad9 => "Num9",
            Multiply => "Num*",
            Add => "Num+",
            Separator => "NumSep",
            Subtract => "Num-",
            Decimal => "Num.",
            Divide => "Num/",
            F1 => "F1",
            F2 => "F2",
            F3 => "F3",
            F4 => "F4",
            F5 => "F5",
            F6 => "F6",
            F7 => "F7",
            F8 => "F8",
            F9 => "F9",
            F10 => "F10",
            F11 => "F11",
            F12 => "F12",
            Oem1 => ";",
            OemPlus => "+",
            OemComma => ",",
            OemMinus => "-",
            OemPeriod => ".",
            Oem2 => "/",
            Oem3 => "`",
            Oem4 => "[",
            Oem5 => "\\",
            Oem6 => "]",
            Oem7 => "'",
        }
    }

    pub fn is_letter(self) -> bool {
        matches!(self as u16, 0x41..=0x5A)
    }

    pub fn is_number(self) -> bool {
        matches!(self as u16, 0x30..=0x39)
    }

    pub fn is_numpad(self) -> bool {
        matches!(self as u16, 0x60..=0x6F)
    }

    pub fn is_function(self) -> bool {
        matches!(self as u16, 0x70..=0x7B)
    }

    pub fn is_modifier(self) -> bool {
        matches!(self, VirtualKey::Shift | VirtualKey::Control | VirtualKey::Menu)
    }
}

/// Whether a raw KM2 `PREDEFINED` operand names a key this registry knows.
/// `0` (`Null`) is treated as valid-but-unmapped by the upstream format, so
/// this accepts it alongside every recognized `VirtualKey` code.
pub fn is_valid_code(code: u16) -> bool {
    code == 0 || VirtualKey::from_platform_code(code as u32).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_platform_codes() {
        for vk in [
            VirtualKey::Back,
            VirtualKey::KeyA,
            VirtualKey::F12,
            VirtualKey::Oem7,
        ] {
            let code = vk.to_platform_code();
            assert_eq!(VirtualKey::from_platform_code(code), Some(vk));
        }
    }

    #[test]
    fn aliases_resolve_case_insensitively() {
        assert_eq!(VirtualKey::from_name("enter"), Some(VirtualKey::Return));
        assert_eq!(VirtualKey::from_name("Return"), Some(VirtualKey::Return));
        assert_eq!(VirtualKey::from_name("back"), Some(VirtualKey::Back));
        assert_eq!(VirtualKey::from_name("BACKSPACE"), Some(VirtualKey::Back));
        assert_eq!(VirtualKey::from_name("ctrl"), Some(VirtualKey::Control));
        assert_eq!(VirtualKey::from_name("alt"), Some(VirtualKey::Menu));
        assert_eq!(VirtualKey::from_name("VK_SPACE"), Some(VirtualKey::Space));
    }

    #[test]
    fn unknown_names_are_none() {
        assert_eq!(VirtualKey::from_name("F13"), None);
        assert_eq!(VirtualKey::from_name("meta"), None);
        assert_eq!(VirtualKey::from_name(""), None);
    }

    #[test]
    fn key_categories_match_upstream() {
        assert!(VirtualKey::KeyA.is_letter());
        assert!(!VirtualKey::Key0.is_letter());
        assert!(VirtualKey::Key0.is_number());
        assert!(VirtualKey::Numpad0.is_numpad());
        assert!(VirtualKey::Divide.is_numpad());
        assert!(VirtualKey::F1.is_function());
        assert!(!VirtualKey::Escape.is_function());
        assert!(VirtualKey::Shift.is_modifier());
        assert!(!VirtualKey::KeyA.is_modifier());
    }

    #[test]
    fn validation_rejects_code_zero_is_allowed_but_unmapped_codes_are_not() {
        assert!(is_valid_code(0));
        assert!(is_valid_code(VirtualKey::KeyA as u16));
        assert!(!is_valid_code(1000));
    }
}
