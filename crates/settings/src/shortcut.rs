//! Shortcut bindings: a virtual key code plus a modifier mask.
//!
//! Key codes are macOS virtual key codes and modifier bits use the Carbon
//! values, so persisted bindings stay readable by other macOS tooling.
//! Platform layers translate them to whatever their APIs need.

use crate::error::SettingsError;
use crate::store::{OPEN_SHORTCUT_KEY, PASTE_SHORTCUT_KEY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Virtual key code of the `V` key.
pub const KEY_V: u32 = 9;

/// Modifier mask using Carbon bit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(u32);

impl Modifiers {
    /// Command (⌘).
    pub const COMMAND: Modifiers = Modifiers(0x0100);
    /// Shift (⇧).
    pub const SHIFT: Modifiers = Modifiers(0x0200);
    /// Option / Alt (⌥).
    pub const OPTION: Modifiers = Modifiers(0x0800);
    /// Control (⌃).
    pub const CONTROL: Modifiers = Modifiers(0x1000);

    const KNOWN: u32 = 0x0100 | 0x0200 | 0x0800 | 0x1000;

    pub const fn empty() -> Self {
        Modifiers(0)
    }

    /// Build from raw bits, dropping anything that is not a known modifier.
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Modifiers(bits & Self::KNOWN)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    /// Display glyphs in the conventional ⌃⌥⇧⌘ order.
    pub fn glyphs(self) -> String {
        let mut out = String::new();
        if self.contains(Self::CONTROL) {
            out.push('⌃');
        }
        if self.contains(Self::OPTION) {
            out.push('⌥');
        }
        if self.contains(Self::SHIFT) {
            out.push('⇧');
        }
        if self.contains(Self::COMMAND) {
            out.push('⌘');
        }
        out
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

/// A global key combination.
///
/// Always carries at least one modifier: a binding on a bare key would
/// hijack ordinary typing, so the constructor and the deserializer both
/// reject an empty mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBinding", into = "RawBinding")]
pub struct ShortcutBinding {
    key_code: u32,
    modifiers: Modifiers,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBinding {
    key_code: u32,
    modifiers: u32,
}

impl TryFrom<RawBinding> for ShortcutBinding {
    type Error = SettingsError;

    fn try_from(raw: RawBinding) -> Result<Self, Self::Error> {
        ShortcutBinding::new(raw.key_code, Modifiers::from_bits_truncate(raw.modifiers))
    }
}

impl From<ShortcutBinding> for RawBinding {
    fn from(binding: ShortcutBinding) -> Self {
        RawBinding {
            key_code: binding.key_code,
            modifiers: binding.modifiers.bits(),
        }
    }
}

impl ShortcutBinding {
    /// Create a binding, rejecting an empty modifier mask.
    pub fn new(key_code: u32, modifiers: Modifiers) -> Result<Self, SettingsError> {
        if modifiers.is_empty() {
            return Err(SettingsError::MissingModifier { key_code });
        }
        Ok(Self {
            key_code,
            modifiers,
        })
    }

    /// ⌘⇧V.
    pub const fn default_open() -> Self {
        Self {
            key_code: KEY_V,
            modifiers: Modifiers(Modifiers::COMMAND.0 | Modifiers::SHIFT.0),
        }
    }

    /// ⌘V, the platform paste keystroke.
    pub const fn default_paste() -> Self {
        Self {
            key_code: KEY_V,
            modifiers: Modifiers::COMMAND,
        }
    }

    pub fn key_code(&self) -> u32 {
        self.key_code
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Human-readable form such as `⇧⌘V`.
    pub fn display(&self) -> String {
        format!(
            "{}{}",
            self.modifiers.glyphs(),
            key_label(self.key_code).unwrap_or("?")
        )
    }
}

impl fmt::Display for ShortcutBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// The two named shortcut slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutSlot {
    /// Shows the history UI.
    OpenHistory,
    /// Pastes the current clipboard into the focus witness.
    Paste,
}

impl ShortcutSlot {
    pub const ALL: [ShortcutSlot; 2] = [ShortcutSlot::OpenHistory, ShortcutSlot::Paste];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShortcutSlot::OpenHistory => "open_history",
            ShortcutSlot::Paste => "paste",
        }
    }

    /// Settings-store key holding this slot's binding.
    pub fn settings_key(&self) -> &'static str {
        match self {
            ShortcutSlot::OpenHistory => OPEN_SHORTCUT_KEY,
            ShortcutSlot::Paste => PASTE_SHORTCUT_KEY,
        }
    }

    pub fn default_binding(&self) -> ShortcutBinding {
        match self {
            ShortcutSlot::OpenHistory => ShortcutBinding::default_open(),
            ShortcutSlot::Paste => ShortcutBinding::default_paste(),
        }
    }
}

impl fmt::Display for ShortcutSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labels for the ANSI virtual key codes 0..=51.
const KEY_LABELS: [&str; 52] = [
    "A", "S", "D", "F", "H", "G", "Z", "X", "C", "V", "§", "B", "Q", "W", "E", "R", // 0-15
    "Y", "T", "1", "2", "3", "4", "6", "5", "=", "9", "7", "-", "8", "0", "]", "O", // 16-31
    "U", "[", "I", "P", "↩", "L", "J", "'", "K", ";", "\\", ",", "/", "N", "M", ".", // 32-47
    "⇥", "Space", "`", "⌫", // 48-51
];

/// Display label for a virtual key code.
pub fn key_label(key_code: u32) -> Option<&'static str> {
    KEY_LABELS.get(key_code as usize).copied()
}

/// Character typed by a virtual key code without modifiers, if it types one.
pub fn key_char(key_code: u32) -> Option<char> {
    match key_label(key_code)? {
        "Space" => Some(' '),
        "↩" | "⇥" | "⌫" => None,
        label => {
            let mut chars = label.chars();
            let c = chars.next()?;
            chars.next().is_none().then(|| c.to_ascii_lowercase())
        }
    }
}
