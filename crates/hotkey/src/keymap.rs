//! macOS virtual key codes to `global-hotkey` codes.

use global_hotkey::hotkey::Code;

/// ANSI layout, indexed by virtual key code 0..=51.
const CODES: [Code; 52] = [
    Code::KeyA,
    Code::KeyS,
    Code::KeyD,
    Code::KeyF,
    Code::KeyH,
    Code::KeyG,
    Code::KeyZ,
    Code::KeyX,
    Code::KeyC,
    Code::KeyV,
    Code::IntlBackslash,
    Code::KeyB,
    Code::KeyQ,
    Code::KeyW,
    Code::KeyE,
    Code::KeyR,
    Code::KeyY,
    Code::KeyT,
    Code::Digit1,
    Code::Digit2,
    Code::Digit3,
    Code::Digit4,
    Code::Digit6,
    Code::Digit5,
    Code::Equal,
    Code::Digit9,
    Code::Digit7,
    Code::Minus,
    Code::Digit8,
    Code::Digit0,
    Code::BracketRight,
    Code::KeyO,
    Code::KeyU,
    Code::BracketLeft,
    Code::KeyI,
    Code::KeyP,
    Code::Enter,
    Code::KeyL,
    Code::KeyJ,
    Code::Quote,
    Code::KeyK,
    Code::Semicolon,
    Code::Backslash,
    Code::Comma,
    Code::Slash,
    Code::KeyN,
    Code::KeyM,
    Code::Period,
    Code::Tab,
    Code::Space,
    Code::Backquote,
    Code::Backspace,
];

pub fn code_for(key_code: u32) -> Option<Code> {
    CODES.get(key_code as usize).copied()
}
