use crate::paste::PasteError;
use clipline_hotkey::HotkeyError;
use clipline_settings::SettingsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Hotkey(#[from] HotkeyError),

    #[error(transparent)]
    Paste(#[from] PasteError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
