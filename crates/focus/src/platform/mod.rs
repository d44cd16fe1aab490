//! Platform-specific implementations.

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "macos")]
pub use macos::{MacFocusProvider, MacSurfaceHider};

// Re-export the appropriate provider for the current platform
#[cfg(target_os = "macos")]
pub type PlatformFocusProvider = MacFocusProvider;

#[cfg(target_os = "macos")]
pub type PlatformSurfaceHider = MacSurfaceHider;

#[cfg(not(target_os = "macos"))]
pub type PlatformFocusProvider = crate::provider::NullProvider;

#[cfg(not(target_os = "macos"))]
pub type PlatformSurfaceHider = crate::provider::NullProvider;
