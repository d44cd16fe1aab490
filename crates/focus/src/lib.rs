//! Focus awareness for clipline.
//!
//! Pasting from the history only works if the paste lands in the app the
//! user came from. This crate tracks that app (the focus witness) and
//! brings it back to the foreground.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Domain Layer                             │
//! │  app.rs      - AppInfo                                        │
//! │  tracker.rs  - FocusTracker (witness bookkeeping, pure)       │
//! │  provider.rs - FocusProvider / SurfaceHider traits            │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   Infrastructure Layer                        │
//! │  platform/macos.rs - NSWorkspace provider, NSApp hider        │
//! │  scripted.rs       - ScriptedFocus for tests                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod app;
mod error;
mod provider;
mod scripted;
mod tracker;

pub mod platform;

pub use app::AppInfo;
pub use error::{FocusError, Result};
pub use provider::{
    DeactivationSink, FocusProvider, FocusProviderRef, FocusSubscription, NullProvider,
    SurfaceHider, SurfaceHiderRef,
};
pub use scripted::ScriptedFocus;
pub use tracker::FocusTracker;
