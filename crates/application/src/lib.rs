//! Coordination layer for clipline.
//!
//! [`Engine`] wires the clipboard poller, history store, focus tracker,
//! hotkey registrar and [`PastePipeline`] together and drives them from a
//! [`Scheduler`] instead of timers.

mod constants;
mod engine;
mod error;
mod paste;
mod scheduler;

pub use constants::*;
pub use engine::{Engine, EngineConfig, EngineEvent, EngineParts, Task};
pub use error::{EngineError, Result};
pub use paste::{PasteError, PastePipeline, PasteSource};
pub use scheduler::{Clock, ClockRef, ManualClock, Scheduler, SystemClock, TaskId};
