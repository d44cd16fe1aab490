//! clipline daemon.
//!
//! Records clipboard history in the background and pastes entries back
//! into the application the user was working in. Everything runs on the
//! main thread; the only helper thread waits for Ctrl-C.

mod config;
#[cfg(target_os = "macos")]
mod macos;

use anyhow::{Context, Result};
use clipline_application::{Engine, EngineEvent, EngineParts, SystemClock};
use clipline_clipboard::SystemClipboard;
use clipline_events::LogEventBus;
use clipline_focus::platform::{PlatformFocusProvider, PlatformSurfaceHider};
use clipline_focus::AppInfo;
use clipline_hotkey::GlobalHotkeyBackend;
use clipline_input::EnigoSynthesizer;
use clipline_storage::Database;
use config::DaemonConfig;
use crossbeam_channel::Receiver;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Longest the loop waits before checking hotkeys, focus changes and the
/// shutdown flag again.
const MAX_WAIT: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    let (config, config_error) = match DaemonConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (DaemonConfig::default(), Some(e)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting clipline daemon");
    if let Some(e) = config_error {
        tracing::warn!(error = %format!("{e:#}"), "ignoring config file, using defaults");
    }

    #[cfg(target_os = "macos")]
    macos::init_application();

    check_accessibility(&config);

    let db_path = config.database_path()?;
    let database = Database::open(&db_path)
        .with_context(|| format!("failed to open settings database at {}", db_path.display()))?;
    tracing::info!(path = %db_path.display(), "settings database ready");

    let parts = assemble(Arc::new(database))?;
    let mut engine = Engine::new(parts, config.engine_config());

    let (focus_tx, focus_rx) = crossbeam_channel::unbounded::<AppInfo>();
    engine.start(Box::new(move |app| {
        let _ = focus_tx.send(app);
    }));

    let shutdown = Arc::new(AtomicBool::new(false));
    spawn_signal_listener(Arc::clone(&shutdown))?;

    run(&mut engine, &focus_rx, &shutdown);

    tracing::info!("Shutting down");
    engine.shutdown();
    Ok(())
}

/// Build the platform capabilities around the settings database.
fn assemble(database: Arc<Database>) -> Result<EngineParts> {
    let clipboard = SystemClipboard::new().context("clipboard unavailable")?;
    let hotkeys = GlobalHotkeyBackend::new().context("global hotkeys unavailable")?;
    let focus = Arc::new(PlatformFocusProvider::default());

    Ok(EngineParts {
        clipboard: Arc::new(clipboard),
        focus,
        hider: Arc::new(PlatformSurfaceHider::default()),
        keystrokes: Arc::new(EnigoSynthesizer::deferred()),
        hotkeys: Arc::new(hotkeys),
        settings: database,
        events: Arc::new(LogEventBus),
        clock: Arc::new(SystemClock),
    })
}

fn check_accessibility(config: &DaemonConfig) {
    let granted = if config.prompt_accessibility {
        clipline_input::ensure_accessibility_access()
    } else {
        clipline_input::has_accessibility_access()
    };
    if granted {
        tracing::debug!("accessibility access granted");
    } else {
        tracing::warn!("accessibility access missing, pasted entries stay on the clipboard until it is granted");
    }
}

/// Set `flag` once Ctrl-C arrives.
fn spawn_signal_listener(flag: Arc<AtomicBool>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build signal runtime")?;

    std::thread::Builder::new()
        .name("clipline-signals".into())
        .spawn(move || {
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        tracing::info!("Ctrl-C received");
                        flag.store(true, Ordering::SeqCst);
                    }
                    Err(e) => tracing::warn!(error = %e, "cannot listen for Ctrl-C"),
                }
            });
        })
        .context("failed to spawn signal thread")?;
    Ok(())
}

fn run(engine: &mut Engine, focus_rx: &Receiver<AppInfo>, shutdown: &AtomicBool) {
    while !shutdown.load(Ordering::SeqCst) {
        wait(engine.next_deadline());

        for app in focus_rx.try_iter() {
            engine.handle(EngineEvent::AppDeactivated(app));
        }
        engine.poll_hotkeys();
        engine.run_due();
    }
}

/// Block until the next deadline, bounded by [`MAX_WAIT`].
fn wait(deadline: Option<Instant>) {
    let timeout = deadline
        .map(|d| d.saturating_duration_since(Instant::now()))
        .unwrap_or(MAX_WAIT)
        .min(MAX_WAIT);

    #[cfg(target_os = "macos")]
    macos::pump_run_loop(timeout);

    #[cfg(not(target_os = "macos"))]
    std::thread::sleep(timeout);
}
