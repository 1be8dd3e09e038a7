use std::sync::OnceLock;

use anyhow::{Context, Result};

use crate::core::shutdown::ShutdownCoordinator;

static RESTORE_HOOK: OnceLock<Box<dyn Fn() + Send + Sync>> = OnceLock::new();

/// Exit code used when a second signal forces the process down.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Installs the process signal handler (SIGINT, SIGTERM, SIGHUP).
///
/// The first signal asks `coordinator` to stop; the render loop notices and
/// the normal shutdown path runs. A second signal restores the terminal and
/// exits immediately, for when a stuck fetch delays the normal path.
///
/// The handler never prints; the terminal belongs to the display.
///
/// # Errors
/// Returns an error if a handler is already installed.
pub fn init(coordinator: ShutdownCoordinator) -> Result<()> {
    ctrlc::set_handler(move || trigger(&coordinator))
        .context("Failed to install interrupt handler")
}

/// Handles one interrupt, from a signal or from Ctrl+C read in raw mode.
///
/// The first interrupt requests a stop. A repeated one runs the restore hook
/// and exits with [`FORCED_EXIT_CODE`].
pub fn trigger(coordinator: &ShutdownCoordinator) {
    if coordinator.interrupt() {
        tracing::warn!("second interrupt, forcing exit");
        if let Some(hook) = RESTORE_HOOK.get() {
            hook();
        }
        std::process::exit(FORCED_EXIT_CODE);
    }
    tracing::info!("interrupt received, closing pollers");
}

/// Registers a hook run before a forced exit.
///
/// Typically used by the TUI to restore terminal state.
pub fn set_restore_hook<F>(hook: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let _ = RESTORE_HOOK.set(Box::new(hook));
}
