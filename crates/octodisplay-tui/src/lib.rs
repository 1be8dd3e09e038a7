//! Full-screen printer status display.

pub mod input;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stdout};

use anyhow::Result;
use octodisplay_core::config::DisplayConfig;
use octodisplay_core::core::cpu::SystemCpu;
use octodisplay_core::core::queue::EventReceiver;
use octodisplay_core::core::shutdown::ShutdownCoordinator;
pub use runtime::{LoopExit, RenderLoop};
pub use state::DisplayState;

use crate::runtime::{CrosstermInput, TerminalSurface};

/// Runs the display until the operator quits or shutdown is signalled.
///
/// The terminal is restored before this returns, on success and on error.
///
/// # Errors
/// Returns an error if stdout is not a terminal, or drawing/input fails.
pub fn run_display(
    queue: EventReceiver,
    config: &DisplayConfig,
    shutdown: &ShutdownCoordinator,
) -> Result<LoopExit> {
    if !stdout().is_terminal() {
        anyhow::bail!("The status display requires a terminal on stdout.");
    }

    let surface = TerminalSurface::enter()?;
    let mut render_loop = RenderLoop::new(
        queue,
        surface,
        CrosstermInput,
        SystemCpu::new(),
        config,
        shutdown.clone(),
    );
    let exit = render_loop.run()?;
    tracing::info!(?exit, "render loop stopped");
    Ok(exit)
}
