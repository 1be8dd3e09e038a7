//! Render loop runtime - owns display state, drives ticks, handles input.
//!
//! The render loop is the only consumer of the event queue and the only owner
//! of [`DisplayState`]. It wakes on a fixed tick, applies pending events
//! according to the configured [`DrainPolicy`], and redraws. Between ticks it
//! waits on keyboard input with a timeout equal to the time left until the
//! next tick, so input stays responsive and the loop never blocks on I/O.
//!
//! Exits happen only between ticks: a tick applies its events and redraws
//! before input is looked at again, so quitting never leaves a half-applied
//! state behind.

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use octodisplay_core::config::{DisplayConfig, DrainPolicy};
use octodisplay_core::core::cpu::CpuProbe;
use octodisplay_core::core::interrupt;
use octodisplay_core::core::queue::EventReceiver;
use octodisplay_core::core::shutdown::ShutdownCoordinator;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::input::{KeyAction, classify};
use crate::state::DisplayState;
use crate::{render, terminal, update};

/// Where the display state is drawn.
pub trait DisplaySurface {
    /// Redraws the whole surface from `state`.
    ///
    /// # Errors
    /// Returns an error if drawing fails.
    fn redraw(&mut self, state: &DisplayState) -> Result<()>;
}

/// Source of terminal input events.
pub trait InputSource {
    /// Waits up to `timeout` for an input event.
    ///
    /// # Errors
    /// Returns an error if reading input fails.
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

/// Full-screen ratatui surface on stdout.
///
/// Restores the terminal when dropped.
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSurface {
    /// Enters raw mode and the alternate screen.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn enter() -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();
        interrupt::set_restore_hook(|| {
            let _ = terminal::restore_terminal();
        });

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        Ok(Self { terminal })
    }
}

impl DisplaySurface for TerminalSurface {
    fn redraw(&mut self, state: &DisplayState) -> Result<()> {
        self.terminal
            .draw(|frame| render::render(state, frame))
            .context("Failed to draw display")?;
        Ok(())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}

/// Keyboard input from crossterm.
pub struct CrosstermInput;

impl InputSource for CrosstermInput {
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout).context("Failed to poll terminal input")? {
            Ok(Some(event::read().context("Failed to read terminal input")?))
        } else {
            Ok(None)
        }
    }
}

/// Why the render loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The operator pressed `q`.
    Quit,
    /// Ctrl+C, a process signal, or another component requested shutdown.
    Stopped,
}

/// The single consumer of status events.
pub struct RenderLoop<D, I, C> {
    state: DisplayState,
    queue: EventReceiver,
    surface: D,
    input: I,
    cpu: C,
    tick_period: Duration,
    drain: DrainPolicy,
    shutdown: ShutdownCoordinator,
}

impl<D, I, C> RenderLoop<D, I, C>
where
    D: DisplaySurface,
    I: InputSource,
    C: CpuProbe,
{
    pub fn new(
        queue: EventReceiver,
        surface: D,
        input: I,
        cpu: C,
        config: &DisplayConfig,
        shutdown: ShutdownCoordinator,
    ) -> Self {
        Self {
            state: DisplayState::new(),
            queue,
            surface,
            input,
            cpu,
            tick_period: config.tick(),
            drain: config.drain,
            shutdown,
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    /// Events still waiting in the queue.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Runs until quit or shutdown. The first tick happens immediately.
    ///
    /// # Errors
    /// Returns an error if drawing or reading input fails.
    pub fn run(&mut self) -> Result<LoopExit> {
        tracing::info!(tick = ?self.tick_period, drain = ?self.drain, "render loop start");
        self.surface.redraw(&self.state)?;

        let mut next_tick = Instant::now();
        loop {
            if self.shutdown.is_stopping() {
                return Ok(LoopExit::Stopped);
            }

            let now = Instant::now();
            if now >= next_tick {
                // Re-arm before applying, so a slow redraw doesn't stretch the cadence.
                next_tick = now + self.tick_period;
                self.tick()?;
                continue;
            }

            if let Some(event) = self.input.poll_event(next_tick - now)?
                && let Some(exit) = self.handle_input(&event)?
            {
                return Ok(exit);
            }
        }
    }

    /// Applies pending events per the drain policy and redraws if any applied.
    ///
    /// Returns the number of events applied.
    ///
    /// # Errors
    /// Returns an error if the redraw fails.
    pub fn tick(&mut self) -> Result<usize> {
        let budget = self.drain.budget();
        let mut applied = 0;
        while budget.is_none_or(|max| applied < max) {
            let Some(event) = self.queue.try_pop() else {
                break;
            };
            tracing::debug!(%event, "apply");
            update::update(&mut self.state, event, &mut self.cpu);
            applied += 1;
        }
        if applied > 0 {
            self.surface.redraw(&self.state)?;
        }
        Ok(applied)
    }

    fn handle_input(&mut self, event: &Event) -> Result<Option<LoopExit>> {
        match event {
            Event::Key(key) => match classify(key) {
                KeyAction::Quit => {
                    tracing::info!("quit key pressed");
                    Ok(Some(LoopExit::Quit))
                }
                KeyAction::Interrupt => {
                    tracing::info!("ctrl+c pressed closing threads");
                    interrupt::trigger(&self.shutdown);
                    Ok(Some(LoopExit::Stopped))
                }
                KeyAction::Ignore => Ok(None),
            },
            Event::Resize(..) => {
                self.surface.redraw(&self.state)?;
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}
