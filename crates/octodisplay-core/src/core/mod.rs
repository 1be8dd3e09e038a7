//! Core module: UI-agnostic polling pipeline.
//!
//! This module contains:
//! - `events`: Status event types flowing from pollers to the render loop
//! - `queue`: Unbounded event queue (multi-producer, single consumer)
//! - `pollers`: Independently scheduled polling tasks
//! - `shutdown`: Cancellation signal and join barrier for the pollers
//! - `interrupt`: Signal handling for graceful shutdown
//! - `cpu`: Host CPU load sampling

pub mod cpu;
pub mod events;
pub mod interrupt;
pub mod pollers;
pub mod queue;
pub mod shutdown;
