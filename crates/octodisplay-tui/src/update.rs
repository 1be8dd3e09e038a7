//! Display reducer (update function).
//!
//! All display state mutations happen here. Each event touches exactly the
//! fields named by its variant; everything else keeps its last known value.

use octodisplay_core::core::cpu::CpuProbe;
use octodisplay_core::core::events::StatusEvent;

use crate::state::DisplayState;

/// Folds one status event into the display state.
///
/// `Cpu` events carry no payload; the load is sampled from `cpu` here.
pub fn update(state: &mut DisplayState, event: StatusEvent, cpu: &mut dyn CpuProbe) {
    match event {
        StatusEvent::Progress(progress) => {
            if let Some(pct) = progress.completion {
                state.completion = pct.min(100);
            }
            state.eta = Some(progress.eta);
            state.job_name = Some(progress.job_name);
        }
        StatusEvent::Temperature(temps) => {
            tracing::info!(
                "Extruder: {}°C / {}°C, Bed: {}°C / {}°C",
                temps.tool_actual,
                temps.tool_target,
                temps.bed_actual,
                temps.bed_target
            );
            state.temperatures = Some(temps);
        }
        StatusEvent::Cpu => {
            state.cpu_percent = Some(cpu.cpu_percent());
        }
    }
}
