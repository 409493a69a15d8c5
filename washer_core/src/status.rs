//! Events returned from each controller tick.

use crate::alerts::{AlertKind, Tone};
use crate::load::LoadLevel;
use crate::safety::SafetyEdge;
use crate::settings::CycleSettings;

/// Why a start press was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    DoorOpen,
    Overloaded,
    /// No load reading or no settled door reading since power-on.
    SensorsNotReady,
}

impl DenialReason {
    pub const fn name(self) -> &'static str {
        match self {
            DenialReason::DoorOpen => "door_open",
            DenialReason::Overloaded => "overloaded",
            DenialReason::SensorsNotReady => "sensors_not_ready",
        }
    }
}

/// Sensor values at the moment they were reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReport {
    /// Normalized load, `None` when the sensor never answered.
    pub load: Option<f32>,
    pub water_temp_c: Option<f32>,
    pub light_pct: Option<f32>,
    /// Undebounced door reading for this frame.
    pub door_reads_open: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WasherEvent {
    PoweredOn,
    PoweredOff { aborted_cycle: bool },
    /// Power pressed during a cycle under the `ignore` policy.
    PowerIgnored,
    StartDenied(DenialReason),
    CycleStarted(CycleSettings),
    AlreadyRunning,
    /// Display now shows `remaining` ten-minute steps.
    CountdownStep { remaining: u32 },
    CycleComplete,
    SettingsChanged(CycleSettings),
    SensorsChanged(SensorReport),
    Safety(SafetyEdge),
    LoadLevelChanged(LoadLevel),
    Tone { kind: AlertKind, tone: Tone },
}

impl WasherEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            WasherEvent::PoweredOn => "powered_on",
            WasherEvent::PoweredOff { .. } => "powered_off",
            WasherEvent::PowerIgnored => "power_ignored",
            WasherEvent::StartDenied(_) => "start_denied",
            WasherEvent::CycleStarted(_) => "cycle_started",
            WasherEvent::AlreadyRunning => "already_running",
            WasherEvent::CountdownStep { .. } => "countdown_step",
            WasherEvent::CycleComplete => "cycle_complete",
            WasherEvent::SettingsChanged(_) => "settings",
            WasherEvent::SensorsChanged(_) => "sensors",
            WasherEvent::Safety(SafetyEdge::DoorOpened) => "door_opened",
            WasherEvent::Safety(SafetyEdge::DoorClosed) => "door_closed",
            WasherEvent::Safety(SafetyEdge::OverloadDetected) => "overload_detected",
            WasherEvent::Safety(SafetyEdge::OverloadCleared) => "overload_cleared",
            WasherEvent::LoadLevelChanged(_) => "load_level",
            WasherEvent::Tone { .. } => "tone",
        }
    }
}
