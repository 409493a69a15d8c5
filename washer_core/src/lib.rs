#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core washer control logic (hardware-agnostic).
//!
//! All hardware interactions go through the `washer_traits` collaborator
//! traits (`Panel` for inputs, `OutputStage` for outputs).
//!
//! ## Architecture
//!
//! - **Conditioning**: per-channel averaging into frames (`conditioner`)
//! - **Reporting**: change gates that throttle log/event noise (`change_gate`)
//! - **Debouncing**: door consistency counter and button edges (`debounce`)
//! - **Safety**: door/overload flags gating the start of a cycle (`safety`)
//! - **Load**: five-band classifier and indicator colours (`load`)
//! - **Cycle**: Off/Idle/Running lifecycle and countdown (`cycle`, `controller`)
//! - **Alerts**: non-overlapping tone schedule (`alerts`)
//!
//! Nothing in the tick blocks; timers are driven by the injected `Clock`.

pub mod alerts;
pub mod builder;
pub mod change_gate;
pub mod conditioner;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod cycle;
pub mod debounce;
pub mod error;
pub mod hw_error;
pub mod load;
pub mod mocks;
pub mod runner;
pub mod safety;
pub mod settings;
pub mod status;

pub use alerts::{AlertKind, AlertQueue, Tone};
pub use builder::{Missing, Set, Washer, WasherBuilder, WasherG, build_washer};
pub use change_gate::{ChangeGate, GateGroup, is_significant};
pub use conditioner::{AverageOpts, Averager, Conditioner, Frame, average};
pub use config::{
    AlertCfg, PowerOffPolicy, ReportingCfg, SafetyCfg, SensorCfg, TimingCfg, WasherCfg,
};
pub use controller::WasherController;
pub use cycle::{Countdown, SystemState};
pub use debounce::{ButtonLevel, Debouncer, Edge, EdgeDetector};
pub use error::{BuildError, Report, Result, WasherError};
pub use load::{LoadLevel, classify};
pub use runner::{RunSummary, run_loop};
pub use safety::{SafetyEdge, SafetyFlags, SafetyMonitor};
pub use settings::CycleSettings;
pub use status::{DenialReason, SensorReport, WasherEvent};
