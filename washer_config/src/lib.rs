#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and scenario parsing for the washer controller.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//!   Every section is optional; defaults reproduce the stock firmware.
//! - Scenario CSV loader enforces headers and ordering so a scripted run is
//!   reproducible tick for tick.
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Timing {
    /// Spacing between the averaged samples of one frame (ms).
    pub sample_interval_ms: u64,
    /// Samples averaged into one conditioned reading.
    pub samples_per_frame: usize,
    /// Rest between two sensor frames (ms).
    pub frame_interval_ms: u64,
    /// Button polling period while the machine is off (ms).
    pub off_poll_ms: u64,
    /// Real-time length of one ten-minute countdown step (ms).
    pub countdown_step_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            sample_interval_ms: 5,
            samples_per_frame: 5,
            frame_interval_ms: 100,
            off_poll_ms: 500,
            countdown_step_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Reporting {
    /// Minimum change in normalized load before it is reported again.
    pub load_threshold: f32,
    /// Minimum change in light level (percent).
    pub light_threshold_pct: f32,
    /// Minimum change in water temperature (°C).
    pub temperature_threshold_c: f32,
    pub rpm_threshold: u32,
    pub temperature_setting_threshold: u32,
    pub duration_threshold_min: u32,
}

impl Default for Reporting {
    fn default() -> Self {
        Self {
            load_threshold: 0.05,
            light_threshold_pct: 15.0,
            temperature_threshold_c: 5.0,
            rpm_threshold: 50,
            temperature_setting_threshold: 5,
            duration_threshold_min: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Safety {
    /// Door is considered open above this light level (percent).
    pub door_open_light_pct: f32,
    /// Load above this fraction of full scale is an overload.
    pub overload_threshold: f32,
    /// Consecutive consistent frames required to flip the door state.
    pub debounce_count: u32,
}

impl Default for Safety {
    fn default() -> Self {
        Self {
            door_open_light_pct: 40.0,
            overload_threshold: 0.7,
            debounce_count: 3,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Sensors {
    /// Scale from normalized reading to raw degrees.
    pub temperature_scale: f32,
    /// Multiplicative calibration applied after scaling.
    pub temperature_calibration: f32,
}

impl Default for Sensors {
    fn default() -> Self {
        Self {
            temperature_scale: 330.0,
            temperature_calibration: 0.5,
        }
    }
}

/// What a power press does while a cycle is running.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PowerOffPolicy {
    /// Abort the countdown and power off immediately.
    #[default]
    Abort,
    /// Keep the cycle running; the press is logged and dropped.
    Ignore,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CycleCfg {
    pub power_off_while_running: PowerOffPolicy,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ToneCfg {
    pub frequency_hz: f32,
    pub duration_ms: u32,
}

impl ToneCfg {
    pub const fn new(frequency_hz: f32, duration_ms: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Alerts {
    pub power: ToneCfg,
    pub start: ToneCfg,
    pub door_warning: ToneCfg,
    pub overload: ToneCfg,
    pub overload_cleared: ToneCfg,
    pub denied: ToneCfg,
    pub already_running: ToneCfg,
    pub complete: ToneCfg,
    /// How many times the completion tone repeats.
    pub complete_repeats: u32,
    /// Silence between completion tones (ms).
    pub complete_gap_ms: u64,
}

impl Default for Alerts {
    fn default() -> Self {
        Self {
            power: ToneCfg::new(600.0, 100),
            start: ToneCfg::new(700.0, 100),
            door_warning: ToneCfg::new(700.0, 200),
            overload: ToneCfg::new(500.0, 100),
            overload_cleared: ToneCfg::new(800.0, 100),
            denied: ToneCfg::new(300.0, 500),
            already_running: ToneCfg::new(500.0, 100),
            complete: ToneCfg::new(1000.0, 200),
            complete_repeats: 3,
            complete_gap_ms: 200,
        }
    }
}

impl Alerts {
    fn named_tones(&self) -> [(&'static str, ToneCfg); 8] {
        [
            ("power", self.power),
            ("start", self.start),
            ("door_warning", self.door_warning),
            ("overload", self.overload),
            ("overload_cleared", self.overload_cleared),
            ("denied", self.denied),
            ("already_running", self.already_running),
            ("complete", self.complete),
        ]
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub timing: Timing,
    pub reporting: Reporting,
    pub safety: Safety,
    pub sensors: Sensors,
    pub cycle: CycleCfg,
    pub alerts: Alerts,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

fn non_negative(v: f32) -> bool {
    v.is_finite() && v >= 0.0
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Timing
        let t = &self.timing;
        if t.sample_interval_ms == 0 {
            eyre::bail!("timing.sample_interval_ms must be >= 1");
        }
        if t.samples_per_frame == 0 || t.samples_per_frame > 64 {
            eyre::bail!("timing.samples_per_frame must be in [1, 64]");
        }
        if t.frame_interval_ms > 60_000 {
            eyre::bail!("timing.frame_interval_ms is unreasonably large (>60s)");
        }
        if t.off_poll_ms == 0 {
            eyre::bail!("timing.off_poll_ms must be >= 1");
        }
        if t.countdown_step_ms == 0 {
            eyre::bail!("timing.countdown_step_ms must be >= 1");
        }
        if t.countdown_step_ms > 60 * 60 * 1000 {
            eyre::bail!("timing.countdown_step_ms is unreasonably large (>1h)");
        }

        // Reporting
        let r = &self.reporting;
        if !non_negative(r.load_threshold) || r.load_threshold > 1.0 {
            eyre::bail!("reporting.load_threshold must be in [0.0, 1.0]");
        }
        if !non_negative(r.light_threshold_pct) || r.light_threshold_pct > 100.0 {
            eyre::bail!("reporting.light_threshold_pct must be in [0.0, 100.0]");
        }
        if !non_negative(r.temperature_threshold_c) {
            eyre::bail!("reporting.temperature_threshold_c must be >= 0");
        }

        // Safety
        let s = &self.safety;
        if !(s.door_open_light_pct.is_finite()
            && s.door_open_light_pct > 0.0
            && s.door_open_light_pct < 100.0)
        {
            eyre::bail!("safety.door_open_light_pct must be in (0.0, 100.0)");
        }
        if !(s.overload_threshold.is_finite()
            && s.overload_threshold > 0.0
            && s.overload_threshold <= 1.0)
        {
            eyre::bail!("safety.overload_threshold must be in (0.0, 1.0]");
        }
        if s.debounce_count == 0 {
            eyre::bail!("safety.debounce_count must be >= 1");
        }
        if s.debounce_count > 1000 {
            eyre::bail!("safety.debounce_count is unreasonably large (>1000)");
        }

        // Sensors
        if !(self.sensors.temperature_scale.is_finite() && self.sensors.temperature_scale > 0.0) {
            eyre::bail!("sensors.temperature_scale must be > 0");
        }
        if !(self.sensors.temperature_calibration.is_finite()
            && self.sensors.temperature_calibration > 0.0)
        {
            eyre::bail!("sensors.temperature_calibration must be > 0");
        }

        // Alerts
        for (name, tone) in self.alerts.named_tones() {
            if !(tone.frequency_hz.is_finite() && tone.frequency_hz > 0.0) {
                eyre::bail!("alerts.{name}.frequency_hz must be > 0");
            }
            if tone.duration_ms == 0 {
                eyre::bail!("alerts.{name}.duration_ms must be >= 1");
            }
        }
        if self.alerts.complete_repeats == 0 || self.alerts.complete_repeats > 10 {
            eyre::bail!("alerts.complete_repeats must be in [1, 10]");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot}");
        }

        // Cycle: serde restricts to known policies

        Ok(())
    }
}

/// Inputs a scenario row can drive.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioInput {
    Power,
    Start,
    Rpm,
    Temperature,
    Duration,
    Load,
    Light,
    WaterTemp,
}

impl ScenarioInput {
    pub const ALL: [ScenarioInput; 8] = [
        ScenarioInput::Power,
        ScenarioInput::Start,
        ScenarioInput::Rpm,
        ScenarioInput::Temperature,
        ScenarioInput::Duration,
        ScenarioInput::Load,
        ScenarioInput::Light,
        ScenarioInput::WaterTemp,
    ];

    pub const fn is_button(self) -> bool {
        matches!(self, ScenarioInput::Power | ScenarioInput::Start)
    }

    /// Name as written in scenario files and typed at the console.
    pub const fn name(self) -> &'static str {
        match self {
            ScenarioInput::Power => "power",
            ScenarioInput::Start => "start",
            ScenarioInput::Rpm => "rpm",
            ScenarioInput::Temperature => "temperature",
            ScenarioInput::Duration => "duration",
            ScenarioInput::Load => "load",
            ScenarioInput::Light => "light",
            ScenarioInput::WaterTemp => "water_temp",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.name() == name)
    }
}

/// Scenario CSV schema.
///
/// Expected headers:
/// at_ms,input,value
///
/// Example:
/// at_ms,input,value
/// 0,power,1
/// 50,power,0
/// 600,duration,0.25
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ScenarioRow {
    pub at_ms: u64,
    pub input: ScenarioInput,
    pub value: f32,
}

/// Validated, time-ordered list of scenario steps.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    rows: Vec<ScenarioRow>,
}

impl Scenario {
    pub fn from_rows(rows: Vec<ScenarioRow>) -> eyre::Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if !row.value.is_finite() || !(0.0..=1.0).contains(&row.value) {
                eyre::bail!(
                    "scenario row {} ({:?}): value {} must be in [0, 1]",
                    i + 1,
                    row.input,
                    row.value
                );
            }
            if i > 0 && row.at_ms < rows[i - 1].at_ms {
                eyre::bail!(
                    "scenario rows must be ordered by at_ms (row {} at {} ms precedes {} ms)",
                    i + 1,
                    row.at_ms,
                    rows[i - 1].at_ms
                );
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ScenarioRow] {
        &self.rows
    }

    /// Time of the last scripted step, or 0 for an empty scenario.
    pub fn end_ms(&self) -> u64 {
        self.rows.last().map_or(0, |r| r.at_ms)
    }

    /// Parse scenario CSV text from any reader.
    pub fn from_reader<R: std::io::Read>(reader: R) -> eyre::Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        // Enforce exact headers
        let headers = rdr
            .headers()
            .map_err(|e| eyre::eyre!("read scenario headers: {}", e))?
            .clone();
        let expected = ["at_ms", "input", "value"];
        let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        if actual != expected {
            eyre::bail!(
                "scenario CSV must have headers 'at_ms,input,value', got: {}",
                actual.join(",")
            );
        }

        let mut rows = Vec::new();
        for (idx, rec) in rdr.deserialize::<ScenarioRow>().enumerate() {
            match rec {
                Ok(row) => rows.push(row),
                Err(e) => {
                    eyre::bail!("invalid scenario row {}: {}", idx + 2, e);
                }
            }
        }

        Scenario::try_from(rows)
    }
}

impl TryFrom<Vec<ScenarioRow>> for Scenario {
    type Error = eyre::Report;
    fn try_from(rows: Vec<ScenarioRow>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

pub fn load_scenario_csv(path: &std::path::Path) -> eyre::Result<Scenario> {
    let file = std::fs::File::open(path)
        .map_err(|e| eyre::eyre!("open scenario CSV {:?}: {}", path, e))?;
    Scenario::from_reader(file).map_err(|e| eyre::eyre!("{:?}: {}", path, e))
}
