//! Signal conditioning: repeated raw samples in, one averaged reading out.
//!
//! Two flavours share the same rules:
//! - [`average`] blocks on a [`Clock`] between samples, for one-off reads.
//! - [`Conditioner`] takes one sample per due tick so the control loop never
//!   blocks; a [`Frame`] is produced once every channel has been sampled
//!   `samples_per_frame` times.
//!
//! A failed read is replaced by the last value that channel produced. A
//! channel that has never produced a value is reported as unavailable (`None`).

use std::time::Duration;

use washer_traits::{AnalogChannel, AnalogSource, Clock};

use crate::config::TimingCfg;
use crate::hw_error::{Seam, map_hw_error};

const CHANNELS: usize = AnalogChannel::ALL.len();

/// Mean accumulator for one channel.
#[derive(Debug, Clone, Default)]
pub struct Averager {
    sum: f32,
    count: usize,
}

impl Averager {
    pub fn push(&mut self, v: f32) {
        self.sum += v;
        self.count += 1;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Mean of the pushed samples, `None` when nothing was pushed.
    pub fn mean(&self) -> Option<f32> {
        (self.count > 0).then(|| self.sum / self.count as f32)
    }

    pub fn reset(&mut self) {
        self.sum = 0.0;
        self.count = 0;
    }
}

/// Options for a blocking [`average`] call.
#[derive(Debug, Clone, Copy)]
pub struct AverageOpts {
    pub samples: usize,
    pub scale: f32,
    pub inter_sample_delay: Duration,
}

impl Default for AverageOpts {
    fn default() -> Self {
        Self {
            samples: 5,
            scale: 1.0,
            inter_sample_delay: Duration::from_millis(5),
        }
    }
}

/// Average `opts.samples` scaled readings of `channel`, sleeping on `clock`
/// after each sample.
///
/// Failed reads reuse the previous good sample of this call, falling back to
/// `last_known` (already scaled). Returns `None` when no value was ever
/// available.
pub fn average<A, C>(
    source: &mut A,
    channel: AnalogChannel,
    opts: AverageOpts,
    clock: &C,
    last_known: Option<f32>,
) -> Option<f32>
where
    A: AnalogSource + ?Sized,
    C: Clock + ?Sized,
{
    let mut acc = Averager::default();
    let mut last = last_known;
    for _ in 0..opts.samples.max(1) {
        match source.read_normalized(channel) {
            Ok(v) => {
                let scaled = v * opts.scale;
                last = Some(scaled);
                acc.push(scaled);
            }
            Err(e) => {
                tracing::debug!(
                    channel = channel.name(),
                    error = %map_hw_error(e.as_ref(), Seam::Input),
                    "sample failed; reusing last value"
                );
                if let Some(v) = last {
                    acc.push(v);
                }
            }
        }
        clock.sleep(opts.inter_sample_delay);
    }
    acc.mean()
}

/// One conditioned reading per analog channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    values: [Option<f32>; CHANNELS],
}

impl Frame {
    /// Averaged normalized value of `channel`, `None` when unavailable.
    pub fn get(&self, channel: AnalogChannel) -> Option<f32> {
        self.values[channel.index()]
    }

    /// Frame with fixed values; channels not listed are unavailable.
    pub fn from_values(values: &[(AnalogChannel, f32)]) -> Self {
        let mut f = Frame::default();
        for (ch, v) in values {
            f.values[ch.index()] = Some(*v);
        }
        f
    }
}

/// Non-blocking frame builder driven by the controller tick.
#[derive(Debug)]
pub struct Conditioner {
    samples_per_frame: usize,
    sample_interval_ms: u64,
    frame_interval_ms: u64,
    acc: [Averager; CHANNELS],
    last_known: [Option<f32>; CHANNELS],
    failing: [bool; CHANNELS],
    taken: usize,
    next_due_ms: u64,
}

impl Conditioner {
    pub fn new(timing: &TimingCfg) -> Self {
        Self {
            samples_per_frame: timing.samples_per_frame.max(1),
            sample_interval_ms: timing.sample_interval_ms,
            frame_interval_ms: timing.frame_interval_ms,
            acc: Default::default(),
            last_known: [None; CHANNELS],
            failing: [false; CHANNELS],
            taken: 0,
            next_due_ms: 0,
        }
    }

    /// Drop any partial frame and start a new one at `now_ms`.
    /// Last-known values survive.
    pub fn restart(&mut self, now_ms: u64) {
        for a in &mut self.acc {
            a.reset();
        }
        self.taken = 0;
        self.next_due_ms = now_ms;
    }

    /// Time at which the next sample is due.
    pub fn next_due_ms(&self) -> u64 {
        self.next_due_ms
    }

    /// Samples collected towards the current frame.
    pub fn pending_samples(&self) -> usize {
        self.taken
    }

    /// Take one sample of every channel if one is due; return the frame once
    /// it is complete.
    pub fn poll<A: AnalogSource + ?Sized>(&mut self, source: &mut A, now_ms: u64) -> Option<Frame> {
        if now_ms < self.next_due_ms {
            return None;
        }
        for ch in AnalogChannel::ALL {
            self.sample(source, ch);
        }
        self.taken += 1;

        if self.taken < self.samples_per_frame {
            self.next_due_ms = now_ms.saturating_add(self.sample_interval_ms);
            return None;
        }

        let mut frame = Frame::default();
        for ch in AnalogChannel::ALL {
            let i = ch.index();
            frame.values[i] = self.acc[i].mean();
            self.acc[i].reset();
        }
        self.taken = 0;
        self.next_due_ms = now_ms.saturating_add(self.frame_interval_ms);
        tracing::trace!(?frame, "frame complete");
        Some(frame)
    }

    fn sample<A: AnalogSource + ?Sized>(&mut self, source: &mut A, ch: AnalogChannel) {
        let i = ch.index();
        match source.read_normalized(ch) {
            Ok(v) => {
                if self.failing[i] {
                    tracing::info!(channel = ch.name(), "sensor recovered");
                    self.failing[i] = false;
                }
                self.last_known[i] = Some(v);
                self.acc[i].push(v);
            }
            Err(e) => {
                if !self.failing[i] {
                    tracing::warn!(
                        channel = ch.name(),
                        error = %map_hw_error(e.as_ref(), Seam::Input),
                        "sensor read failed; using last known value"
                    );
                    self.failing[i] = true;
                }
                if let Some(v) = self.last_known[i] {
                    self.acc[i].push(v);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use washer_hardware::SimulatedPanel;
    use washer_traits::ManualClock;

    #[test]
    fn averager_mean() {
        let mut a = Averager::default();
        assert_eq!(a.mean(), None);
        for v in [1.0, 2.0, 3.0, 4.0] {
            a.push(v);
        }
        assert_eq!(a.len(), 4);
        assert_eq!(a.mean(), Some(2.5));
        a.reset();
        assert!(a.is_empty());
    }

    #[test]
    fn blocking_average_scales_and_sleeps() {
        let mut panel = SimulatedPanel::new();
        panel.handle().set(AnalogChannel::Light, 0.5);
        let clock = ManualClock::new();
        let epoch = clock.now();
        let opts = AverageOpts {
            scale: 100.0,
            ..AverageOpts::default()
        };
        let v = average(&mut panel, AnalogChannel::Light, opts, &clock, None).unwrap();
        assert!((v - 50.0).abs() < 1e-4);
        assert_eq!(clock.ms_since(epoch), 25);
    }

    #[test]
    fn blocking_average_ripple_cancels() {
        let mut panel = SimulatedPanel::new();
        let h = panel.handle();
        h.set(AnalogChannel::Load, 0.5);
        h.set_ripple(0.1);
        let opts = AverageOpts {
            samples: 4,
            ..AverageOpts::default()
        };
        let v = average(&mut panel, AnalogChannel::Load, opts, &ManualClock::new(), None).unwrap();
        assert!((v - 0.5).abs() < 1e-5);
    }

    #[test]
    fn blocking_average_without_any_value_is_unavailable() {
        let mut panel = SimulatedPanel::new();
        panel.handle().set_failing(AnalogChannel::Load, true);
        let clock = ManualClock::new();
        let opts = AverageOpts::default();
        assert_eq!(average(&mut panel, AnalogChannel::Load, opts, &clock, None), None);
        let v = average(&mut panel, AnalogChannel::Load, opts, &clock, Some(0.4)).unwrap();
        assert!((v - 0.4).abs() < 1e-6);
    }

    #[test]
    fn conditioner_emits_after_full_frame_then_rests() {
        let timing = TimingCfg::default();
        let mut c = Conditioner::new(&timing);
        let mut panel = SimulatedPanel::new();
        panel.handle().set(AnalogChannel::Load, 0.42);

        let mut now = 0;
        for _ in 0..4 {
            assert!(c.poll(&mut panel, now).is_none());
            now += timing.sample_interval_ms;
        }
        let frame = c.poll(&mut panel, now).expect("fifth sample completes frame");
        assert!((frame.get(AnalogChannel::Load).unwrap() - 0.42).abs() < 1e-6);
        assert_eq!(c.next_due_ms(), now + timing.frame_interval_ms);
        // Resting: not due yet.
        assert!(c.poll(&mut panel, now + 5).is_none());
        assert_eq!(c.pending_samples(), 0);
    }

    #[test]
    fn conditioner_substitutes_last_known_value() {
        let timing = TimingCfg {
            samples_per_frame: 2,
            ..TimingCfg::default()
        };
        let mut c = Conditioner::new(&timing);
        let mut panel = SimulatedPanel::new();
        let h = panel.handle();
        h.set(AnalogChannel::Load, 0.6);
        assert!(c.poll(&mut panel, 0).is_none());
        h.set_failing(AnalogChannel::Load, true);
        let f = c.poll(&mut panel, 5).unwrap();
        assert!((f.get(AnalogChannel::Load).unwrap() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn never_read_channel_is_unavailable() {
        let timing = TimingCfg {
            samples_per_frame: 1,
            ..TimingCfg::default()
        };
        let mut c = Conditioner::new(&timing);
        let mut panel = SimulatedPanel::new();
        panel.handle().set_failing(AnalogChannel::WaterTemperature, true);
        let f = c.poll(&mut panel, 0).unwrap();
        assert_eq!(f.get(AnalogChannel::WaterTemperature), None);
        assert!(f.get(AnalogChannel::Light).is_some());
    }
}
