//! Reporting throttles. Never used to gate safety decisions.

/// True when nothing was reported yet or `new` moved at least `threshold`
/// away from `prev`.
#[inline]
pub fn is_significant(new: f32, prev: Option<f32>, threshold: f32) -> bool {
    match prev {
        None => true,
        Some(p) => (new - p).abs() >= threshold,
    }
}

/// Last reported value of one quantity.
#[derive(Debug, Clone)]
pub struct ChangeGate {
    last: Option<f32>,
    threshold: f32,
}

impl ChangeGate {
    pub fn new(threshold: f32) -> Self {
        Self {
            last: None,
            threshold,
        }
    }

    pub fn is_significant(&self, v: f32) -> bool {
        is_significant(v, self.last, self.threshold)
    }

    pub fn record(&mut self, v: f32) {
        self.last = Some(v);
    }

    /// Check and, when significant, record `v`.
    pub fn observe(&mut self, v: f32) -> bool {
        let hit = self.is_significant(v);
        if hit {
            self.record(v);
        }
        hit
    }

    pub fn last(&self) -> Option<f32> {
        self.last
    }

    /// Forget the last report; the next observation is significant again.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Quantities reported together: any significant member reports and records
/// all of them.
#[derive(Debug, Clone)]
pub struct GateGroup<const N: usize> {
    gates: [ChangeGate; N],
}

impl<const N: usize> GateGroup<N> {
    pub fn new(thresholds: [f32; N]) -> Self {
        Self {
            gates: thresholds.map(ChangeGate::new),
        }
    }

    /// Unavailable members (`None`) neither trigger a report nor overwrite
    /// their last reported value.
    pub fn observe(&mut self, values: [Option<f32>; N]) -> bool {
        let hit = self
            .gates
            .iter()
            .zip(values.iter())
            .any(|(g, v)| v.is_some_and(|v| g.is_significant(v)));
        if hit {
            for (g, v) in self.gates.iter_mut().zip(values) {
                if let Some(v) = v {
                    g.record(v);
                }
            }
        }
        hit
    }

    pub fn reset(&mut self) {
        for g in &mut self.gates {
            g.reset();
        }
    }
}
