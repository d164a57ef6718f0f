/// Exponential moving average over a scalar signal.
///
/// The first sample seeds the average; afterwards each update blends
/// `alpha * sample + (1 - alpha) * previous`. All detectors smooth their
/// angle signal through one of these before thresholding.
#[derive(Clone, Copy, Debug)]
pub struct Ema {
    alpha: f32,
    value: Option<f32>,
}

impl Ema {
    pub fn new(alpha: f32) -> Self {
        Self { alpha, value: None }
    }

    pub fn update(&mut self, sample: f32) -> f32 {
        let next = match self.value {
            None => sample,
            Some(prev) => self.alpha * sample + (1.0 - self.alpha) * prev,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f32> {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// Smoothed frames-per-second estimate from frame timestamps.
///
/// Instantaneous fps is blended 10/90 into the running average, matching the
/// HUD readout rather than any gating math (gating uses the host-supplied
/// fps estimate).
#[derive(Clone, Copy, Debug, Default)]
pub struct FpsMeter {
    last_ts_ns: Option<i64>,
    avg: f32,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, ts_ns: i64) -> f32 {
        let prev = self.last_ts_ns.replace(ts_ns);
        let Some(prev) = prev else {
            return 0.0;
        };
        let dt = (ts_ns - prev).max(1) as f32;
        let inst = 1e9 / dt;
        self.avg = if self.avg == 0.0 {
            inst
        } else {
            0.1 * inst + 0.9 * self.avg
        };
        self.avg
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
