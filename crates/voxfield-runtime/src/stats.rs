use std::collections::VecDeque;

/// Mean of the most recent `window` samples.
#[derive(Clone, Debug)]
pub struct RollingAverage {
    samples: VecDeque<u32>,
    window: usize,
    sum: u64,
}

impl RollingAverage {
    pub fn new(window: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(window),
            window: window.max(1),
            sum: 0,
        }
    }

    pub fn push(&mut self, v: u32) {
        if self.samples.len() == self.window {
            if let Some(old) = self.samples.pop_front() {
                self.sum -= u64::from(old);
            }
        }
        self.samples.push_back(v);
        self.sum += u64::from(v);
    }

    pub fn average(&self) -> f32 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum as f32 / self.samples.len() as f32
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StreamStats {
    pub queued: usize,
    pub building: usize,
    pub light_pending: usize,
    pub light_in_flight: usize,
    pub avg_build_ms: f32,
    pub avg_light_ms: f32,
    pub columns: usize,
    pub pooled_in_use: usize,
}

impl StreamStats {
    /// Nothing queued or running.
    pub fn is_idle(&self) -> bool {
        self.queued == 0
            && self.building == 0
            && self.light_pending == 0
            && self.light_in_flight == 0
    }
}
