//! Fuzzy-min learning and the running vigilance history.

/// Commits an accepted prototype toward the current input:
/// `w' = L * min(a, w) + (1 - L) * w`.
///
/// Uses the same half-by-half alignment as the resonance computation.
/// Positions without a counterpart in the input decay toward zero at rate
/// `L`; the prototype never changes length.
#[derive(Debug, Clone, Copy)]
pub struct WeightUpdater {
    pub learning_fraction: f32,
    pub complement_coding: bool,
}

impl WeightUpdater {
    #[inline]
    fn learn(&self, a: f32, w: f32) -> f32 {
        self.learning_fraction * a.min(w) + (1.0 - self.learning_fraction) * w
    }

    #[inline]
    fn decay(&self, w: f32) -> f32 {
        (1.0 - self.learning_fraction) * w
    }

    pub fn apply(&self, prototype: &mut [f32], f1: &[f32]) {
        let p_len = prototype.len();
        let half_a = f1.len() / 2;
        let half_p = p_len / 2;

        if !self.complement_coding {
            for (x, w) in prototype.iter_mut().enumerate() {
                *w = match f1.get(x) {
                    Some(&a) => self.learn(a, *w),
                    None => self.decay(*w),
                };
            }
            return;
        }

        if p_len > f1.len() {
            for x in 0..p_len {
                let w = prototype[x];
                prototype[x] = if x < half_a {
                    self.learn(f1[x], w)
                } else if x < half_p {
                    self.decay(w)
                } else if half_a + (x - half_p) < f1.len() {
                    self.learn(f1[half_a + (x - half_p)], w)
                } else {
                    w
                };
            }
        } else {
            for x in 0..p_len {
                let ai = if x < half_p { x } else { half_a + (x - half_p) };
                let a = f1.get(ai).copied().unwrap_or(0.0);
                prototype[x] = self.learn(a, prototype[x]);
            }
        }
    }
}

/// Bounded circular buffer of resonances observed at commit time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VigilanceHistory {
    capacity: usize,
    cursor: usize,
    values: Vec<f32>,
}

impl VigilanceHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            cursor: 0,
            values: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn from_parts(capacity: usize, cursor: usize, values: Vec<f32>) -> Self {
        Self {
            capacity,
            cursor,
            values,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    /// Shrinking drops the newest-indexed entries beyond the new capacity.
    pub fn set_capacity(&mut self, capacity: usize) {
        if self.capacity > capacity {
            self.values.truncate(capacity);
        }
        if self.cursor >= capacity {
            self.cursor = 0;
        }
        self.capacity = capacity;
    }

    /// Append, overwriting the oldest slot once the buffer is full. A
    /// disabled history records nothing.
    pub fn push(&mut self, value: f32) {
        if self.capacity == 0 {
            return;
        }
        if self.values.len() <= self.cursor {
            self.values.push(value);
        } else {
            self.values[self.cursor] = value;
        }
        self.cursor += 1;
        if self.cursor >= self.capacity {
            self.cursor = 0;
        }
    }

    /// Mean of the recorded values; `fallback` while the mean is zero.
    pub fn average(&self, fallback: f32) -> f32 {
        if self.values.is_empty() {
            return fallback;
        }
        let avg = self.values.iter().sum::<f32>() / self.values.len() as f32;
        if avg == 0.0 {
            fallback
        } else {
            avg
        }
    }
}
