//! Bottom-up signal from F1 to every prototype in F2.
//!
//! For each prototype `W` and (possibly complement-coded) input `A`:
//!
//! ```text
//! DEFAULT:  T = |A ^ W| + (1 - alpha)(M - |W|)     kept when T > alpha * M
//! FUZZY:    T = |A ^ W| / (alpha + |W|)            always kept
//! resonance = |A ^ W| / M
//! ```
//!
//! `^` is the component-wise minimum (fuzzy AND), `|.|` the L1 norm and `M`
//! the raw input length. Inputs may change dimensionality over time, so
//! prototypes of a different length are aligned half by half.

use crate::config::ActivationMode;
use crate::network::prototype::PrototypeStore;
use crate::PrototypeId;

/// Activity of one prototype for the current input. Lives for a single call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationRecord {
    pub id: PrototypeId,
    /// `T`, used only for ranking
    pub activation: f32,
    /// Normalized match, compared against vigilance
    pub resonance: f32,
}

/// Fill `f1` with the input, followed by its complement when enabled.
///
/// ```text
/// input: 0.9 0.2 0.3 0.4
/// F1:    0.9 0.2 0.3 0.4 0.1 0.8 0.7 0.6
/// ```
pub fn input_representation(raw: &[f32], complement_coding: bool, f1: &mut Vec<f32>) {
    f1.clear();
    f1.extend_from_slice(raw);
    if complement_coding {
        f1.extend(raw.iter().map(|x| 1.0 - x));
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResonanceEngine {
    pub mode: ActivationMode,
    pub alpha: f32,
    pub complement_coding: bool,
}

impl ResonanceEngine {
    /// Compute a record for every retained prototype into `out` (unsorted).
    ///
    /// `input_size` may grow while scanning prototypes longer than the
    /// input; the grown value applies to every prototype scanned after it.
    pub fn evaluate(
        &self,
        f1: &[f32],
        input_size: &mut f32,
        store: &PrototypeStore,
        out: &mut Vec<ActivationRecord>,
    ) {
        out.clear();

        for (id, weights) in store.iter() {
            let diff = if self.complement_coding {
                complement_match(f1, weights, input_size)
            } else {
                plain_match(f1, weights, input_size)
            };
            let sum_w: f32 = weights.iter().map(|w| w.abs()).sum();
            let m = *input_size;

            let activation = match self.mode {
                ActivationMode::Default => diff + (1.0 - self.alpha) * (m - sum_w),
                ActivationMode::Fuzzy => diff / (self.alpha + sum_w),
            };

            let retained = match self.mode {
                ActivationMode::Default => activation > self.alpha * m || !self.complement_coding,
                ActivationMode::Fuzzy => true,
            };

            if retained {
                out.push(ActivationRecord {
                    id,
                    activation,
                    resonance: diff / m,
                });
            } else {
                log::trace!("prototype {id} below signal floor: T={activation}");
            }
        }
    }
}

#[inline]
fn at(v: &[f32], i: usize) -> f32 {
    v.get(i).copied().unwrap_or(0.0)
}

/// Fuzzy intersection of complement-coded vectors of possibly different size.
///
/// Plain halves align directly, complement halves align by offset. Surplus
/// dimensions of the longer side contribute their absolute value.
fn complement_match(a: &[f32], w: &[f32], input_size: &mut f32) -> f32 {
    let mut diff = 0.0;

    if w.len() <= a.len() {
        let surplus = (a.len() - w.len()) / 2;
        for i in 0..a.len() - surplus {
            let ai = if i < w.len() / 2 {
                i
            } else {
                a.len() / 2 + (i - w.len() / 2)
            };
            diff += if i < w.len() {
                at(a, ai).min(w[i]).abs()
            } else {
                at(a, ai).abs()
            };
        }
    } else {
        let surplus = (w.len() - a.len()) / 2;
        for i in 0..w.len() - surplus {
            let wi = if i < a.len() / 2 {
                i
            } else {
                w.len() / 2 + (i - a.len() / 2)
            };
            diff += if i < a.len() {
                a[i].min(at(w, wi)).abs()
            } else {
                at(w, wi).abs()
            };
            if *input_size <= i as f32 {
                *input_size = (i + 1) as f32;
            }
        }
    }
    diff
}

/// Without complement coding the match is inverse to the L1 distance.
/// Weights beyond the input are skipped but can raise the input size.
fn plain_match(a: &[f32], w: &[f32], input_size: &mut f32) -> f32 {
    let mut distance = 0.0;
    for (i, &wi) in w.iter().enumerate() {
        if i < a.len() {
            distance += (a[i] - wi).abs();
        } else if i as f32 > *input_size {
            *input_size = i as f32;
        }
    }
    *input_size / (distance + 1.0)
}
