//! Numeric helpers applied to the samples of one segment.

use crate::raster::RasterWindow;
use geo::geometry::Coord;
use serde::Deserialize;
use std::f64::consts::PI;

/// Weighting used by [`smooth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// Raised cosine.
    #[default]
    Hanning,

    /// Moving average.
    Flat,
}

impl Window {
    /// Returns `len` weights normalized to sum to one.
    fn weights(self, len: usize) -> Vec<f64> {
        let raw: Vec<f64> = match (self, len) {
            (Self::Flat, _) | (Self::Hanning, 1) => vec![1.0; len],
            (Self::Hanning, _) => {
                #[allow(clippy::cast_precision_loss)]
                let m = (len - 1) as f64;
                (0..len)
                    .map(|n| {
                        #[allow(clippy::cast_precision_loss)]
                        let n = n as f64;
                        0.5 - 0.5 * (2.0 * PI * n / m).cos()
                    })
                    .collect()
            }
        };
        let sum: f64 = raw.iter().sum();
        raw.into_iter().map(|w| w / sum).collect()
    }
}

/// Replaces voids (`NaN`) by linear interpolation between the nearest
/// valid samples on either side.
///
/// Leading and trailing voids take the value of the nearest valid
/// sample. Returns `false`, leaving `samples` untouched, if there is no
/// valid sample at all.
pub fn fill_voids(samples: &mut [f64]) -> bool {
    let mut prev: Option<usize> = None;
    for idx in 0..samples.len() {
        if samples[idx].is_nan() {
            continue;
        }
        match prev {
            None => {
                let value = samples[idx];
                samples[..idx].fill(value);
            }
            Some(p) if idx > p + 1 => {
                let (from, to) = (samples[p], samples[idx]);
                #[allow(clippy::cast_precision_loss)]
                let span = (idx - p) as f64;
                for k in (p + 1)..idx {
                    #[allow(clippy::cast_precision_loss)]
                    let t = (k - p) as f64 / span;
                    samples[k] = from + t * (to - from);
                }
            }
            Some(_) => (),
        }
        prev = Some(idx);
    }
    match prev {
        Some(last) => {
            let value = samples[last];
            samples[last + 1..].fill(value);
            true
        }
        None => false,
    }
}

/// Smooths `samples` with a centered moving window of `window_len`.
///
/// Both ends are padded with point reflections of the signal
/// (`2 * x[0] - x[k]`) so the window keeps its width at the edges.
/// Sequences not longer than the window are returned unchanged.
pub fn smooth(samples: &[f64], window_len: usize, window: Window) -> Vec<f64> {
    let n = samples.len();
    if window_len < 2 || n <= window_len {
        return samples.to_vec();
    }

    let (first, last) = (samples[0], samples[n - 1]);
    let padded: Vec<f64> = samples[..window_len]
        .iter()
        .rev()
        .map(|x| 2.0 * first - x)
        .chain(samples.iter().copied())
        .chain(
            samples[n + 1 - window_len..]
                .iter()
                .rev()
                .map(|x| 2.0 * last - x),
        )
        .collect();

    let weights = window.weights(window_len);
    let half = (window_len - 1) / 2;
    (0..n)
        .map(|i| {
            let center = window_len + i + half;
            let x = samples[i];
            x + weights
                .iter()
                .enumerate()
                .map(|(k, w)| w * (padded[center - k] - x))
                .sum::<f64>()
        })
        .collect()
}

/// Samples `window` at every coordinate with bilinear interpolation.
///
/// Coordinates outside the window are clamped onto its edge. A void
/// contributing to a sample makes that sample void.
pub fn sample_bilinear(window: &RasterWindow, coords: &[Coord<f64>]) -> Vec<f64> {
    let grid = window.grid();
    coords
        .iter()
        .map(|&coord| {
            let (col, row) = window.index(coord);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (c0, r0) = (col.floor() as usize, row.floor() as usize);
            let (c1, r1) = ((c0 + 1).min(grid.cols() - 1), (r0 + 1).min(grid.rows() - 1));
            #[allow(clippy::cast_precision_loss)]
            let (fc, fr) = (col - c0 as f64, row - r0 as f64);

            let at = |c: usize, r: usize| f64::from(grid.get(c, r));
            let top = lerp(at(c0, r0), || at(c1, r0), fc);
            lerp(top, || lerp(at(c0, r1), || at(c1, r1), fc), fr)
        })
        .collect()
}

/// Interpolates from `a` towards `b`, only evaluating `b` when `t`
/// gives it weight.
fn lerp(a: f64, b: impl FnOnce() -> f64, t: f64) -> f64 {
    if t > 0.0 {
        a + t * (b() - a)
    } else {
        a
    }
}

/// Rounds `value` to the nearest multiple of `base`, ties to the even
/// multiple.
pub fn round_to_base(value: f64, base: f64) -> i32 {
    let rounded = if base > 0.0 {
        base * (value / base).round_ties_even()
    } else {
        value.round_ties_even()
    };
    #[allow(clippy::cast_possible_truncation)]
    {
        rounded as i32
    }
}

/// Returns accumulated `(ascent, descent)` over `samples`.
///
/// Local extrema are pivot candidates; a candidate is accepted once it
/// differs from the previous pivot by more than `accuracy`, which keeps
/// sampling noise out of the sums. The last sample is always folded in.
/// Both sums are rounded to multiples of `rounding_base`. Voids are
/// skipped, so fill them first.
pub fn ascent_descent(samples: &[f64], accuracy: f64, rounding_base: f64) -> (i32, i32) {
    let valid: Vec<f64> = samples.iter().copied().filter(|s| !s.is_nan()).collect();
    let (Some(&first), Some(&last)) = (valid.first(), valid.last()) else {
        return (0, 0);
    };

    let mut pivot = first;
    let (mut ascent, mut descent) = (0.0, 0.0);
    let mut fold = |height: f64, pivot: &mut f64| {
        let diff = height - *pivot;
        if diff.abs() > accuracy {
            if diff > 0.0 {
                ascent += diff;
            } else {
                descent -= diff;
            }
            *pivot = height;
        }
    };

    for triple in valid.windows(3) {
        let (prev, height, next) = (triple[0], triple[1], triple[2]);
        if (prev < height && height > next) || (prev > height && height < next) {
            fold(height, &mut pivot);
        }
    }
    fold(last, &mut pivot);

    (
        round_to_base(ascent, rounding_base),
        round_to_base(descent, rounding_base),
    )
}
