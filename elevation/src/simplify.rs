//! Adaptive point reduction for per-way profiles.

/// Returns the indices of the samples to keep.
///
/// Walks forward from the last kept sample (the pivot) and keeps a new
/// one when
///
/// - the straight line from the pivot to the candidate strays more than
///   `max_deviation` from any sample in between, in which case the
///   previous candidate is kept,
/// - the candidate lies `max_span` or further from the pivot, or
/// - the candidate is the final sample.
///
/// `positions` must be non-decreasing and as long as `elevations`.
pub fn adaptive_pivots(
    positions: &[f64],
    elevations: &[f64],
    max_deviation: f64,
    max_span: f64,
) -> Vec<usize> {
    debug_assert_eq!(positions.len(), elevations.len());
    let len = positions.len().min(elevations.len());
    if len == 0 {
        return Vec::new();
    }

    let mut pivots = vec![0];
    let mut pivot = 0;
    let mut candidate = 1;
    while candidate < len {
        if candidate > pivot + 1
            && deviation(positions, elevations, pivot, candidate) > max_deviation
        {
            pivot = candidate - 1;
            pivots.push(pivot);
            continue;
        }
        if candidate == len - 1 || positions[candidate] - positions[pivot] >= max_span {
            pivot = candidate;
            pivots.push(pivot);
        }
        candidate += 1;
    }
    pivots
}

/// Largest distance between the samples strictly between `from` and
/// `to` and the straight line joining those two samples.
fn deviation(positions: &[f64], elevations: &[f64], from: usize, to: usize) -> f64 {
    let (start, end) = (elevations[from], elevations[to]);
    let span = positions[to] - positions[from];
    #[allow(clippy::cast_precision_loss)]
    let steps = (to - from) as f64;
    ((from + 1)..to)
        .map(|k| {
            #[allow(clippy::cast_precision_loss)]
            let t = if span > 0.0 {
                (positions[k] - positions[from]) / span
            } else {
                (k - from) as f64 / steps
            };
            (elevations[k] - (start + t * (end - start))).abs()
        })
        .fold(0.0, f64::max)
}
