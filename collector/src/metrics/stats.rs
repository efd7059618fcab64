//! Order statistics over an ascending slice.

/// Middle element for odd lengths, mean of the two central elements for even
/// lengths.
pub fn median(sorted: &[f64]) -> Option<f64> {
    let len = sorted.len();
    if len == 0 {
        return None;
    }
    let half = len / 2;
    if len % 2 == 0 {
        Some((sorted[half - 1] + sorted[half]) / 2.0)
    } else {
        Some(sorted[half])
    }
}

/// Nearest-rank percentile: the element at 1-based rank `ceil(n * p)`, with the
/// rank clamped to `[1, n]`.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let len = sorted.len();
    if len == 0 {
        return None;
    }
    // `as` saturates, so NaN and negative ranks land on 0 before clamping.
    let rank = ((len as f64) * p).ceil() as usize;
    Some(sorted[rank.clamp(1, len) - 1])
}
