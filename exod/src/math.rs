//! Small numeric helpers.

/// Median of `data`, reordering it in place. Even lengths average the two
/// middle values. Returns NaN for an empty slice.
pub fn median_f64_mut(data: &mut [f64]) -> f64 {
    let len = data.len();
    if len == 0 {
        return f64::NAN;
    }

    let mid = len / 2;
    let (lower, upper, _) = data.select_nth_unstable_by(mid, f64::total_cmp);
    let upper = *upper;
    if len % 2 == 1 {
        upper
    } else {
        let lower_max = lower.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (lower_max + upper) / 2.0
    }
}
