//! Integer range helpers shared by the mappers.

/// Linearly re-map `x` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// Integer arithmetic, truncating toward zero, no clamping. Inverted output
/// ranges (`out_min > out_max`) are allowed. A degenerate input range maps
/// everything to `out_min`.
pub fn map_range(x: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    if in_max == in_min {
        return out_min;
    }
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Clamp `x` into `[lo, hi]`, tolerating `lo > hi` by swapping.
pub fn constrain(x: i32, lo: i32, hi: i32) -> i32 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    x.clamp(lo, hi)
}
