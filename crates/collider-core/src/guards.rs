//! Numeric guards applied to rendered samples.

/// Magnitudes below this are treated as zero.
pub const GREMLIN_THRESHOLD: f32 = 1e-6;

/// NaN and near-zero values become exactly 0, keeping recursive filters out
/// of the subnormal range.
#[inline]
pub fn zap_gremlins(a: f32) -> f32 {
    if a.is_nan() || a.abs() < GREMLIN_THRESHOLD {
        0.0
    } else {
        a
    }
}

/// For denominators: near-zero values move out to `±GREMLIN_THRESHOLD`,
/// keeping their sign. Zero itself becomes the positive bound.
#[inline]
pub fn avoid_zero(a: f32) -> f32 {
    if a < 0.0 {
        if -GREMLIN_THRESHOLD < a {
            return -GREMLIN_THRESHOLD;
        }
    } else if a < GREMLIN_THRESHOLD {
        return GREMLIN_THRESHOLD;
    }
    a
}

pub fn zap_buffer(out: &mut [f32]) {
    for sample in out.iter_mut() {
        *sample = zap_gremlins(*sample);
    }
}
