use std::time::Duration;

/// Longest frame delta the integrators accept. Anything larger (a tab that
/// was in the background, a debugger pause) is treated as one slow frame.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(40);

pub fn clamp_frame_delta(delta: Duration) -> Duration {
    delta.min(MAX_FRAME_DELTA)
}

/// Linear map of `value` from `input` onto `output`.
///
/// With `clamp` unset the map extrapolates past both ends of the input range.
/// A zero-width input range behaves as a step at `input.0`.
pub fn interpolate(value: f64, input: (f64, f64), output: (f64, f64), clamp: bool) -> f64 {
    let (in_from, in_to) = input;
    let (out_from, out_to) = output;
    let span = in_to - in_from;
    if span == 0.0 {
        return if value <= in_from { out_from } else { out_to };
    }

    let mut t = (value - in_from) / span;
    if clamp {
        t = t.clamp(0.0, 1.0);
    }
    out_from + (out_to - out_from) * t
}

/// Wraps `value` into the range spanned by `min` and `max`. The range may be
/// given in either direction; the result always lies between the two bounds.
pub fn wrap(min: f64, max: f64, value: f64) -> f64 {
    let range = max - min;
    if range == 0.0 {
        return min;
    }
    (((value - min) % range) + range) % range + min
}
