/// Number of characters of a `target_len`-character string revealed at
/// `smoothed` progress.
///
/// Recomputed from scratch for every sample, so moving backwards shrinks the
/// result. Non-positive (and non-finite) progress reveals nothing; progress
/// at or beyond `threshold` reveals everything.
pub fn typed_length(smoothed: f64, threshold: f64, target_len: usize) -> usize {
    if smoothed.is_nan() || smoothed <= 0.0 {
        return 0;
    }
    if threshold.is_nan() || threshold <= 0.0 {
        return target_len;
    }

    let fraction = (smoothed / threshold).min(1.0);
    let chars = (fraction * target_len as f64).floor() as usize;
    chars.min(target_len)
}

/// The first `typed` characters of `target`, counted in chars rather than
/// bytes.
pub fn typed_text(target: &str, typed: usize) -> &str {
    match target.char_indices().nth(typed) {
        Some((end, _)) => &target[..end],
        None => target,
    }
}

#[cfg(test)]
#[path = "tests/typewriter_tests.rs"]
mod tests;
