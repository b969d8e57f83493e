//! Frame-count arithmetic under the `1 + 4k` VAE rule.

/// Largest window the model generates in one sampler pass.
pub const MAX_GENERATION_FRAMES: i64 = 81;

/// Smallest context overlap between consecutive stages before rounding.
pub const DEFAULT_MIN_CONTEXT: i64 = 9;

const TEMPORAL_COMPRESSION: i64 = 4;

/// Largest valid frame count representable as `i64`.
pub const MAX_VALID_FRAME_COUNT: i64 = i64::MAX - 2;

/// Returns true when `n` survives VAE encode/decode unchanged.
pub fn is_valid_frame_count(n: i64) -> bool {
    n >= 1 && (n - 1) % TEMPORAL_COMPRESSION == 0
}

/// Smallest valid frame count `>= n`; `1` for anything below 1.
///
/// Saturates at [`MAX_VALID_FRAME_COUNT`] for `n` above it.
pub fn next_valid_frame_count(n: i64) -> i64 {
    if n < 1 {
        return 1;
    }
    let offset = n - 1;
    let steps = offset / TEMPORAL_COMPRESSION + i64::from(offset % TEMPORAL_COMPRESSION != 0);
    steps
        .checked_mul(TEMPORAL_COMPRESSION)
        .and_then(|frames| frames.checked_add(1))
        .unwrap_or(MAX_VALID_FRAME_COUNT)
}

/// Smallest valid context length `>= min_context`.
pub fn min_valid_context(min_context: i64) -> i64 {
    next_valid_frame_count(min_context)
}

/// Number of latent frames a clip of `n` frames encodes to.
pub fn latent_frame_count(n: i64) -> i64 {
    if n < 1 {
        return 0;
    }
    (n - 1) / TEMPORAL_COMPRESSION + 1
}
