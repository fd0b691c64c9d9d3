//! Exponential backoff with symmetric jitter.

use std::time::Duration;

use rand::Rng;

/// Un-jittered delay before retry number `attempt` (1-based).
///
/// `min(2^(attempt - 1) * base, cap)`; zero for `attempt == 0`.
pub fn base_delay(attempt: u32, base: Duration, cap: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }
    let exp = (attempt - 1).min(31);
    base.saturating_mul(1u32 << exp).min(cap)
}

/// Jittered delay before retry number `attempt`.
///
/// A uniform offset in `[-base/2, +base/2)` is added to [`base_delay`].
pub fn jittered_delay<R: Rng + ?Sized>(
    attempt: u32,
    base: Duration,
    cap: Duration,
    rng: &mut R,
) -> Duration {
    let base = base_delay(attempt, base, cap);
    let nanos = u64::try_from(base.as_nanos()).unwrap_or(u64::MAX);
    if nanos == 0 {
        return Duration::ZERO;
    }
    let offset = rng.gen_range(0..nanos);
    // base + (offset - base/2), never below zero since offset >= 0.
    Duration::from_nanos((nanos - nanos / 2).saturating_add(offset))
}
