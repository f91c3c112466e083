//! Daily down-sampling of the provider's 3-hour forecast.
//!
//! The provider returns samples at fixed 3-hour spacing, so every 8th sample
//! lands on the same time of day. Taking samples 0, 8, 16, 24 and 32 gives one
//! reading per day. The min/max of each entry therefore describes a single
//! 3-hour window, not the extremes of the whole day.

/// Samples per day at 3-hour spacing.
pub const SAMPLES_PER_DAY: usize = 8;

/// Upper bound on reduced entries.
pub const MAX_DAYS: usize = 5;

/// Returns the samples at offsets 0, 8, 16, ... up to [`MAX_DAYS`] entries,
/// preserving input order.
pub fn stride_daily<T>(samples: &[T]) -> impl Iterator<Item = &T> {
    samples.iter().step_by(SAMPLES_PER_DAY).take(MAX_DAYS)
}

/// Number of entries [`stride_daily`] yields for `len` samples.
pub fn reduced_len(len: usize) -> usize {
    len.div_ceil(SAMPLES_PER_DAY).min(MAX_DAYS)
}
