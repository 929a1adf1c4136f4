//! Quorum arithmetic for daily proof verification.
//!
//! Everything here is a pure function over stored vote counts, so the
//! verification outcome of a submission can always be recomputed and never
//! diverges from the votes behind it.

/// Length of one challenge day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Basis-point denominator (100%).
pub const MAX_BPS: u16 = 10_000;

/// Returns the day index of `now` relative to `start_time`, or `None`
/// before the pool starts.
#[must_use]
pub fn day_index(now: i64, start_time: i64) -> Option<u64> {
    let elapsed = now.checked_sub(start_time)?;
    if elapsed < 0 {
        return None;
    }
    u64::try_from(elapsed / SECONDS_PER_DAY).ok()
}

/// Minimum approvals a submission needs in a pool of `participant_count`.
///
/// The submitter is excluded from the voting population, and the
/// fractional requirement is rounded up so partial support never passes.
#[must_use]
pub fn required_yes_votes(quorum_bps: u16, participant_count: u64) -> u64 {
    let voters = u128::from(participant_count.saturating_sub(1));
    let scaled = u128::from(quorum_bps).saturating_mul(voters);
    let required = scaled.div_ceil(u128::from(MAX_BPS));
    u64::try_from(required).unwrap_or(u64::MAX)
}

/// Verification rule: quorum reached and approvals outnumber rejections.
#[must_use]
pub const fn is_verified(yes_votes: u64, no_votes: u64, required: u64) -> bool {
    yes_votes >= required && yes_votes > no_votes
}
