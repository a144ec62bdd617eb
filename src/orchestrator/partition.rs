use crate::args::PositiveUsize;

/// Splits `total` workers into shares of at most `max`.
///
/// Full shares come first; only the last one may be smaller.
#[must_use]
pub fn partition_concurrency(total: usize, max: PositiveUsize) -> Vec<usize> {
    let max = max.get();
    let mut shares = Vec::new();
    let mut remaining = total;
    while remaining > 0 {
        let share = remaining.min(max);
        shares.push(share);
        remaining = remaining.saturating_sub(share);
    }
    shares
}
