//! Position index helpers.
//!
//! Ranks are plain integers, not fractional or lexicographic keys. New
//! entities append at `max + 1` (or `0` in an empty collection) and the
//! index is never renumbered or compacted, so ranks grow sparse over
//! time. Ordering is always derived with a stable ascending sort on the
//! rank; equal ranks may exist transiently during a reorder.

/// Returns the rank for an entity appended after the given existing ranks.
///
/// `max + 1` of the existing ranks, or `0` when there are none. Saturates
/// at `i64::MAX` so a hostile rank near the top of the range cannot wrap
/// an append to the front.
#[must_use]
pub fn append_position<I>(existing: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    existing
        .into_iter()
        .max()
        .map_or(0, |max| max.saturating_add(1))
}
