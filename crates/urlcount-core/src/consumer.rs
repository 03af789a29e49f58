//! Result consumer: drain results, report each, accumulate the total.

use crate::pool::JobResult;

/// Accumulated output of a drained result stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Sum of counts over all results.
    pub total: u64,
    /// Number of results seen.
    pub results: usize,
}

/// Read every result until the stream ends, calling `report` for each.
pub fn consume<I, F>(results: I, mut report: F) -> Tally
where
    I: IntoIterator<Item = JobResult>,
    F: FnMut(&JobResult),
{
    let mut tally = Tally::default();
    for result in results {
        report(&result);
        tally.total += result.count;
        tally.results += 1;
    }
    tally
}
