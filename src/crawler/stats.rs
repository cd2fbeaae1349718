//! Per-job crawl statistics

use std::ops::AddAssign;

/// Counters collected while driving one site job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStats {
    /// Listing pages fetched successfully
    pub listing_fetched: u32,

    /// Listing entries discarded because the pagination budget was used up
    pub listing_skipped: u32,

    /// Listing pages on which the item rule matched nothing
    pub empty_listings: u32,

    /// Item pages fetched successfully
    pub items_fetched: u32,

    /// Records handed to the consumer
    pub records_emitted: u32,

    /// Fetches that failed (network, timeout, non-2xx)
    pub fetch_failures: u32,

    /// The job was cancelled before its frontier drained
    pub cancelled: bool,
}

impl JobStats {
    /// Total fetch attempts, successful or not
    pub fn fetch_attempts(&self) -> u32 {
        self.listing_fetched + self.items_fetched + self.fetch_failures
    }
}

impl AddAssign for JobStats {
    fn add_assign(&mut self, other: Self) {
        self.listing_fetched += other.listing_fetched;
        self.listing_skipped += other.listing_skipped;
        self.empty_listings += other.empty_listings;
        self.items_fetched += other.items_fetched;
        self.records_emitted += other.records_emitted;
        self.fetch_failures += other.fetch_failures;
        self.cancelled |= other.cancelled;
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(label: &str, stats: &JobStats) {
    println!("=== {} ===", label);
    println!("  Listing pages fetched: {}", stats.listing_fetched);
    println!("  Listing pages skipped (budget): {}", stats.listing_skipped);
    println!("  Listing pages without items: {}", stats.empty_listings);
    println!("  Item pages fetched: {}", stats.items_fetched);
    println!("  Records emitted: {}", stats.records_emitted);
    println!("  Fetch failures: {}", stats.fetch_failures);

    let attempts = stats.fetch_attempts();
    let success_rate = if attempts > 0 {
        ((attempts - stats.fetch_failures) as f64 / attempts as f64) * 100.0
    } else {
        0.0
    };
    println!("  Success rate: {:.1}% of {} fetches", success_rate, attempts);

    if stats.cancelled {
        println!("  Cancelled before completion");
    }
    println!();
}
