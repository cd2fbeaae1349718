//! URL frontier for a single site job
//!
//! This module handles:
//! - FIFO ordering of pending page fetches (breadth-first discovery order)
//! - The per-job pagination budget on listing pages
//! - Optional loop protection through a set of already-queued URLs

use crate::url::visit_key;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Role of a page in the site's link graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// Links to item pages and possibly to a next listing page
    Listing,

    /// Holds the fields of one record
    Item,
}

/// A URL queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Absolute URL to fetch
    pub url: Url,

    /// How the fetched page will be processed
    pub kind: PageKind,

    /// Number of listing-to-item hops from a seed
    pub depth: u32,
}

impl FrontierEntry {
    pub fn listing(url: Url, depth: u32) -> Self {
        Self {
            url,
            kind: PageKind::Listing,
            depth,
        }
    }

    pub fn item(url: Url, depth: u32) -> Self {
        Self {
            url,
            kind: PageKind::Item,
            depth,
        }
    }
}

/// Result of offering an entry to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,

    /// Listing entry dropped: the pagination budget is used up
    BudgetExhausted,

    /// Entry dropped: the same URL was queued earlier in this job
    AlreadySeen,
}

/// Frontier manages pending fetches and the listing budget of one job
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,

    /// Maximum number of listing fetches for the job
    max_pagination: u32,

    /// Listing fetches claimed so far
    listing_fetches: u32,

    /// Visit keys of every queued URL, when loop protection is on
    seen: Option<HashSet<String>>,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `max_pagination` - Listing fetch budget for the job
    /// * `dedupe` - Drop URLs that were already queued once
    pub fn new(max_pagination: u32, dedupe: bool) -> Self {
        Self {
            queue: VecDeque::new(),
            max_pagination,
            listing_fetches: 0,
            seen: dedupe.then(HashSet::new),
        }
    }

    /// Offers an entry to the back of the queue
    ///
    /// Listing entries are rejected once the budget is exhausted.
    pub fn push(&mut self, entry: FrontierEntry) -> PushOutcome {
        if entry.kind == PageKind::Listing && self.budget_remaining() == 0 {
            tracing::trace!("Budget exhausted, not queueing listing {}", entry.url);
            return PushOutcome::BudgetExhausted;
        }

        if let Some(seen) = self.seen.as_mut() {
            if !seen.insert(visit_key(&entry.url)) {
                tracing::trace!("Already queued: {}", entry.url);
                return PushOutcome::AlreadySeen;
            }
        }

        self.queue.push_back(entry);
        PushOutcome::Queued
    }

    /// Queues a seed listing page
    ///
    /// Seeds skip the visited check, so a seed given twice is fetched twice,
    /// but they are recorded so discovered links back to a seed are dropped.
    pub fn push_seed(&mut self, url: Url) -> PushOutcome {
        if self.budget_remaining() == 0 {
            tracing::trace!("Budget exhausted, not queueing seed {}", url);
            return PushOutcome::BudgetExhausted;
        }

        if let Some(seen) = self.seen.as_mut() {
            seen.insert(visit_key(&url));
        }

        self.queue.push_back(FrontierEntry::listing(url, 0));
        PushOutcome::Queued
    }

    /// Removes and returns the oldest entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    /// Claims one listing fetch from the budget
    ///
    /// Returns false (and claims nothing) if the budget is already used up.
    pub fn claim_listing(&mut self) -> bool {
        if self.listing_fetches >= self.max_pagination {
            return false;
        }
        self.listing_fetches += 1;
        true
    }

    /// Listing fetches still allowed for this job
    pub fn budget_remaining(&self) -> u32 {
        self.max_pagination.saturating_sub(self.listing_fetches)
    }

    /// Listing fetches claimed so far
    pub fn listing_fetches(&self) -> u32 {
        self.listing_fetches
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://example.com{}", path)).unwrap()
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::new(5, false);
        frontier.push(FrontierEntry::listing(url("/list"), 0));
        frontier.push(FrontierEntry::item(url("/a"), 1));
        frontier.push(FrontierEntry::item(url("/b"), 1));

        assert_eq!(frontier.pop().unwrap().url, url("/list"));
        assert_eq!(frontier.pop().unwrap().url, url("/a"));
        assert_eq!(frontier.pop().unwrap().url, url("/b"));
        assert!(frontier.pop().is_none());
    }

    #[test]
    fn test_claim_listing_respects_budget() {
        let mut frontier = Frontier::new(2, false);
        assert_eq!(frontier.budget_remaining(), 2);
        assert!(frontier.claim_listing());
        assert!(frontier.claim_listing());
        assert!(!frontier.claim_listing());
        assert_eq!(frontier.listing_fetches(), 2);
        assert_eq!(frontier.budget_remaining(), 0);
    }

    #[test]
    fn test_listing_push_rejected_when_budget_exhausted() {
        let mut frontier = Frontier::new(1, false);
        assert!(frontier.claim_listing());

        let outcome = frontier.push(FrontierEntry::listing(url("/list?page=2"), 0));
        assert_eq!(outcome, PushOutcome::BudgetExhausted);
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_item_push_not_budgeted() {
        let mut frontier = Frontier::new(0, false);
        assert_eq!(
            frontier.push(FrontierEntry::item(url("/a"), 1)),
            PushOutcome::Queued
        );
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_zero_budget_rejects_seed() {
        let mut frontier = Frontier::new(0, true);
        assert_eq!(
            frontier.push(FrontierEntry::listing(url("/"), 0)),
            PushOutcome::BudgetExhausted
        );
        assert!(!frontier.claim_listing());
    }

    #[test]
    fn test_dedupe_drops_repeat() {
        let mut frontier = Frontier::new(5, true);
        assert_eq!(
            frontier.push(FrontierEntry::listing(url("/list"), 0)),
            PushOutcome::Queued
        );
        assert_eq!(
            frontier.push(FrontierEntry::listing(url("/list#top"), 0)),
            PushOutcome::AlreadySeen
        );
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_dedupe_remembers_popped_entries() {
        let mut frontier = Frontier::new(5, true);
        frontier.push(FrontierEntry::item(url("/a"), 1));
        frontier.pop();
        assert_eq!(
            frontier.push(FrontierEntry::item(url("/a"), 1)),
            PushOutcome::AlreadySeen
        );
    }

    #[test]
    fn test_without_dedupe_repeats_queue() {
        let mut frontier = Frontier::new(5, false);
        frontier.push(FrontierEntry::item(url("/a"), 1));
        frontier.push(FrontierEntry::item(url("/a"), 1));
        assert_eq!(frontier.len(), 2);
    }

    #[test]
    fn test_seeds_bypass_visited_check() {
        let mut frontier = Frontier::new(5, true);
        assert_eq!(frontier.push_seed(url("/news")), PushOutcome::Queued);
        assert_eq!(frontier.push_seed(url("/news")), PushOutcome::Queued);
        assert_eq!(frontier.len(), 2);

        // A discovered link back to a seed is still dropped
        assert_eq!(
            frontier.push(FrontierEntry::listing(url("/news"), 0)),
            PushOutcome::AlreadySeen
        );
    }

    #[test]
    fn test_seed_respects_zero_budget() {
        let mut frontier = Frontier::new(0, true);
        assert_eq!(frontier.push_seed(url("/news")), PushOutcome::BudgetExhausted);
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_trailing_slash_is_distinct_page() {
        let mut frontier = Frontier::new(5, true);
        frontier.push(FrontierEntry::item(url("/news/"), 1));
        assert_eq!(
            frontier.push(FrontierEntry::item(url("/news"), 1)),
            PushOutcome::Queued
        );
    }

    #[test]
    fn test_budget_rejection_does_not_mark_seen() {
        let mut frontier = Frontier::new(1, true);
        frontier.claim_listing();
        frontier.push(FrontierEntry::listing(url("/p2"), 0));

        // A later item at the same URL is still accepted
        assert_eq!(
            frontier.push(FrontierEntry::item(url("/p2"), 1)),
            PushOutcome::Queued
        );
    }
}
