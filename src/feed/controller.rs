//! The feed controller: query state, page cursor, and result accumulation.
//!
//! This is a pure state machine — it decides *what* to fetch and *how* to
//! merge results, while the caller owns the actual HTTP work. Completions
//! are reported back with the generation and page number they were issued
//! under, so responses from a superseded search are discarded instead of
//! overwriting newer results.

use crate::search::ImageRecord;

/// A fetch the controller wants issued.
///
/// The caller dispatches it and reports the outcome back via
/// [`FeedController::apply_page`] or [`FeedController::fail_page`], echoing
/// `generation` and `page` unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: String,
    /// 1-based page number.
    pub page: u32,
    /// Search generation this request belongs to.
    pub generation: u64,
}

/// Paginated search state over an ordered feed of image records.
///
/// Invariants:
/// - At most one fetch is outstanding at a time (`loading` guard).
/// - The cursor only advances when a page is successfully applied, so a
///   failed page is retried under the same number on the next trigger.
/// - A page shorter than `page_size` marks the result set exhausted until
///   the next search.
pub struct FeedController {
    query: String,
    /// Last successfully applied page (1 before any page has landed).
    cursor: u32,
    page_size: usize,
    records: Vec<ImageRecord>,
    loading: bool,
    exhausted: bool,
    generation: u64,
    /// Whether page 1 of the current search has been applied. Until it has,
    /// the records still belong to the previous search, so pagination must
    /// re-request page 1 (replace) rather than advance past it.
    first_page_loaded: bool,
}

impl FeedController {
    pub fn new(seed_query: impl Into<String>, page_size: usize) -> Self {
        Self {
            query: seed_query.into(),
            cursor: 1,
            page_size,
            records: Vec::new(),
            loading: false,
            exhausted: false,
            generation: 0,
            first_page_loaded: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Start a new search.
    ///
    /// Resets the cursor, bumps the generation (orphaning any in-flight
    /// fetch), and returns the page-1 request to dispatch. The feed itself
    /// is replaced when that page arrives, not cleared here — the grid keeps
    /// showing the previous results while the new ones load.
    ///
    /// An empty query is allowed; the provider simply returns nothing.
    pub fn submit_search(&mut self, query: impl Into<String>) -> PageRequest {
        self.query = query.into();
        self.cursor = 1;
        self.generation = self.generation.wrapping_add(1);
        self.exhausted = false;
        self.first_page_loaded = false;
        self.loading = true;
        tracing::debug!(query = %self.query, generation = self.generation, "New search");
        PageRequest {
            query: self.query.clone(),
            page: 1,
            generation: self.generation,
        }
    }

    /// Proximity trigger: ask for the next page.
    ///
    /// Returns `None` while a fetch is outstanding (re-entrancy guard) or
    /// after the provider has run out of results. The viewport signal can
    /// fire as often as it likes; at most one request comes out until the
    /// current one completes.
    ///
    /// While the current search's first page is still missing (it failed,
    /// and the previous search's records remain on screen), the trigger
    /// re-requests page 1 — advancing would append the new query's later
    /// pages onto the stale feed.
    pub fn next_page(&mut self) -> Option<PageRequest> {
        if self.loading || self.exhausted {
            return None;
        }
        self.loading = true;
        let page = if self.first_page_loaded {
            self.cursor + 1
        } else {
            1
        };
        Some(PageRequest {
            query: self.query.clone(),
            page,
            generation: self.generation,
        })
    }

    /// Apply a successful fetch.
    ///
    /// Page 1 replaces the feed; later pages append in arrival order with no
    /// deduplication. Responses from a superseded generation are dropped
    /// without touching any state — including the loading flag, which at
    /// that point belongs to the newer search's fetch.
    pub fn apply_page(&mut self, generation: u64, page: u32, records: Vec<ImageRecord>) {
        if generation != self.generation {
            tracing::debug!(
                stale = generation,
                current = self.generation,
                page = page,
                "Discarding superseded page response"
            );
            return;
        }

        self.loading = false;
        if records.len() < self.page_size {
            self.exhausted = true;
        }
        if page == 1 {
            self.records = records;
            self.first_page_loaded = true;
        } else {
            self.records.extend(records);
        }
        self.cursor = page;
        tracing::debug!(
            page = page,
            total = self.records.len(),
            exhausted = self.exhausted,
            "Applied page"
        );
    }

    /// Record a failed fetch.
    ///
    /// The feed and cursor are untouched, so the next proximity trigger
    /// retries the same page number. Stale-generation failures are ignored
    /// like stale successes.
    pub fn fail_page(&mut self, generation: u64, page: u32) {
        if generation != self.generation {
            return;
        }
        self.loading = false;
        tracing::debug!(page = page, "Page fetch failed, cursor unchanged");
    }

    /// Clear the loading flag after the in-flight fetch task died without
    /// reporting a result. Feed and cursor are untouched, like
    /// [`FeedController::fail_page`]; no generation check is possible
    /// because the dead task is the one that owned the flag.
    pub fn abort_loading(&mut self) {
        if self.loading {
            self.loading = false;
            tracing::warn!("Fetch task died, loading flag released");
        }
    }

    /// Insert a generated image at the front of the feed.
    pub fn prepend(&mut self, record: ImageRecord) {
        self.records.insert(0, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Author;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn record(id: &str) -> ImageRecord {
        ImageRecord {
            id: id.to_string(),
            description: None,
            alt_description: None,
            preview_url: format!("https://img.example/{}/s.jpg", id),
            full_url: format!("https://img.example/{}/r.jpg", id),
            download_url: None,
            author: Author {
                name: "Author".to_string(),
                username: "author".to_string(),
                avatar_url: None,
            },
            likes: None,
            views: None,
            created_at: None,
            generated: false,
        }
    }

    fn page_of(prefix: &str, count: usize) -> Vec<ImageRecord> {
        (0..count).map(|i| record(&format!("{}-{}", prefix, i))).collect()
    }

    const PAGE: usize = 30;

    #[test]
    fn test_first_page_replaces_feed() {
        let mut feed = FeedController::new("music", PAGE);

        let req = feed.submit_search("mountains");
        assert_eq!(req.page, 1);
        assert_eq!(req.query, "mountains");
        feed.apply_page(req.generation, req.page, page_of("a", PAGE));
        assert_eq!(feed.len(), PAGE);

        // A second search replaces, never unions
        let req = feed.submit_search("rivers");
        feed.apply_page(req.generation, req.page, page_of("b", 5));
        assert_eq!(feed.len(), 5);
        assert_eq!(feed.records()[0].id, "b-0");
    }

    #[test]
    fn test_pagination_appends_in_order() {
        let mut feed = FeedController::new("music", PAGE);
        let req = feed.submit_search("mountains");
        feed.apply_page(req.generation, req.page, page_of("p1", PAGE));

        let req2 = feed.next_page().expect("next page after full page");
        assert_eq!(req2.page, 2);
        feed.apply_page(req2.generation, req2.page, page_of("p2", 10));

        assert_eq!(feed.len(), 40);
        assert_eq!(feed.records()[0].id, "p1-0");
        assert_eq!(feed.records()[PAGE].id, "p2-0");
        assert_eq!(feed.cursor(), 2);
    }

    #[test]
    fn test_append_does_not_dedup() {
        let mut feed = FeedController::new("q", 2);
        let req = feed.submit_search("q");
        feed.apply_page(req.generation, req.page, vec![record("same"), record("same")]);

        let req2 = feed.next_page().unwrap();
        feed.apply_page(req2.generation, req2.page, vec![record("same"), record("same")]);

        // 2 + 2, duplicate identifiers retained
        assert_eq!(feed.len(), 4);
    }

    #[test]
    fn test_next_page_noop_while_loading() {
        let mut feed = FeedController::new("q", PAGE);
        let req = feed.submit_search("q");
        feed.apply_page(req.generation, req.page, page_of("p1", PAGE));

        let first = feed.next_page();
        assert!(first.is_some());
        // Viewport keeps firing while the fetch is outstanding
        assert!(feed.next_page().is_none());
        assert!(feed.next_page().is_none());

        let req2 = first.unwrap();
        feed.apply_page(req2.generation, req2.page, page_of("p2", PAGE));
        // One more request once loading cleared, for the following page
        let req3 = feed.next_page().unwrap();
        assert_eq!(req3.page, 3);
    }

    #[test]
    fn test_stale_generation_discarded() {
        let mut feed = FeedController::new("q", PAGE);
        let old = feed.submit_search("mountains");
        let new = feed.submit_search("rivers");
        assert_ne!(old.generation, new.generation);

        // Slow page-1 response for the old query arrives after the new search
        feed.apply_page(old.generation, old.page, page_of("stale", PAGE));
        assert!(feed.is_empty());
        assert!(feed.is_loading()); // the new search's fetch is still out

        feed.apply_page(new.generation, new.page, page_of("fresh", 3));
        assert_eq!(feed.len(), 3);
        assert_eq!(feed.records()[0].id, "fresh-0");
    }

    #[test]
    fn test_failure_leaves_feed_and_retries_same_page() {
        let mut feed = FeedController::new("q", PAGE);
        let req = feed.submit_search("q");
        feed.apply_page(req.generation, req.page, page_of("p1", PAGE));

        let req2 = feed.next_page().unwrap();
        assert_eq!(req2.page, 2);
        feed.fail_page(req2.generation, req2.page);

        assert_eq!(feed.len(), PAGE);
        assert!(!feed.is_loading());
        assert_eq!(feed.cursor(), 1);

        // Retry targets page 2 again, not page 3
        let retry = feed.next_page().unwrap();
        assert_eq!(retry.page, 2);
    }

    #[test]
    fn test_failed_first_page_retries_page_one() {
        let mut feed = FeedController::new("music", PAGE);
        let req = feed.submit_search("music");
        feed.apply_page(req.generation, req.page, page_of("music", PAGE));

        // New search whose first page fails; the old records stay on screen
        let req = feed.submit_search("cats");
        feed.fail_page(req.generation, req.page);
        assert!(!feed.is_loading());
        assert_eq!(feed.len(), PAGE);

        // The viewport fires on the stale feed's tail: page 1 again, not 2
        let retry = feed.next_page().expect("retry after failed first page");
        assert_eq!(retry.page, 1);
        feed.apply_page(retry.generation, retry.page, page_of("cats", 10));

        // Replace semantics, never a union with the previous search
        assert_eq!(feed.len(), 10);
        assert_eq!(feed.records()[0].id, "cats-0");
        assert_eq!(feed.cursor(), 1);
    }

    #[test]
    fn test_abort_loading_releases_flag() {
        let mut feed = FeedController::new("q", PAGE);
        let _req = feed.submit_search("q");
        assert!(feed.is_loading());

        feed.abort_loading();
        assert!(!feed.is_loading());

        // Pagination recovers; page 1 never landed so it is re-requested
        let retry = feed.next_page().unwrap();
        assert_eq!(retry.page, 1);
    }

    #[test]
    fn test_short_page_sets_exhausted() {
        let mut feed = FeedController::new("q", PAGE);
        let req = feed.submit_search("q");
        feed.apply_page(req.generation, req.page, page_of("p1", PAGE));

        let req2 = feed.next_page().unwrap();
        feed.apply_page(req2.generation, req2.page, page_of("p2", 4));

        assert!(feed.is_exhausted());
        // The viewport signal keeps firing on the tail, but no request goes out
        assert!(feed.next_page().is_none());

        // A fresh search clears the exhausted state
        let req = feed.submit_search("other");
        assert!(!feed.is_exhausted());
        assert_eq!(req.page, 1);
    }

    #[test]
    fn test_empty_first_page_exhausts() {
        let mut feed = FeedController::new("q", PAGE);
        let req = feed.submit_search("");
        feed.apply_page(req.generation, req.page, Vec::new());

        assert!(feed.is_empty());
        assert!(feed.is_exhausted());
        assert!(feed.next_page().is_none());
    }

    #[test]
    fn test_stale_failure_does_not_clear_new_loading() {
        let mut feed = FeedController::new("q", PAGE);
        let old = feed.submit_search("a");
        let _new = feed.submit_search("b");

        feed.fail_page(old.generation, old.page);
        // The newer search's fetch is still outstanding
        assert!(feed.is_loading());
    }

    #[test]
    fn test_prepend_puts_record_first() {
        let mut feed = FeedController::new("q", PAGE);
        let req = feed.submit_search("q");
        feed.apply_page(req.generation, req.page, page_of("p1", 3));

        let mut gen = record("generated-1");
        gen.generated = true;
        feed.prepend(gen);

        assert_eq!(feed.len(), 4);
        assert_eq!(feed.records()[0].id, "generated-1");
        assert!(feed.records()[0].generated);
        assert_eq!(feed.records()[1].id, "p1-0");
    }

    #[test]
    fn test_search_while_loading_supersedes() {
        let mut feed = FeedController::new("q", PAGE);
        let req = feed.submit_search("first");
        feed.apply_page(req.generation, req.page, page_of("p1", PAGE));

        // Pagination in flight when the user searches again
        let page2 = feed.next_page().unwrap();
        let fresh = feed.submit_search("second");

        // The late page-2 append for the old query is dropped
        feed.apply_page(page2.generation, page2.page, page_of("late", PAGE));
        assert_eq!(feed.len(), PAGE);

        feed.apply_page(fresh.generation, fresh.page, page_of("new", 8));
        assert_eq!(feed.len(), 8);
        assert_eq!(feed.records()[0].id, "new-0");
        assert_eq!(feed.cursor(), 1);
    }

    proptest! {
        /// Appending property: feed length is the sum of applied page lengths,
        /// and arrival order is preserved, for any sequence of page sizes.
        #[test]
        fn prop_appends_accumulate(sizes in proptest::collection::vec(1usize..=PAGE, 1..8)) {
            let mut feed = FeedController::new("q", PAGE);
            let req = feed.submit_search("q");
            feed.apply_page(req.generation, req.page, page_of("page0", sizes[0]));

            let mut expected = sizes[0];
            for (i, &size) in sizes.iter().enumerate().skip(1) {
                let Some(req) = feed.next_page() else {
                    // A short page exhausted the feed; no further growth
                    break;
                };
                feed.apply_page(req.generation, req.page, page_of(&format!("page{}", i), size));
                expected += size;
            }

            prop_assert_eq!(feed.len(), expected);
            prop_assert_eq!(&feed.records()[0].id, "page0-0");
        }

        /// Re-entrancy property: while loading, any number of triggers
        /// produces no additional request.
        #[test]
        fn prop_single_request_in_flight(triggers in 1usize..20) {
            let mut feed = FeedController::new("q", PAGE);
            let req = feed.submit_search("q");
            feed.apply_page(req.generation, req.page, page_of("p", PAGE));

            let mut issued = 0;
            for _ in 0..triggers {
                if feed.next_page().is_some() {
                    issued += 1;
                }
            }
            prop_assert_eq!(issued, 1);
        }
    }
}
