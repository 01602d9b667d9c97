//! Paged list view state: which page is shown, which rows are being deleted, and
//! which in-flight fetch is allowed to update the view.
//!
//! Each fetch is tagged with a [`FetchTicket`] carrying a generation number. Only the
//! most recently issued ticket may be applied; anything older is reported as
//! [`ListUpdate::Stale`] and discarded.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::dao::collection_store::PageEnvelope;

/// Parse a page number taken from a URL. Only positive integers are accepted.
pub fn parse_page(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|page| *page >= 1)
}

/// Page count reported by the backend, never below one.
pub fn effective_total(page_count: u32) -> u32 {
    page_count.max(1)
}

/// Targets of the first/previous/next/last paginator buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageLinks {
    /// Always 1.
    pub first: u32,
    /// Previous page, or 1.
    pub previous: u32,
    /// Next page, or the last one.
    pub next: u32,
    /// Last page.
    pub last: u32,
}

impl PageLinks {
    /// Links around `page` out of `total_pages`.
    pub fn new(page: u32, total_pages: u32) -> Self {
        let last = effective_total(total_pages);
        Self {
            first: 1,
            previous: page.saturating_sub(1).max(1),
            next: if page >= last { page } else { page + 1 },
            last,
        }
    }
}

/// Permission to apply one fetch result to a [`ListView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    /// Page the fetch is for.
    pub page: u32,
    generation: u64,
}

/// What the caller must do after asking the view for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListCommand {
    /// Change the location to this page; nothing is fetched.
    Redirect(u32),
    /// Fetch the ticket's page and hand the result back to [`ListView::apply`].
    Fetch(FetchTicket),
}

/// Rows currently shown by a view.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot<T> {
    /// Rows in backend order.
    pub items: Vec<T>,
    /// Page shown.
    pub page: u32,
    /// Number of pages, at least one.
    pub total_pages: u32,
}

/// Effect of applying a fetch result.
#[derive(Debug, Clone, PartialEq)]
pub enum ListUpdate<T> {
    /// The page is shown.
    Displayed(PageSnapshot<T>),
    /// The requested page no longer exists; navigate to the last one.
    Redirect(u32),
    /// A newer fetch was issued in the meantime; the result was dropped.
    Stale,
}

/// Why a delete could not start.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemoveError {
    /// A delete of this row is already in flight.
    #[error("`{0}` is already being removed")]
    AlreadyRemoving(String),
}

/// State of one paged list view.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    page: u32,
    total_pages: u32,
    items: Vec<T>,
    removing: HashSet<String>,
    generation: u64,
    loading: bool,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self::at_page(1)
    }
}

impl<T> ListView<T> {
    /// View positioned on `page` with nothing loaded yet.
    pub fn at_page(page: u32) -> Self {
        Self {
            page: page.max(1),
            total_pages: page.max(1),
            items: Vec::new(),
            removing: HashSet::new(),
            generation: 0,
            loading: false,
        }
    }

    /// Current page.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Page count of the last applied fetch.
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Rows shown.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether a fetch is pending.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the row's delete button should show a spinner and stay disabled.
    pub fn is_removing(&self, id: &str) -> bool {
        self.removing.contains(id)
    }

    /// Paginator targets for the current page.
    pub fn links(&self) -> PageLinks {
        PageLinks::new(self.page, self.total_pages)
    }

    /// React to a page number from the URL.
    pub fn navigate(&mut self, raw_page: &str) -> ListCommand {
        match parse_page(raw_page) {
            Some(page) => ListCommand::Fetch(self.navigate_to(page)),
            None => ListCommand::Redirect(1),
        }
    }

    /// Switch to `page`, clearing the rows until its fetch lands.
    pub fn navigate_to(&mut self, page: u32) -> FetchTicket {
        self.page = page.max(1);
        self.items.clear();
        self.issue()
    }

    /// Re-fetch the current page, keeping the rows on screen meanwhile.
    pub fn refresh(&mut self) -> FetchTicket {
        self.issue()
    }

    fn issue(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket {
            page: self.page,
            generation: self.generation,
        }
    }

    /// Report a failed fetch. Returns `false` when the ticket was already superseded.
    pub fn fetch_failed(&mut self, ticket: FetchTicket) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.loading = false;
        true
    }

    /// Mark a row as being deleted before the request goes out.
    pub fn begin_remove(&mut self, id: &str) -> Result<(), RemoveError> {
        if self.removing.insert(id.to_string()) {
            Ok(())
        } else {
            Err(RemoveError::AlreadyRemoving(id.to_string()))
        }
    }

    /// The delete request failed: the row becomes actionable again.
    pub fn remove_failed(&mut self, id: &str) {
        self.removing.remove(id);
    }

    /// The delete request succeeded: the current page must be fetched again.
    pub fn remove_succeeded(&mut self, id: &str) -> FetchTicket {
        self.removing.remove(id);
        self.refresh()
    }
}

impl<T: Clone> ListView<T> {
    /// Apply the result of the fetch `ticket` was issued for.
    pub fn apply(&mut self, ticket: FetchTicket, envelope: PageEnvelope<T>) -> ListUpdate<T> {
        if ticket.generation != self.generation {
            return ListUpdate::Stale;
        }

        self.loading = false;
        self.total_pages = effective_total(envelope.page_count);
        self.items = envelope.data;

        if self.total_pages < ticket.page {
            return ListUpdate::Redirect(self.total_pages);
        }

        ListUpdate::Displayed(self.snapshot())
    }

    /// Copy of what is shown.
    pub fn snapshot(&self) -> PageSnapshot<T> {
        PageSnapshot {
            items: self.items.clone(),
            page: self.page,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(items: &[&str], page_count: u32) -> PageEnvelope<String> {
        PageEnvelope {
            data: items.iter().map(|item| item.to_string()).collect(),
            page_count,
        }
    }

    fn fetch(command: ListCommand) -> FetchTicket {
        match command {
            ListCommand::Fetch(ticket) => ticket,
            other => panic!("expected a fetch, got {other:?}"),
        }
    }

    #[test]
    fn page_numbers_must_be_positive_integers() {
        assert_eq!(parse_page("3"), Some(3));
        assert_eq!(parse_page(" 12 "), Some(12));
        assert_eq!(parse_page("0"), None);
        assert_eq!(parse_page("-1"), None);
        assert_eq!(parse_page("two"), None);
        assert_eq!(parse_page("1.5"), None);
        assert_eq!(parse_page(""), None);
    }

    #[test]
    fn non_numeric_page_redirects_to_first() {
        let mut view = ListView::<String>::default();
        assert_eq!(view.navigate("abc"), ListCommand::Redirect(1));
        assert!(!view.is_loading());
    }

    #[test]
    fn fetched_page_is_displayed() {
        let mut view = ListView::default();
        let ticket = fetch(view.navigate("2"));
        assert_eq!(ticket.page, 2);
        assert!(view.is_loading());

        let update = view.apply(ticket, envelope(&["c", "d"], 3));
        assert_eq!(
            update,
            ListUpdate::Displayed(PageSnapshot {
                items: vec!["c".to_string(), "d".to_string()],
                page: 2,
                total_pages: 3,
            })
        );
        assert!(!view.is_loading());
    }

    #[test]
    fn page_beyond_total_redirects_to_last() {
        let mut view = ListView::default();
        let ticket = fetch(view.navigate("7"));
        assert_eq!(view.apply(ticket, envelope(&[], 4)), ListUpdate::Redirect(4));
    }

    #[test]
    fn empty_collection_stays_on_first_page() {
        let mut view = ListView::default();
        let ticket = fetch(view.navigate("1"));
        let update = view.apply(ticket, envelope(&[], 0));
        assert!(matches!(update, ListUpdate::Displayed(PageSnapshot { total_pages: 1, .. })));
    }

    #[test]
    fn late_response_for_previous_page_is_dropped() {
        let mut view = ListView::default();
        let slow = fetch(view.navigate("2"));
        let fast = fetch(view.navigate("3"));

        assert!(matches!(view.apply(fast, envelope(&["e"], 3)), ListUpdate::Displayed(_)));
        assert_eq!(view.apply(slow, envelope(&["c", "d"], 3)), ListUpdate::Stale);
        assert_eq!(view.page(), 3);
        assert_eq!(view.items(), ["e".to_string()]);
    }

    #[test]
    fn stale_failure_does_not_clear_loading() {
        let mut view = ListView::<String>::default();
        let first = view.refresh();
        let _second = view.refresh();
        assert!(!view.fetch_failed(first));
        assert!(view.is_loading());
    }

    #[test]
    fn duplicate_removal_is_refused_until_it_fails() {
        let mut view = ListView::<String>::at_page(1);
        view.begin_remove("42").unwrap();
        assert!(view.is_removing("42"));
        assert_eq!(
            view.begin_remove("42"),
            Err(RemoveError::AlreadyRemoving("42".into()))
        );

        view.remove_failed("42");
        assert!(!view.is_removing("42"));
        assert!(view.begin_remove("42").is_ok());
    }

    #[test]
    fn successful_removal_refetches_and_supersedes_pending_fetch() {
        let mut view = ListView::at_page(3);
        let pending = view.refresh();
        view.begin_remove("9").unwrap();

        let refetch = view.remove_succeeded("9");
        assert_eq!(refetch.page, 3);
        assert!(!view.is_removing("9"));
        assert_eq!(view.apply(pending, envelope(&["9"], 3)), ListUpdate::Stale);
        assert_eq!(view.apply(refetch, envelope(&[], 2)), ListUpdate::Redirect(2));
    }

    #[test]
    fn paginator_links_clamp_at_both_ends() {
        assert_eq!(
            PageLinks::new(1, 3),
            PageLinks {
                first: 1,
                previous: 1,
                next: 2,
                last: 3
            }
        );
        assert_eq!(
            PageLinks::new(3, 3),
            PageLinks {
                first: 1,
                previous: 2,
                next: 3,
                last: 3
            }
        );
    }
}
