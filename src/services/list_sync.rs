//! Async driver keeping a paged list consistent with its backing collection.
//!
//! A [`ListSynchronizer`] owns one [`ListView`] behind a mutex that is only held for
//! synchronous state changes, never across a fetch. Concurrent navigations therefore
//! race the way they would in a browser tab and the view's fetch tickets decide which
//! response is shown.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    dao::{
        collection_store::{CollectionStore, PageEnvelope, PageQuery},
        models::EntityKind,
    },
    error::ServiceError,
    state::pagination::{FetchTicket, ListCommand, ListUpdate, ListView, PageSnapshot},
};

/// Paged collection a [`ListSynchronizer`] reads from and deletes into.
pub trait PageSource: Send + Sync {
    /// Row type.
    type Item: Clone + Send;

    /// Read one page.
    fn fetch_page(&self, page: u32) -> BoxFuture<'_, Result<PageEnvelope<Self::Item>, ServiceError>>;

    /// Delete one record. A single attempt; failures are returned as-is.
    fn remove(&self, id: String) -> BoxFuture<'_, Result<(), ServiceError>>;
}

/// One collection of a [`CollectionStore`] read with fixed page size and order.
pub struct StoreCollection {
    store: Arc<dyn CollectionStore>,
    kind: EntityKind,
    limit: u32,
    sort: String,
}

impl StoreCollection {
    /// Read `kind` from `store`, `limit` rows per page ordered by `sort`.
    pub fn new(store: Arc<dyn CollectionStore>, kind: EntityKind, limit: u32, sort: String) -> Self {
        Self {
            store,
            kind,
            limit,
            sort,
        }
    }
}

impl PageSource for StoreCollection {
    type Item = Value;

    fn fetch_page(&self, page: u32) -> BoxFuture<'_, Result<PageEnvelope<Value>, ServiceError>> {
        let query = PageQuery {
            limit: self.limit,
            page,
            sort: self.sort.clone(),
        };
        Box::pin(async move { Ok(self.store.list_page(self.kind, query).await?) })
    }

    fn remove(&self, id: String) -> BoxFuture<'_, Result<(), ServiceError>> {
        Box::pin(async move {
            if self.store.delete(self.kind, id.clone()).await? {
                Ok(())
            } else {
                Err(ServiceError::not_found(self.kind, &id))
            }
        })
    }
}

/// Outcome of [`ListSynchronizer::remove`].
#[derive(Debug, Clone, PartialEq)]
pub struct Removal<T> {
    /// State of the list once the refetch settled.
    pub update: ListUpdate<T>,
    /// Page the list moved to because the page the delete was issued from disappeared.
    pub navigate_to: Option<u32>,
    /// Set when the record is gone but the page could not be read again; `update` is
    /// then [`ListUpdate::Stale`] and the caller has to reload.
    pub refresh_error: Option<String>,
}

/// Drives one [`ListView`] against a [`PageSource`].
pub struct ListSynchronizer<S: PageSource> {
    source: S,
    view: Mutex<ListView<S::Item>>,
}

impl<S: PageSource> ListSynchronizer<S> {
    /// Synchronizer on page one.
    pub fn new(source: S) -> Self {
        Self {
            source,
            view: Mutex::new(ListView::default()),
        }
    }

    /// Synchronizer positioned on `page` without fetching it.
    pub fn at_page(source: S, page: u32) -> Self {
        Self {
            source,
            view: Mutex::new(ListView::at_page(page)),
        }
    }

    /// Rows currently shown.
    pub async fn snapshot(&self) -> PageSnapshot<S::Item> {
        self.view.lock().await.snapshot()
    }

    /// Whether a delete of `id` is in flight.
    pub async fn is_removing(&self, id: &str) -> bool {
        self.view.lock().await.is_removing(id)
    }

    /// Open the page named by a raw URL segment.
    pub async fn open(&self, raw_page: &str) -> Result<ListUpdate<S::Item>, ServiceError> {
        let command = self.view.lock().await.navigate(raw_page);
        match command {
            ListCommand::Redirect(page) => Ok(ListUpdate::Redirect(page)),
            ListCommand::Fetch(ticket) => self.load(ticket).await,
        }
    }

    /// Move to `page` and fetch it.
    pub async fn go_to(&self, page: u32) -> Result<ListUpdate<S::Item>, ServiceError> {
        let ticket = self.view.lock().await.navigate_to(page);
        self.load(ticket).await
    }

    async fn load(&self, ticket: FetchTicket) -> Result<ListUpdate<S::Item>, ServiceError> {
        match self.source.fetch_page(ticket.page).await {
            Ok(envelope) => Ok(self.view.lock().await.apply(ticket, envelope)),
            Err(err) => {
                if self.view.lock().await.fetch_failed(ticket) {
                    Err(err)
                } else {
                    Ok(ListUpdate::Stale)
                }
            }
        }
    }

    /// Delete `id`, then re-read the current page. When the page no longer exists the
    /// list moves to the new last page and shows it.
    ///
    /// Only a failed delete is an error. Once the record is gone a failing refetch is
    /// reported through [`Removal::refresh_error`].
    pub async fn remove(&self, id: &str) -> Result<Removal<S::Item>, ServiceError> {
        self.view.lock().await.begin_remove(id)?;

        if let Err(err) = self.source.remove(id.to_string()).await {
            self.view.lock().await.remove_failed(id);
            return Err(err);
        }

        let ticket = self.view.lock().await.remove_succeeded(id);
        let mut navigate_to = None;
        let refreshed = match self.load(ticket).await {
            Ok(ListUpdate::Redirect(last)) => {
                debug!(id, page = ticket.page, last, "page emptied by delete; moving to last page");
                navigate_to = Some(last);
                self.go_to(last).await
            }
            other => other,
        };

        Ok(match refreshed {
            Ok(update) => Removal {
                update,
                navigate_to,
                refresh_error: None,
            },
            Err(err) => {
                warn!(id, error = %err, "record deleted but the page could not be re-read");
                Removal {
                    update: ListUpdate::Stale,
                    navigate_to,
                    refresh_error: Some(err.to_string()),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex as StdMutex,
        atomic::{AtomicBool, Ordering},
    };

    use tokio::sync::Notify;

    use super::*;
    use crate::dao::collection_store::memory::MemoryStore;

    /// In-memory rows `"1"..="n"`, three per page.
    struct Rows {
        rows: StdMutex<Vec<String>>,
        fail_removals: bool,
        fail_fetches_after_removal: bool,
        removed: AtomicBool,
        gate: Option<(u32, Arc<Notify>)>,
        /// Signalled when a delete starts, then awaited before it completes.
        removal_gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    impl Rows {
        fn new(count: usize) -> Self {
            Self {
                rows: StdMutex::new((1..=count).map(|n| n.to_string()).collect()),
                fail_removals: false,
                fail_fetches_after_removal: false,
                removed: AtomicBool::new(false),
                gate: None,
                removal_gate: None,
            }
        }
    }

    impl PageSource for Rows {
        type Item = String;

        fn fetch_page(&self, page: u32) -> BoxFuture<'_, Result<PageEnvelope<String>, ServiceError>> {
            Box::pin(async move {
                if let Some((gated, notify)) = &self.gate {
                    if *gated == page {
                        notify.notified().await;
                    }
                }
                if self.fail_fetches_after_removal && self.removed.load(Ordering::SeqCst) {
                    return Err(ServiceError::Degraded);
                }
                let rows = self.rows.lock().unwrap();
                let data = rows.iter().skip((page as usize - 1) * 3).take(3).cloned().collect();
                Ok(PageEnvelope {
                    data,
                    page_count: rows.len().div_ceil(3) as u32,
                })
            })
        }

        fn remove(&self, id: String) -> BoxFuture<'_, Result<(), ServiceError>> {
            Box::pin(async move {
                if let Some((started, release)) = &self.removal_gate {
                    started.notify_one();
                    release.notified().await;
                }
                if self.fail_removals {
                    return Err(ServiceError::Degraded);
                }
                self.rows.lock().unwrap().retain(|row| *row != id);
                self.removed.store(true, Ordering::SeqCst);
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn deleting_last_row_of_last_page_moves_back_one_page() {
        let sync = ListSynchronizer::new(Rows::new(7));
        let opened = sync.open("3").await.unwrap();
        assert!(matches!(&opened, ListUpdate::Displayed(snapshot) if snapshot.items == ["7"]));

        let removal = sync.remove("7").await.unwrap();
        assert_eq!(removal.navigate_to, Some(2));
        assert_eq!(
            removal.update,
            ListUpdate::Displayed(PageSnapshot {
                items: vec!["4".to_string(), "5".to_string(), "6".to_string()],
                page: 2,
                total_pages: 2,
            })
        );
    }

    #[tokio::test]
    async fn deleting_inside_a_page_refetches_in_place() {
        let sync = ListSynchronizer::new(Rows::new(7));
        sync.open("1").await.unwrap();

        let removal = sync.remove("2").await.unwrap();
        assert_eq!(removal.navigate_to, None);
        assert!(matches!(
            removal.update,
            ListUpdate::Displayed(PageSnapshot { page: 1, total_pages: 2, ref items }) if items == &["1", "3", "4"]
        ));
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_page_untouched() {
        let sync = ListSynchronizer::new(Rows {
            fail_removals: true,
            ..Rows::new(4)
        });
        sync.open("2").await.unwrap();

        assert!(matches!(sync.remove("4").await, Err(ServiceError::Degraded)));
        assert!(!sync.is_removing("4").await);
        let snapshot = sync.snapshot().await;
        assert_eq!(snapshot.items, ["4"]);
        assert_eq!(snapshot.page, 2);
    }

    #[tokio::test]
    async fn row_is_marked_while_its_delete_is_in_flight() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let sync = ListSynchronizer::new(Rows {
            removal_gate: Some((started.clone(), release.clone())),
            ..Rows::new(4)
        });
        sync.open("1").await.unwrap();
        assert!(!sync.is_removing("2").await);

        let (removal, ()) = tokio::join!(sync.remove("2"), async {
            started.notified().await;
            assert!(sync.is_removing("2").await);
            assert!(!sync.is_removing("3").await);
            release.notify_one();
        });

        assert!(removal.is_ok());
        assert!(!sync.is_removing("2").await);
    }

    #[tokio::test]
    async fn completed_delete_survives_a_failing_refetch() {
        let sync = ListSynchronizer::new(Rows {
            fail_fetches_after_removal: true,
            ..Rows::new(4)
        });
        sync.open("2").await.unwrap();

        let removal = sync.remove("4").await.unwrap();
        assert_eq!(removal.update, ListUpdate::Stale);
        assert!(removal.refresh_error.is_some());
        assert!(!sync.is_removing("4").await);
        assert!(!sync.source.rows.lock().unwrap().contains(&"4".to_string()));
    }

    #[tokio::test]
    async fn invalid_page_redirects_without_fetching() {
        let sync = ListSynchronizer::new(Rows::new(4));
        assert_eq!(sync.open("zero").await.unwrap(), ListUpdate::Redirect(1));
        assert_eq!(sync.open("0").await.unwrap(), ListUpdate::Redirect(1));
        assert_eq!(sync.open("9").await.unwrap(), ListUpdate::Redirect(2));
    }

    #[tokio::test]
    async fn slow_response_for_an_abandoned_page_is_ignored() {
        let notify = Arc::new(Notify::new());
        let sync = ListSynchronizer::new(Rows {
            gate: Some((2, notify.clone())),
            ..Rows::new(9)
        });

        let (slow, fast, ()) = tokio::join!(sync.open("2"), sync.open("3"), async {
            notify.notify_one();
        });

        assert_eq!(slow.unwrap(), ListUpdate::Stale);
        assert!(matches!(fast.unwrap(), ListUpdate::Displayed(PageSnapshot { page: 3, .. })));
        assert_eq!(sync.snapshot().await.items, ["7", "8", "9"]);
    }

    #[tokio::test]
    async fn store_collection_pages_through_a_store() {
        let store = Arc::new(MemoryStore::new());
        for name in ["Alekhine", "Botvinnik", "Capablanca"] {
            store
                .insert(EntityKind::Players, serde_json::json!({"lastName": name}))
                .await
                .unwrap();
        }
        let collection = StoreCollection::new(store, EntityKind::Players, 2, "id,ASC".into());
        let sync = ListSynchronizer::new(collection);

        let update = sync.open("2").await.unwrap();
        assert!(matches!(&update, ListUpdate::Displayed(snapshot) if snapshot.items.len() == 1));

        let removal = sync.remove("3").await.unwrap();
        assert_eq!(removal.navigate_to, Some(1));
        assert!(matches!(sync.remove("404").await, Err(ServiceError::NotFound(_))));
    }
}
