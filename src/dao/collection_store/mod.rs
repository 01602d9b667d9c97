/// In-process store used for development and tests.
pub mod memory;
/// Store backed by the upstream REST API.
#[cfg(feature = "rest-store")]
pub mod rest;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::{models::EntityKind, storage::StorageResult};

/// Paging parameters forwarded verbatim as `?limit&page&sort`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageQuery {
    /// Rows per page.
    pub limit: u32,
    /// One-based page number.
    pub page: u32,
    /// `field,ASC` or `field,DESC`.
    pub sort: String,
}

/// Body of a paged list response: `{data, pageCount}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    /// Rows of the requested page.
    pub data: Vec<T>,
    /// Number of pages; may be 0 for an empty collection.
    pub page_count: u32,
}

/// Abstraction over the REST backend owning clubs, players, sponsors, organizers,
/// tournaments and matches. Records stay untyped JSON at this level; services decode
/// the ones they reason about.
pub trait CollectionStore: Send + Sync {
    /// Short name reported by the health endpoint.
    fn backend_name(&self) -> &'static str;
    /// Read one page of a collection.
    fn list_page(
        &self,
        kind: EntityKind,
        query: PageQuery,
    ) -> BoxFuture<'static, StorageResult<PageEnvelope<Value>>>;
    /// Read a whole collection.
    fn list_all(&self, kind: EntityKind) -> BoxFuture<'static, StorageResult<Vec<Value>>>;
    /// Read one record, `None` when it does not exist.
    fn find(&self, kind: EntityKind, id: String)
    -> BoxFuture<'static, StorageResult<Option<Value>>>;
    /// Create a record and return it as stored.
    fn create(&self, kind: EntityKind, body: Value) -> BoxFuture<'static, StorageResult<Value>>;
    /// Patch a record, `None` when it does not exist.
    fn update(
        &self,
        kind: EntityKind,
        id: String,
        body: Value,
    ) -> BoxFuture<'static, StorageResult<Option<Value>>>;
    /// Delete a record; `false` when it was not there.
    fn delete(&self, kind: EntityKind, id: String) -> BoxFuture<'static, StorageResult<bool>>;
    /// Cheap request telling whether the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
