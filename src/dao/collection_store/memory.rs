//! In-process [`CollectionStore`] used when no upstream backend is configured and by tests.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use serde_json::{Map, Value, json};
use tokio::sync::RwLock;

use crate::dao::{
    collection_store::{CollectionStore, PageEnvelope, PageQuery},
    entity_id,
    models::EntityKind,
    storage::{StorageError, StorageResult},
};

#[derive(Default)]
struct Collections {
    next_id: u64,
    records: HashMap<EntityKind, Vec<Value>>,
}

impl Collections {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    fn bucket(&mut self, kind: EntityKind) -> &mut Vec<Value> {
        self.records.entry(kind).or_default()
    }

    fn position(&self, kind: EntityKind, id: &str) -> Option<usize> {
        self.records
            .get(&kind)?
            .iter()
            .position(|record| entity_id::of_value(record).as_deref() == Some(id))
    }

    /// Rebuild the `matches` slot of every player after a match changed.
    fn sync_match_slots(&mut self, match_id: &str, record: Option<&Value>) {
        let players = self.bucket(EntityKind::Players);
        for player in players.iter_mut() {
            if let Some(Value::Array(slots)) = player.get_mut("matches") {
                slots.retain(|slot| entity_id::of_value(slot).as_deref() != Some(match_id));
            }
        }

        let Some(record) = record else {
            return;
        };
        let slot = json!({
            "id": match_id,
            "begin": record.get("begin").cloned().unwrap_or(Value::Null),
            "end": record.get("end").cloned().unwrap_or(Value::Null),
        });
        let player_ids = record
            .get("players")
            .and_then(Value::as_array)
            .map(|refs| refs.iter().filter_map(entity_id::of_value).collect::<Vec<_>>())
            .unwrap_or_default();

        for player in players.iter_mut() {
            let Some(id) = entity_id::of_value(player) else {
                continue;
            };
            if !player_ids.contains(&id) {
                continue;
            }
            if let Some(object) = player.as_object_mut() {
                let slots = object
                    .entry("matches")
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(slots) = slots {
                    slots.push(slot.clone());
                }
            }
        }
    }
}

/// Document store keeping every collection in memory.
///
/// Ids are increasing integers rendered as strings. Creating, updating or deleting a
/// match rewrites the embedded `matches` list of the players it references, the way
/// the upstream backend does.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as-is, assigning an id when it has none.
    pub async fn insert(&self, kind: EntityKind, record: Value) -> StorageResult<Value> {
        let mut collections = self.inner.write().await;
        insert_record(&mut collections, kind, record)
    }
}

fn into_object(record: Value) -> StorageResult<Map<String, Value>> {
    match record {
        Value::Object(object) => Ok(object),
        other => Err(StorageError::Rejected {
            message: format!("expected a JSON object, got `{other}`"),
        }),
    }
}

fn insert_record(
    collections: &mut Collections,
    kind: EntityKind,
    record: Value,
) -> StorageResult<Value> {
    let mut record = Value::Object(into_object(record)?);
    let id = match entity_id::of_value(&record) {
        Some(id) => id,
        None => {
            let id = collections.allocate_id();
            record["id"] = Value::String(id.clone());
            id
        }
    };
    if let Ok(numeric) = id.parse::<u64>() {
        collections.next_id = collections.next_id.max(numeric);
    }

    collections.bucket(kind).push(record.clone());
    if kind == EntityKind::Matches {
        collections.sync_match_slots(&id, Some(&record));
    }
    Ok(record)
}

/// Split `field,DESC` into the field name and whether the order is descending.
fn parse_sort(sort: &str) -> (&str, bool) {
    let mut parts = sort.splitn(2, ',');
    let field = parts.next().map(str::trim).filter(|f| !f.is_empty()).unwrap_or("id");
    let descending = parts
        .next()
        .map(|order| order.trim().eq_ignore_ascii_case("desc"))
        .unwrap_or(false);
    (field, descending)
}

fn compare_field(left: &Value, right: &Value, field: &str) -> Ordering {
    let key = |value: &Value| match value.get(field) {
        Some(Value::Number(number)) => (number.as_f64(), None),
        Some(Value::String(text)) => (text.parse::<f64>().ok(), Some(text.clone())),
        Some(other) => (None, Some(other.to_string())),
        None => (None, None),
    };

    match (key(left), key(right)) {
        ((Some(a), _), (Some(b), _)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        ((_, a), (_, b)) => a.cmp(&b),
    }
}

/// `ceil(total / limit)`, but never below one page.
fn page_count(total: usize, limit: u32) -> u32 {
    let limit = limit.max(1) as usize;
    total.div_ceil(limit).max(1) as u32
}

impl CollectionStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn list_page(
        &self,
        kind: EntityKind,
        query: PageQuery,
    ) -> BoxFuture<'static, StorageResult<PageEnvelope<Value>>> {
        let store = self.clone();
        Box::pin(async move {
            let collections = store.inner.read().await;
            let mut records = collections.records.get(&kind).cloned().unwrap_or_default();

            let (field, descending) = parse_sort(&query.sort);
            records.sort_by(|a, b| {
                let ordering = compare_field(a, b, field);
                if descending { ordering.reverse() } else { ordering }
            });

            let limit = query.limit.max(1) as usize;
            let skip = (query.page.max(1) as usize - 1).saturating_mul(limit);
            let page_count = page_count(records.len(), query.limit);
            let data = records.into_iter().skip(skip).take(limit).collect();

            Ok(PageEnvelope { data, page_count })
        })
    }

    fn list_all(&self, kind: EntityKind) -> BoxFuture<'static, StorageResult<Vec<Value>>> {
        let store = self.clone();
        Box::pin(async move {
            let collections = store.inner.read().await;
            Ok(collections.records.get(&kind).cloned().unwrap_or_default())
        })
    }

    fn find(
        &self,
        kind: EntityKind,
        id: String,
    ) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let store = self.clone();
        Box::pin(async move {
            let collections = store.inner.read().await;
            Ok(collections
                .position(kind, &id)
                .and_then(|index| collections.records.get(&kind)?.get(index).cloned()))
        })
    }

    fn create(&self, kind: EntityKind, body: Value) -> BoxFuture<'static, StorageResult<Value>> {
        let store = self.clone();
        Box::pin(async move {
            let mut object = into_object(body)?;
            object.remove("id");
            let mut collections = store.inner.write().await;
            insert_record(&mut collections, kind, Value::Object(object))
        })
    }

    fn update(
        &self,
        kind: EntityKind,
        id: String,
        body: Value,
    ) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let store = self.clone();
        Box::pin(async move {
            let patch = into_object(body)?;
            let mut collections = store.inner.write().await;
            let Some(index) = collections.position(kind, &id) else {
                return Ok(None);
            };

            let record = &mut collections.bucket(kind)[index];
            if let Some(object) = record.as_object_mut() {
                for (key, value) in patch {
                    if key != "id" {
                        object.insert(key, value);
                    }
                }
            }
            let updated = record.clone();

            if kind == EntityKind::Matches {
                collections.sync_match_slots(&id, Some(&updated));
            }
            Ok(Some(updated))
        })
    }

    fn delete(&self, kind: EntityKind, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let mut collections = store.inner.write().await;
            let Some(index) = collections.position(kind, &id) else {
                return Ok(false);
            };
            collections.bucket(kind).remove(index);
            if kind == EntityKind::Matches {
                collections.sync_match_slots(&id, None);
            }
            Ok(true)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
