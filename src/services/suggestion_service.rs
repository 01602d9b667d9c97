use serde_json::Value;

use crate::{dao::models::EntityKind, error::ServiceError, state::SharedState};

/// Whether the record's label starts with `query`, ignoring case. An empty query
/// matches everything.
fn label_matches(record: &Value, label_field: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    record
        .get(label_field)
        .and_then(Value::as_str)
        .is_some_and(|label| label.to_lowercase().starts_with(query))
}

/// Candidates offered by an association picker of `kind`.
pub async fn suggest(
    state: &SharedState,
    kind: EntityKind,
    query: &str,
) -> Result<Vec<Value>, ServiceError> {
    let store = state.require_store().await?;
    let query = query.trim().to_lowercase();
    let field = kind.label_field();

    let records = store.list_all(kind).await?;
    Ok(records
        .into_iter()
        .filter(|record| label_matches(record, field, &query))
        .collect())
}
