use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    dao::{
        collection_store::CollectionStore,
        models::{EntityKind, Resource},
    },
    dto::{
        EntityInput,
        page::{DeleteResponse, ListParams, PageResponse},
    },
    error::ServiceError,
    services::list_sync::{ListSynchronizer, StoreCollection},
    state::{
        SharedState,
        pagination::{ListUpdate, parse_page},
    },
};

/// What a list request resolved to.
#[derive(Debug)]
pub enum ListOutcome {
    /// The requested page.
    Page(PageResponse),
    /// The requested page is invalid or out of range; the client should load this one.
    Redirect(u32),
}

/// Page size and order of a request, falling back to the configured defaults.
fn collection(
    state: &SharedState,
    store: Arc<dyn CollectionStore>,
    kind: EntityKind,
    params: &ListParams,
) -> StoreCollection {
    let limit = params
        .limit
        .filter(|limit| *limit > 0)
        .unwrap_or_else(|| state.config().page_limit());
    let sort = params
        .sort
        .clone()
        .filter(|sort| !sort.trim().is_empty())
        .unwrap_or_else(|| state.config().sort_for(kind).to_string());
    StoreCollection::new(store, kind, limit, sort)
}

/// Read one page of a collection.
pub async fn list(
    state: &SharedState,
    kind: EntityKind,
    params: ListParams,
) -> Result<ListOutcome, ServiceError> {
    let store = state.require_store().await?;
    let sync = ListSynchronizer::new(collection(state, store, kind, &params));
    let raw_page = params.page.as_deref().unwrap_or("1");

    match sync.open(raw_page).await? {
        ListUpdate::Displayed(snapshot) => Ok(ListOutcome::Page(snapshot.into())),
        ListUpdate::Redirect(page) => Ok(ListOutcome::Redirect(page)),
        ListUpdate::Stale => Ok(ListOutcome::Page(sync.snapshot().await.into())),
    }
}

/// Read one record.
pub async fn get(state: &SharedState, kind: EntityKind, id: String) -> Result<Value, ServiceError> {
    let store = state.require_store().await?;
    store
        .find(kind, id.clone())
        .await?
        .ok_or_else(|| ServiceError::not_found(kind, &id))
}

fn to_body<I: EntityInput>(input: I) -> Result<Value, ServiceError> {
    serde_json::to_value(input.normalized())
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))
}

/// Validate the form, then forward the trimmed payload upstream.
pub async fn create<I: EntityInput>(state: &SharedState, input: I) -> Result<Value, ServiceError> {
    let kind = I::Resource::KIND;
    input.validate()?;
    let store = state.require_store().await?;

    let created = store.create(kind, to_body(input)?).await?;
    info!(%kind, id = ?created.get("id"), "record created");
    Ok(created)
}

/// Validate, trim and patch a record.
pub async fn update<I: EntityInput>(
    state: &SharedState,
    id: String,
    input: I,
) -> Result<Value, ServiceError> {
    let kind = I::Resource::KIND;
    input.validate()?;
    let store = state.require_store().await?;

    let updated = store
        .update(kind, id.clone(), to_body(input)?)
        .await?
        .ok_or_else(|| ServiceError::not_found(kind, &id))?;
    info!(%kind, id = %id, "record updated");
    Ok(updated)
}

/// Delete a record. With a `page` parameter the list page the delete was issued from
/// is re-read (and clamped to the new last page) and returned.
pub async fn delete(
    state: &SharedState,
    kind: EntityKind,
    id: String,
    params: ListParams,
) -> Result<Option<DeleteResponse>, ServiceError> {
    let _claim = state.begin_removal(kind, &id)?;
    let store = state.require_store().await?;

    let Some(raw_page) = params.page.as_deref() else {
        if !store.delete(kind, id.clone()).await? {
            return Err(ServiceError::not_found(kind, &id));
        }
        info!(%kind, id = %id, "record deleted");
        return Ok(None);
    };

    let page = parse_page(raw_page).unwrap_or(1);
    let sync = ListSynchronizer::at_page(collection(state, store, kind, &params), page);
    let removal = sync.remove(&id).await.inspect_err(|err| {
        warn!(%kind, id = %id, error = %err, "delete failed");
    })?;
    info!(%kind, id = %id, navigate_to = ?removal.navigate_to, "record deleted");

    let page = match removal.update {
        ListUpdate::Displayed(snapshot) => snapshot.into(),
        ListUpdate::Redirect(_) | ListUpdate::Stale => sync.snapshot().await.into(),
    };
    Ok(Some(DeleteResponse {
        page,
        navigate_to: removal.navigate_to,
        refresh_error: removal.refresh_error,
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::collection_store::memory::MemoryStore,
        dto::{club::ClubInput, sponsor::SponsorInput},
        state::AppState,
    };

    async fn state_with_clubs(count: usize) -> (SharedState, MemoryStore) {
        let store = MemoryStore::new();
        for n in 1..=count {
            store
                .insert(EntityKind::Clubs, json!({"name": format!("Club {n}"), "address": "x"}))
                .await
                .unwrap();
        }
        let state = AppState::with_store(AppConfig::default(), Arc::new(store.clone())).await;
        (state, store)
    }

    fn params(page: Option<&str>) -> ListParams {
        ListParams {
            page: page.map(str::to_string),
            ..ListParams::default()
        }
    }

    #[tokio::test]
    async fn lists_with_configured_defaults() {
        let (state, _) = state_with_clubs(12).await;
        let ListOutcome::Page(page) = list(&state, EntityKind::Clubs, params(None)).await.unwrap()
        else {
            panic!("expected a page");
        };
        assert_eq!(page.page, 1);
        assert_eq!(page.page_count, 2);
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.data[0]["id"], json!("12"));
    }

    #[tokio::test]
    async fn out_of_range_and_garbage_pages_redirect() {
        let (state, _) = state_with_clubs(12).await;
        assert!(matches!(
            list(&state, EntityKind::Clubs, params(Some("5"))).await.unwrap(),
            ListOutcome::Redirect(2)
        ));
        assert!(matches!(
            list(&state, EntityKind::Clubs, params(Some("-3"))).await.unwrap(),
            ListOutcome::Redirect(1)
        ));
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_store() {
        let (state, store) = state_with_clubs(0).await;
        let result = create(&state, SponsorInput::default()).await;
        assert!(matches!(result, Err(ServiceError::Invalid(ref report)) if report.fields == ["name"]));
        assert!(store.list_all(EntityKind::Sponsors).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn created_record_is_trimmed() {
        let (state, _) = state_with_clubs(0).await;
        let created = create(
            &state,
            ClubInput {
                name: "  Marshall Chess Club ".into(),
                address: "23 West 10th Street".into(),
                players: Vec::new(),
            },
        )
        .await
        .unwrap();
        assert_eq!(created["name"], json!("Marshall Chess Club"));

        let id = created["id"].as_str().unwrap().to_string();
        let fetched = get(&state, EntityKind::Clubs, id).await.unwrap();
        assert_eq!(fetched["address"], json!("23 West 10th Street"));
    }

    #[tokio::test]
    async fn updating_missing_record_is_not_found() {
        let (state, _) = state_with_clubs(0).await;
        let input = ClubInput {
            name: "Central".into(),
            address: "Moscow".into(),
            players: Vec::new(),
        };
        assert!(matches!(
            update(&state, "77".into(), input).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_from_last_page_returns_previous_page() {
        let (state, _) = state_with_clubs(11).await;
        let response = delete(&state, EntityKind::Clubs, "1".into(), params(Some("2")))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(response.navigate_to, Some(1));
        assert_eq!(response.page.page, 1);
        assert_eq!(response.page.page_count, 1);
        assert_eq!(response.page.data.len(), 10);
        assert!(!state.is_removing(EntityKind::Clubs, "1"));
    }

    #[tokio::test]
    async fn delete_without_page_only_deletes() {
        let (state, store) = state_with_clubs(2).await;
        assert!(delete(&state, EntityKind::Clubs, "2".into(), params(None))
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.list_all(EntityKind::Clubs).await.unwrap().len(), 1);
        assert!(matches!(
            delete(&state, EntityKind::Clubs, "2".into(), params(None)).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_delete_of_same_record_conflicts() {
        let (state, _) = state_with_clubs(1).await;
        let _claim = state.begin_removal(EntityKind::Clubs, "1").unwrap();
        assert!(matches!(
            delete(&state, EntityKind::Clubs, "1".into(), params(None)).await,
            Err(ServiceError::Conflict(_))
        ));
    }
}
