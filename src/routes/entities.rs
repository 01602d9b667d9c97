//! Collection routes shared by every entity, instantiated once per [`Resource`].

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{MethodRouter, get, patch, post},
};
use serde_json::Value;
use url::form_urlencoded;

use crate::{
    dao::models::{EntityKind, Resource},
    dto::{
        EntityInput,
        page::{ListParams, SuggestionParams},
    },
    error::AppError,
    services::{
        entity_service::{self, ListOutcome},
        suggestion_service,
    },
    state::SharedState,
};

/// Base path of a collection on the gateway.
pub fn collection_path(kind: EntityKind) -> String {
    format!("/api/{}", kind.collection())
}

/// Location of `page` keeping the caller's page size and order.
pub fn page_location(kind: EntityKind, page: u32, params: &ListParams) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("page", &page.to_string());
    if let Some(limit) = params.limit {
        query.append_pair("limit", &limit.to_string());
    }
    if let Some(sort) = &params.sort {
        query.append_pair("sort", sort);
    }
    format!("{}?{}", collection_path(kind), query.finish())
}

/// List one page; malformed or vanished pages answer with a temporary redirect.
pub async fn list<R: Resource>(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    let outcome = entity_service::list(&state, R::KIND, params.clone()).await?;
    Ok(match outcome {
        ListOutcome::Page(page) => Json(page).into_response(),
        ListOutcome::Redirect(page) => {
            Redirect::temporary(&page_location(R::KIND, page, &params)).into_response()
        }
    })
}

/// Read one record.
pub async fn show<R: Resource>(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(entity_service::get(&state, R::KIND, id).await?))
}

/// Delete a record, re-reading the list page when one is given.
pub async fn remove<R: Resource>(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    Ok(match entity_service::delete(&state, R::KIND, id, params).await? {
        Some(response) => Json(response).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Records whose label starts with `q`.
pub async fn suggestions<R: Resource>(
    State(state): State<SharedState>,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<Vec<Value>>, AppError> {
    Ok(Json(
        suggestion_service::suggest(&state, R::KIND, &params.q).await?,
    ))
}

/// Validate and create a record.
pub async fn create<I: EntityInput>(
    State(state): State<SharedState>,
    Json(input): Json<I>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let created = entity_service::create(&state, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Validate and update a record.
pub async fn update<I: EntityInput>(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<I>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(entity_service::update(&state, id, input).await?))
}

/// Read, delete and suggestion routes of `R`, plus the given create (collection path)
/// and update (item path) handlers.
pub fn resource_router<R: Resource>(
    create: MethodRouter<SharedState>,
    update: MethodRouter<SharedState>,
) -> Router<SharedState> {
    let base = collection_path(R::KIND);
    Router::<SharedState>::new()
        .route(&base, get(list::<R>).merge(create))
        .route(&format!("{base}/suggestions"), get(suggestions::<R>))
        .route(
            &format!("{base}/{{id}}"),
            get(show::<R>).delete(remove::<R>).merge(update),
        )
}

/// Full CRUD routes of an entity whose form validates on its own.
pub fn router<I: EntityInput>() -> Router<SharedState> {
    resource_router::<I::Resource>(post(create::<I>), patch(update::<I>))
}
