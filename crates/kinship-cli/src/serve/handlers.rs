//! HTTP route handlers for the genealogy server.
//!
//! Handlers are kept thin: parse path identifiers, call the registry, wrap
//! the result. Identifier parsing failures surface as `InvalidIdentifier`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use kinship_core::{Person, PersonDraft, PersonId, PersonPatch};

use super::models::{ApiError, ReorderResponse, SuccessResponse};
use super::AppState;

type ApiResult<T> = Result<T, ApiError>;

fn parse_id(raw: &str) -> Result<PersonId, ApiError> {
    Ok(PersonId::parse(raw)?)
}

// =============================================================================
// Collection Handlers
// =============================================================================

/// GET `/persons` - Every named person.
pub async fn list_persons(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Person>>> {
    Ok(Json(state.registry.list_all().await?))
}

/// POST `/persons` - Create a person from `{"name": ...}`.
pub async fn create_person(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<PersonDraft>,
) -> ApiResult<(StatusCode, Json<Person>)> {
    let person = state.registry.create(draft).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// DELETE `/persons` - Remove every person.
pub async fn delete_all_persons(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SuccessResponse>> {
    state.registry.delete_all().await?;
    Ok(Json(SuccessResponse::default()))
}

// =============================================================================
// Single Person Handlers
// =============================================================================

/// GET `/persons/{id}`
pub async fn get_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Person>> {
    let id = parse_id(&id)?;
    Ok(Json(state.registry.get(&id).await?))
}

/// PUT `/persons/{id}` - Replace the client-owned fields.
pub async fn replace_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(draft): Json<PersonDraft>,
) -> ApiResult<Json<Person>> {
    let id = parse_id(&id)?;
    Ok(Json(state.registry.replace(&id, draft).await?))
}

/// PATCH `/persons/{id}` - Partial update; `order` may only be echoed back.
pub async fn patch_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<PersonPatch>,
) -> ApiResult<Json<Person>> {
    let id = parse_id(&id)?;
    Ok(Json(state.registry.patch(&id, patch).await?))
}

/// DELETE `/persons/{id}` - Delete a person and every edge touching it.
pub async fn delete_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let id = parse_id(&id)?;
    state.registry.delete(&id).await?;
    Ok(Json(SuccessResponse::default()))
}

// =============================================================================
// Relation Handlers
// =============================================================================

/// GET `/persons/{id}/parents`
pub async fn parents(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Person>>> {
    let id = parse_id(&id)?;
    Ok(Json(state.registry.parents(&id).await?))
}

/// GET `/persons/{id}/children`
pub async fn children(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Person>>> {
    let id = parse_id(&id)?;
    Ok(Json(state.registry.children(&id).await?))
}

/// GET `/persons/{id}/tree` - The person's genealogical subtree.
pub async fn tree(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Person>>> {
    let id = parse_id(&id)?;
    Ok(Json(state.registry.subtree(&id).await?))
}

/// PATCH `/persons/{id}/isparentof/{child_id}`
pub async fn add_edge(
    State(state): State<Arc<AppState>>,
    Path((parent, child)): Path<(String, String)>,
) -> ApiResult<Json<SuccessResponse>> {
    let parent = parse_id(&parent)?;
    let child = parse_id(&child)?;
    state.registry.add_edge(&parent, &child).await?;
    Ok(Json(SuccessResponse::default()))
}

/// DELETE `/persons/{id}/isparentof/{child_id}`
pub async fn remove_edge(
    State(state): State<Arc<AppState>>,
    Path((parent, child)): Path<(String, String)>,
) -> ApiResult<Json<SuccessResponse>> {
    let parent = parse_id(&parent)?;
    let child = parse_id(&child)?;
    state.registry.remove_edge(&parent, &child).await?;
    Ok(Json(SuccessResponse::default()))
}

/// POST `/reorder` - Recompute generation order over the whole graph.
pub async fn reorder(State(state): State<Arc<AppState>>) -> ApiResult<Json<ReorderResponse>> {
    Ok(Json(state.registry.reorder().await?.into()))
}
