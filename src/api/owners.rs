//! Owner handlers

use crate::api::pagination::PaginationQuery;
use crate::api::MessageResponse;
use crate::error::AppError;
use crate::repository::Page;
use crate::state::AppState;
use crate::store::{NewOwner, OwnerChanges, OwnerDetail, OwnerView};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

/// Owner listing filters
#[derive(Debug, Deserialize)]
pub struct OwnerListQuery {
    /// Substring of name, address, city or telephone
    pub search: Option<String>,
}

/// GET /api/owners - List owners, optionally matching a search term
pub async fn list_owners(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<OwnerListQuery>,
) -> Result<Json<Page<OwnerView>>, AppError> {
    let request = pagination.to_request(&state.pagination)?;
    let owners = &state.services.owners;
    let page = match query.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => owners.search_text(term, request).await?,
        _ => owners.list(request).await?,
    };
    Ok(Json(page.map(OwnerView::from)))
}

/// GET /api/owners/:id - Owner with its pets
pub async fn get_owner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OwnerDetail>, AppError> {
    let owner = state
        .services
        .owners
        .get_with_pets(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Owner {}", id)))?;
    Ok(Json(owner))
}

/// POST /api/owners - Create an owner
pub async fn create_owner(
    State(state): State<AppState>,
    Json(request): Json<NewOwner>,
) -> Result<(StatusCode, Json<OwnerView>), AppError> {
    request.validate().map_err(AppError::Validation)?;
    let owner = state.services.owners.create(request).await?;
    Ok((StatusCode::CREATED, Json(owner.into())))
}

/// PUT /api/owners/:id - Update some owner fields
pub async fn update_owner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<OwnerChanges>,
) -> Result<Json<OwnerView>, AppError> {
    request.validate().map_err(AppError::Validation)?;
    let owner = state
        .services
        .owners
        .update(id, request)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Owner {}", id)))?;
    Ok(Json(owner.into()))
}

/// DELETE /api/owners/:id - Delete an owner with its pets and visits
pub async fn delete_owner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.services.owners.delete(id).await? {
        return Err(AppError::NotFound(format!("Owner {}", id)));
    }
    Ok(Json(MessageResponse::ok("Owner deleted successfully")))
}

/// GET /api/owners/search/lastname/:last_name
pub async fn search_by_last_name(
    State(state): State<AppState>,
    Path(last_name): Path<String>,
) -> Result<Json<Vec<OwnerView>>, AppError> {
    let owners = state.services.owners.find_by_last_name(&last_name).await?;
    Ok(Json(owners.into_iter().map(OwnerView::from).collect()))
}
