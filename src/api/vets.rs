//! Vet handlers

use crate::api::pagination::{Listing, PaginationQuery};
use crate::api::MessageResponse;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::{NewVet, VetChanges, VetDetail, VetView};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

/// Vet listing filters; either one switches to an unpaginated array
#[derive(Debug, Deserialize)]
pub struct VetListQuery {
    /// First or last name substring
    pub search: Option<String>,
    /// Specialty name substring
    pub specialty: Option<String>,
}

/// Body of POST /api/vets/:id/specialties
#[derive(Debug, Deserialize)]
pub struct AddSpecialtyRequest {
    /// Specialty to link
    pub specialty_id: i64,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// GET /api/vets - Vets with their specialties
pub async fn list_vets(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<VetListQuery>,
) -> Result<Json<Listing<VetDetail>>, AppError> {
    let vets = &state.services.vets;
    let matches = if let Some(term) = non_blank(&query.search) {
        Some(vets.find_by_name(term).await?)
    } else if let Some(specialty) = non_blank(&query.specialty) {
        Some(vets.find_by_specialty(specialty).await?)
    } else {
        None
    };

    let listing = match matches {
        Some(found) => Listing::All(vets.attach_specialties(found).await?),
        None => {
            let request = pagination.to_request(&state.pagination)?;
            Listing::Page(vets.list_with_specialties(request).await?)
        }
    };
    Ok(Json(listing))
}

/// GET /api/vets/:id - Vet with specialties
pub async fn get_vet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<VetDetail>, AppError> {
    let vet = state
        .services
        .vets
        .get_with_specialties(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vet {}", id)))?;
    Ok(Json(vet))
}

/// POST /api/vets - Register a vet
pub async fn create_vet(
    State(state): State<AppState>,
    Json(request): Json<NewVet>,
) -> Result<(StatusCode, Json<VetView>), AppError> {
    request.validate().map_err(AppError::Validation)?;
    let vet = state.services.vets.create(request).await?;
    Ok((StatusCode::CREATED, Json(vet.into())))
}

/// PUT /api/vets/:id
pub async fn update_vet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<VetChanges>,
) -> Result<Json<VetView>, AppError> {
    request.validate().map_err(AppError::Validation)?;
    let vet = state
        .services
        .vets
        .update(id, request)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vet {}", id)))?;
    Ok(Json(vet.into()))
}

/// DELETE /api/vets/:id
pub async fn delete_vet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.services.vets.delete(id).await? {
        return Err(AppError::NotFound(format!("Vet {}", id)));
    }
    Ok(Json(MessageResponse::ok("Vet deleted successfully")))
}

/// POST /api/vets/:id/specialties - Link a specialty; 404 if already linked
pub async fn add_specialty(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AddSpecialtyRequest>,
) -> Result<Json<VetDetail>, AppError> {
    let vet = state
        .services
        .vets
        .add_specialty(id, request.specialty_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Unlinked specialty {} for vet {}",
                request.specialty_id, id
            ))
        })?;
    Ok(Json(vet))
}

/// DELETE /api/vets/:id/specialties/:specialty_id - Unlink; 404 if not linked
pub async fn remove_specialty(
    State(state): State<AppState>,
    Path((id, specialty_id)): Path<(i64, i64)>,
) -> Result<Json<VetDetail>, AppError> {
    let vet = state
        .services
        .vets
        .remove_specialty(id, specialty_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Specialty {} link for vet {}", specialty_id, id))
        })?;
    Ok(Json(vet))
}
