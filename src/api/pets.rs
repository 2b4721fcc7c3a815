//! Pet handlers

use crate::api::pagination::PaginationQuery;
use crate::api::MessageResponse;
use crate::error::AppError;
use crate::repository::{Filters, Page};
use crate::state::AppState;
use crate::store::{NewPet, Pet, PetChanges, PetDetail};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

/// Pet listing filters, ANDed
#[derive(Debug, Deserialize)]
pub struct PetListQuery {
    /// Only pets of this owner
    pub owner_id: Option<i64>,
    /// Only pets of this type
    pub type_id: Option<i64>,
    /// Name substring
    pub name: Option<String>,
}

impl PetListQuery {
    fn filters(&self) -> Filters {
        Filters::new()
            .set_opt("owner_id", self.owner_id)
            .set_opt("type_id", self.type_id)
            .set_opt(
                "name",
                self.name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty()),
            )
    }
}

/// GET /api/pets - List pets, optionally filtered
pub async fn list_pets(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<PetListQuery>,
) -> Result<Json<Page<Pet>>, AppError> {
    let request = pagination.to_request(&state.pagination)?;
    let filters = query.filters();
    let page = if filters.is_empty() {
        state.services.pets.list(request).await?
    } else {
        state.services.pets.search(&filters, request).await?
    };
    Ok(Json(page))
}

/// GET /api/pets/:id - Pet with owner, type and visits
pub async fn get_pet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PetDetail>, AppError> {
    let pet = state
        .services
        .pets
        .get_with_visits(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Pet {}", id)))?;
    Ok(Json(pet))
}

/// POST /api/pets - Register a pet
pub async fn create_pet(
    State(state): State<AppState>,
    Json(request): Json<NewPet>,
) -> Result<(StatusCode, Json<Pet>), AppError> {
    request.validate().map_err(AppError::Validation)?;
    let pet = state.services.pets.create(request).await?;
    Ok((StatusCode::CREATED, Json(pet)))
}

/// PUT /api/pets/:id - Update some pet fields
pub async fn update_pet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<PetChanges>,
) -> Result<Json<Pet>, AppError> {
    request.validate().map_err(AppError::Validation)?;
    let pet = state
        .services
        .pets
        .update(id, request)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Pet {}", id)))?;
    Ok(Json(pet))
}

/// DELETE /api/pets/:id - Delete a pet and its visits
pub async fn delete_pet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.services.pets.delete(id).await? {
        return Err(AppError::NotFound(format!("Pet {}", id)));
    }
    Ok(Json(MessageResponse::ok("Pet deleted successfully")))
}

/// GET /api/pets/owner/:owner_id - All pets of an owner
pub async fn pets_by_owner(
    State(state): State<AppState>,
    Path(owner_id): Path<i64>,
) -> Result<Json<Vec<Pet>>, AppError> {
    let pets = state
        .services
        .pets
        .pets_by_owner(owner_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Owner {}", owner_id)))?;
    Ok(Json(pets))
}
