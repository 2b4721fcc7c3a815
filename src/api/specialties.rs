//! Specialty handlers

use crate::api::pagination::{Listing, PaginationQuery};
use crate::api::pet_types::NameSearchQuery;
use crate::api::MessageResponse;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::{NameChange, NewName, Specialty};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

/// GET /api/specialties - Paginated list, or name matches when searching
pub async fn list_specialties(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<NameSearchQuery>,
) -> Result<Json<Listing<Specialty>>, AppError> {
    let specialties = &state.services.specialties;
    let listing: Listing<Specialty> = match query.term() {
        Some(term) => specialties.search_by_name(term).await?.into(),
        None => {
            let request = pagination.to_request(&state.pagination)?;
            specialties.list(request).await?.into()
        }
    };
    Ok(Json(listing))
}

/// GET /api/specialties/:id
pub async fn get_specialty(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Specialty>, AppError> {
    let specialty = state
        .services
        .specialties
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Specialty {}", id)))?;
    Ok(Json(specialty))
}

/// POST /api/specialties
pub async fn create_specialty(
    State(state): State<AppState>,
    Json(request): Json<NewName>,
) -> Result<(StatusCode, Json<Specialty>), AppError> {
    request.validate().map_err(AppError::Validation)?;
    let specialty = state.services.specialties.create(request).await?;
    Ok((StatusCode::CREATED, Json(specialty)))
}

/// PUT /api/specialties/:id
pub async fn update_specialty(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<NameChange>,
) -> Result<Json<Specialty>, AppError> {
    request.validate().map_err(AppError::Validation)?;
    let specialty = state
        .services
        .specialties
        .update(id, request)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Specialty {}", id)))?;
    Ok(Json(specialty))
}

/// DELETE /api/specialties/:id
pub async fn delete_specialty(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.services.specialties.delete(id).await? {
        return Err(AppError::NotFound(format!("Specialty {}", id)));
    }
    Ok(Json(MessageResponse::ok("Specialty deleted successfully")))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_specialty_crud() {
        let (app, _temp_dir) = test_app().await;
        let (status, created) = send(
            &app,
            Method::POST,
            "/api/specialties",
            Some(json!({"name": "radiology"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/specialties/{}", created["id"]);

        let (status, renamed) =
            send(&app, Method::PUT, &uri, Some(json!({"name": "Radiology"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["name"], "Radiology");

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rejects_overlong_name() {
        let (app, _temp_dir) = test_app().await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/specialties",
            Some(json!({"name": "x".repeat(81)})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
