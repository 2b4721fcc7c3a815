//! Pet type handlers

use crate::api::pagination::{Listing, PaginationQuery};
use crate::api::MessageResponse;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::{NameChange, NewName, PetType};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

/// Name search for pet types and specialties
#[derive(Debug, Deserialize)]
pub struct NameSearchQuery {
    /// Name substring; switches the listing to an unpaginated array
    pub search: Option<String>,
}

impl NameSearchQuery {
    pub(crate) fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

/// GET /api/pet-types - Paginated list, or name matches when searching
pub async fn list_pet_types(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<NameSearchQuery>,
) -> Result<Json<Listing<PetType>>, AppError> {
    let pet_types = &state.services.pet_types;
    let listing: Listing<PetType> = match query.term() {
        Some(term) => pet_types.search_by_name(term).await?.into(),
        None => {
            let request = pagination.to_request(&state.pagination)?;
            pet_types.list(request).await?.into()
        }
    };
    Ok(Json(listing))
}

/// GET /api/pet-types/:id
pub async fn get_pet_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PetType>, AppError> {
    let pet_type = state
        .services
        .pet_types
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Pet type {}", id)))?;
    Ok(Json(pet_type))
}

/// POST /api/pet-types - Create a pet type with a unique name
pub async fn create_pet_type(
    State(state): State<AppState>,
    Json(request): Json<NewName>,
) -> Result<(StatusCode, Json<PetType>), AppError> {
    request.validate().map_err(AppError::Validation)?;
    let pet_type = state.services.pet_types.create(request).await?;
    Ok((StatusCode::CREATED, Json(pet_type)))
}

/// PUT /api/pet-types/:id - Rename a pet type
pub async fn update_pet_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<NameChange>,
) -> Result<Json<PetType>, AppError> {
    request.validate().map_err(AppError::Validation)?;
    let pet_type = state
        .services
        .pet_types
        .update(id, request)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Pet type {}", id)))?;
    Ok(Json(pet_type))
}

/// DELETE /api/pet-types/:id - Refused while pets still use the type
pub async fn delete_pet_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.services.pet_types.delete(id).await? {
        return Err(AppError::NotFound(format!("Pet type {}", id)));
    }
    Ok(Json(MessageResponse::ok("Pet type deleted successfully")))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let (app, _temp_dir) = test_app().await;
        let body = json!({"name": "Bird"});
        let (status, _) = send(&app, Method::POST, "/api/pet-types", Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, error) = send(&app, Method::POST, "/api/pet-types", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error["status"], 409);
    }

    #[tokio::test]
    async fn test_search_returns_array() {
        let (app, _temp_dir) = test_app().await;
        for name in ["Cat", "Dog", "Hamster"] {
            send(&app, Method::POST, "/api/pet-types", Some(json!({"name": name}))).await;
        }

        let (status, page) = send(&app, Method::GET, "/api/pet-types?per_page=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total"], 3);
        assert_eq!(page["data"].as_array().unwrap().len(), 2);

        let (_, found) = send(&app, Method::GET, "/api/pet-types?search=ham", None).await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        assert_eq!(found[0]["name"], "Hamster");
    }

    #[tokio::test]
    async fn test_delete_in_use_is_conflict() {
        let (app, _temp_dir) = test_app().await;
        let (_, owner) = send(
            &app,
            Method::POST,
            "/api/owners",
            Some(json!({
                "first_name": "Peter",
                "last_name": "McTavish",
                "address": "2387 S. Fair Way",
                "city": "Madison",
                "telephone": "6085552765"
            })),
        )
        .await;
        let (_, snake) =
            send(&app, Method::POST, "/api/pet-types", Some(json!({"name": "Snake"}))).await;
        let snake_id = snake["id"].as_i64().unwrap();
        send(
            &app,
            Method::POST,
            "/api/pets",
            Some(json!({
                "name": "George",
                "birth_date": "2010-01-20",
                "owner_id": owner["id"],
                "type_id": snake_id
            })),
        )
        .await;

        let uri = format!("/api/pet-types/{}", snake_id);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
