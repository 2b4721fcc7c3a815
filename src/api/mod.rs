//! API module
//!
//! HTTP handlers for the clinic resources and the router that mounts them.

pub mod owners;
pub mod pagination;
pub mod pet_types;
pub mod pets;
pub mod specialties;
pub mod vets;
pub mod visits;

use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;

/// Message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
    /// Status indicator, always "ok"
    pub status: String,
}

impl MessageResponse {
    /// An "ok" message
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: "ok".to_string(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    message: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Pet clinic API is healthy".to_string(),
    })
}

/// All API routes; the caller supplies state and middleware
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health_check))
        // Owners
        .route(
            "/api/owners",
            get(owners::list_owners).post(owners::create_owner),
        )
        .route(
            "/api/owners/:id",
            get(owners::get_owner)
                .put(owners::update_owner)
                .delete(owners::delete_owner),
        )
        .route(
            "/api/owners/search/lastname/:last_name",
            get(owners::search_by_last_name),
        )
        // Pets
        .route("/api/pets", get(pets::list_pets).post(pets::create_pet))
        .route(
            "/api/pets/:id",
            get(pets::get_pet)
                .put(pets::update_pet)
                .delete(pets::delete_pet),
        )
        .route("/api/pets/owner/:owner_id", get(pets::pets_by_owner))
        // Pet types
        .route(
            "/api/pet-types",
            get(pet_types::list_pet_types).post(pet_types::create_pet_type),
        )
        .route(
            "/api/pet-types/:id",
            get(pet_types::get_pet_type)
                .put(pet_types::update_pet_type)
                .delete(pet_types::delete_pet_type),
        )
        // Specialties
        .route(
            "/api/specialties",
            get(specialties::list_specialties).post(specialties::create_specialty),
        )
        .route(
            "/api/specialties/:id",
            get(specialties::get_specialty)
                .put(specialties::update_specialty)
                .delete(specialties::delete_specialty),
        )
        // Vets
        .route("/api/vets", get(vets::list_vets).post(vets::create_vet))
        .route(
            "/api/vets/:id",
            get(vets::get_vet)
                .put(vets::update_vet)
                .delete(vets::delete_vet),
        )
        .route("/api/vets/:id/specialties", post(vets::add_specialty))
        .route(
            "/api/vets/:id/specialties/:specialty_id",
            delete(vets::remove_specialty),
        )
        // Visits
        .route(
            "/api/visits",
            get(visits::list_visits).post(visits::create_visit),
        )
        .route("/api/visits/recent", get(visits::recent_visits))
        .route("/api/visits/pet/:pet_id", get(visits::visits_by_pet))
        .route(
            "/api/visits/:id",
            get(visits::get_visit)
                .put(visits::update_visit)
                .delete(visits::delete_visit),
        )
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_health() {
        let (app, _temp_dir) = test_app().await;
        let (status, body) = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (app, _temp_dir) = test_app().await;
        let (status, _) = send(&app, Method::GET, "/api/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
