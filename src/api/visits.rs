//! Visit handlers

use crate::api::pagination::{Listing, PaginationQuery};
use crate::api::MessageResponse;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::{NewVisit, Visit, VisitChanges, VisitDetail};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

/// Look-back window when `days` is not given
const DEFAULT_RECENT_DAYS: i64 = 30;

/// Visit listing filters, checked in this order: pet, date range,
/// description. Any of them switches to an unpaginated array.
#[derive(Debug, Deserialize)]
pub struct VisitListQuery {
    /// Visits of one pet
    pub pet_id: Option<i64>,
    /// Range start, `YYYY-MM-DD`, inclusive
    pub start_date: Option<String>,
    /// Range end, `YYYY-MM-DD`, inclusive
    pub end_date: Option<String>,
    /// Description substring
    pub description: Option<String>,
}

/// `?days=` for the recent visits listing
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    /// Look-back window, 1 to 365
    pub days: Option<i64>,
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!("{} must be a date in YYYY-MM-DD format", field))
    })
}

/// GET /api/visits - Paginated list, or filtered matches
pub async fn list_visits(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<VisitListQuery>,
) -> Result<Json<Listing<Visit>>, AppError> {
    let visits = &state.services.visits;

    if let Some(pet_id) = query.pet_id {
        let found = visits
            .visits_by_pet(pet_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pet {}", pet_id)))?;
        return Ok(Json(Listing::All(found)));
    }

    match (query.start_date.as_deref(), query.end_date.as_deref()) {
        (Some(start), Some(end)) => {
            let start = parse_date("start_date", start)?;
            let end = parse_date("end_date", end)?;
            let found = visits.visits_by_date_range(start, end).await?;
            return Ok(Json(Listing::All(found)));
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(AppError::Validation(
                "start_date and end_date must be given together".to_string(),
            ));
        }
        (None, None) => {}
    }

    if let Some(term) = query
        .description
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
    {
        let found = visits.search_by_description(term).await?;
        return Ok(Json(Listing::All(found)));
    }

    let request = pagination.to_request(&state.pagination)?;
    Ok(Json(Listing::Page(visits.list(request).await?)))
}

/// GET /api/visits/:id - Visit with its pet and owner name
pub async fn get_visit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<VisitDetail>, AppError> {
    let visit = state
        .services
        .visits
        .get_with_pet(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Visit {}", id)))?;
    Ok(Json(visit))
}

/// POST /api/visits - Record a visit
pub async fn create_visit(
    State(state): State<AppState>,
    Json(request): Json<NewVisit>,
) -> Result<(StatusCode, Json<Visit>), AppError> {
    request.validate().map_err(AppError::Validation)?;
    let visit = state.services.visits.create(request).await?;
    Ok((StatusCode::CREATED, Json(visit)))
}

/// PUT /api/visits/:id
pub async fn update_visit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<VisitChanges>,
) -> Result<Json<Visit>, AppError> {
    request.validate().map_err(AppError::Validation)?;
    let visit = state
        .services
        .visits
        .update(id, request)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Visit {}", id)))?;
    Ok(Json(visit))
}

/// DELETE /api/visits/:id
pub async fn delete_visit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.services.visits.delete(id).await? {
        return Err(AppError::NotFound(format!("Visit {}", id)));
    }
    Ok(Json(MessageResponse::ok("Visit deleted successfully")))
}

/// GET /api/visits/pet/:pet_id - Visits of a pet, newest first
pub async fn visits_by_pet(
    State(state): State<AppState>,
    Path(pet_id): Path<i64>,
) -> Result<Json<Vec<Visit>>, AppError> {
    let visits = state
        .services
        .visits
        .visits_by_pet(pet_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Pet {}", pet_id)))?;
    Ok(Json(visits))
}

/// GET /api/visits/recent?days=30
pub async fn recent_visits(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<Visit>>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_RECENT_DAYS);
    let visits = state.services.visits.recent_visits(days).await?;
    Ok(Json(visits))
}
