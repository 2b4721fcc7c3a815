//! Visit service

use crate::error::AppError;
use crate::repository::{Filters, Page, PageRequest, Repository};
use crate::services::{ensure_exists, ensure_not_future, today};
use crate::store::{Db, NewVisit, Pet, Visit, VisitChanges, VisitDetail, VisitPetSummary};
use chrono::{Days, NaiveDate};
use tracing::info;

/// Ordering for every unpaginated visit read
pub(crate) const NEWEST_FIRST: &str = "visit_date DESC, id DESC";

/// Longest window accepted by `recent_visits`
pub const MAX_RECENT_DAYS: i64 = 365;

/// Visit records
#[derive(Clone)]
pub struct VisitService {
    db: Db,
    visits: Repository<Visit>,
    pets: Repository<Pet>,
}

impl VisitService {
    /// Create the service on the shared store
    pub fn new(db: Db) -> Self {
        Self {
            visits: Repository::new(db.clone()),
            pets: Repository::new(db.clone()),
            db,
        }
    }

    /// One page of visits in insertion order
    pub async fn list(&self, request: PageRequest) -> Result<Page<Visit>, AppError> {
        self.visits.list(request).await
    }

    /// Generic field filter search
    pub async fn search(
        &self,
        filters: &Filters,
        request: PageRequest,
    ) -> Result<Page<Visit>, AppError> {
        self.visits.search(filters, request).await
    }

    /// Fetch a visit by id
    pub async fn get(&self, id: i64) -> Result<Option<Visit>, AppError> {
        self.visits.get(id).await
    }

    /// Fetch a visit with its pet and the pet owner's name
    pub async fn get_with_pet(&self, id: i64) -> Result<Option<VisitDetail>, AppError> {
        let Some(visit) = self.visits.get(id).await? else {
            return Ok(None);
        };
        let pet = sqlx::query_as::<_, VisitPetSummary>(
            "SELECT p.id, p.name, o.first_name || ' ' || o.last_name AS owner \
             FROM pets p JOIN owners o ON o.id = p.owner_id \
             WHERE p.id = ?",
        )
        .bind(visit.pet_id)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Visit {} references missing pet {}",
                visit.id,
                visit.pet_id
            ))
        })?;

        Ok(Some(VisitDetail { visit, pet }))
    }

    /// Record a visit
    ///
    /// # Returns
    /// * `Err(AppError::InvalidDate)` - visit date after today
    /// * `Err(AppError::ReferenceNotFound)` - pet missing
    pub async fn create(&self, visit: NewVisit) -> Result<Visit, AppError> {
        ensure_not_future("Visit date", visit.visit_date)?;
        ensure_exists(&self.pets, visit.pet_id).await?;

        let visit = self.visits.create(visit.into()).await?;
        info!(visit_id = visit.id, pet_id = visit.pet_id, "Visit recorded");
        Ok(visit)
    }

    /// Apply a partial update, validating any supplied date or pet.
    /// `None` when the visit does not exist.
    pub async fn update(
        &self,
        id: i64,
        changes: VisitChanges,
    ) -> Result<Option<Visit>, AppError> {
        if !self.visits.exists(id).await? {
            return Ok(None);
        }
        if let Some(visit_date) = changes.visit_date {
            ensure_not_future("Visit date", visit_date)?;
        }
        if let Some(pet_id) = changes.pet_id {
            ensure_exists(&self.pets, pet_id).await?;
        }
        self.visits.update(id, changes.into()).await
    }

    /// Delete a visit
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        self.visits.delete(id).await
    }

    /// Visits of a pet, newest first; `None` when the pet does not exist
    pub async fn visits_by_pet(&self, pet_id: i64) -> Result<Option<Vec<Visit>>, AppError> {
        if !self.pets.exists(pet_id).await? {
            return Ok(None);
        }
        let visits = self
            .visits
            .find_all(&Filters::new().set("pet_id", pet_id), Some(NEWEST_FIRST))
            .await?;
        Ok(Some(visits))
    }

    /// Visits on one day
    pub async fn visits_by_date(&self, date: NaiveDate) -> Result<Vec<Visit>, AppError> {
        self.visits
            .find_all(&Filters::new().set("visit_date", date), Some(NEWEST_FIRST))
            .await
    }

    /// Visits between `start` and `end`, both inclusive, newest first.
    /// An inverted range selects nothing.
    pub async fn visits_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Visit>, AppError> {
        let visits = sqlx::query_as::<_, Visit>(
            "SELECT * FROM visits WHERE visit_date BETWEEN ? AND ? \
             ORDER BY visit_date DESC, id DESC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.db.pool())
        .await?;
        Ok(visits)
    }

    /// Visits within the last `days` days, today included
    pub async fn recent_visits(&self, days: i64) -> Result<Vec<Visit>, AppError> {
        if !(1..=MAX_RECENT_DAYS).contains(&days) {
            return Err(AppError::Validation(format!(
                "days must be between 1 and {}",
                MAX_RECENT_DAYS
            )));
        }
        let end = today();
        let start = end - Days::new(days as u64);
        self.visits_by_date_range(start, end).await
    }

    /// Visits whose description contains `term`
    pub async fn search_by_description(&self, term: &str) -> Result<Vec<Visit>, AppError> {
        self.visits
            .find_text(&["description"], term, Some(NEWEST_FIRST))
            .await
    }
}
