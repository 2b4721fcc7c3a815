//! Domain services
//!
//! Each service wraps the generic repository for one entity and adds the
//! cross-entity checks and read paths that entity needs. Services hold no
//! locks; the store's transactions are the only concurrency boundary.

pub mod owners;
pub mod pet_types;
pub mod pets;
pub mod specialties;
pub mod vets;
pub mod visits;

pub use owners::OwnerService;
pub use pet_types::PetTypeService;
pub use pets::PetService;
pub use specialties::SpecialtyService;
pub use vets::VetService;
pub use visits::VisitService;

use crate::error::AppError;
use crate::repository::{Entity, Repository};
use crate::store::Db;
use chrono::{NaiveDate, Utc};

/// All domain services, built on one shared store handle
#[derive(Clone)]
pub struct Services {
    /// Owner records
    pub owners: OwnerService,
    /// Pet records
    pub pets: PetService,
    /// Pet type records
    pub pet_types: PetTypeService,
    /// Specialty records
    pub specialties: SpecialtyService,
    /// Vet records and vet-specialty links
    pub vets: VetService,
    /// Visit records
    pub visits: VisitService,
}

impl Services {
    /// Construct every service on the given store
    pub fn new(db: Db) -> Self {
        Self {
            owners: OwnerService::new(db.clone()),
            pets: PetService::new(db.clone()),
            pet_types: PetTypeService::new(db.clone()),
            specialties: SpecialtyService::new(db.clone()),
            vets: VetService::new(db.clone()),
            visits: VisitService::new(db),
        }
    }
}

/// Current calendar date
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Reject dates after today
pub(crate) fn ensure_not_future(field: &str, date: NaiveDate) -> Result<(), AppError> {
    if date > today() {
        return Err(AppError::InvalidDate(format!(
            "{} cannot be in the future",
            field
        )));
    }
    Ok(())
}

/// Fail with `ReferenceNotFound` unless the referenced row exists
pub(crate) async fn ensure_exists<E: Entity>(
    repo: &Repository<E>,
    id: i64,
) -> Result<(), AppError> {
    if !repo.exists(id).await? {
        tracing::warn!(entity = E::NAME, id, "Reference to missing record");
        return Err(AppError::ReferenceNotFound(format!("{} {}", E::NAME, id)));
    }
    Ok(())
}

/// Fail with `DuplicateName` if a row other than `except_id` already holds
/// exactly this name
pub(crate) async fn ensure_unique_name<E: Entity>(
    repo: &Repository<E>,
    name: &str,
    except_id: Option<i64>,
) -> Result<(), AppError> {
    if let Some(existing) = repo.find_exact("name", name).await? {
        if Some(existing.id()) != except_id {
            tracing::warn!(entity = E::NAME, name, "Duplicate name rejected");
            return Err(AppError::DuplicateName {
                entity: E::NAME,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
