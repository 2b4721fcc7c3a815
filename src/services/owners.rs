//! Owner service

use crate::error::AppError;
use crate::repository::{Filters, Page, PageRequest, Repository};
use crate::store::{Db, NewOwner, Owner, OwnerChanges, OwnerDetail, Pet};
use tracing::info;

/// Columns matched by the free-text owner search
const SEARCH_COLUMNS: &[&str] = &["first_name", "last_name", "address", "city", "telephone"];

/// Owner records and their pets
#[derive(Clone)]
pub struct OwnerService {
    owners: Repository<Owner>,
    pets: Repository<Pet>,
}

impl OwnerService {
    /// Create the service on the shared store
    pub fn new(db: Db) -> Self {
        Self {
            owners: Repository::new(db.clone()),
            pets: Repository::new(db),
        }
    }

    /// One page of owners in insertion order
    pub async fn list(&self, request: PageRequest) -> Result<Page<Owner>, AppError> {
        self.owners.list(request).await
    }

    /// Generic field filter search
    pub async fn search(&self, filters: &Filters, request: PageRequest) -> Result<Page<Owner>, AppError> {
        self.owners.search(filters, request).await
    }

    /// Owners whose name, address, city or telephone contains `term`
    pub async fn search_text(
        &self,
        term: &str,
        request: PageRequest,
    ) -> Result<Page<Owner>, AppError> {
        self.owners.search_text(SEARCH_COLUMNS, term, request).await
    }

    /// Owners whose last name contains `last_name`, unpaginated
    pub async fn find_by_last_name(&self, last_name: &str) -> Result<Vec<Owner>, AppError> {
        self.owners.find_text(&["last_name"], last_name, None).await
    }

    /// Fetch an owner by id
    pub async fn get(&self, id: i64) -> Result<Option<Owner>, AppError> {
        self.owners.get(id).await
    }

    /// Fetch an owner together with all of its pets
    pub async fn get_with_pets(&self, id: i64) -> Result<Option<OwnerDetail>, AppError> {
        let Some(owner) = self.owners.get(id).await? else {
            return Ok(None);
        };
        let pets = self
            .pets
            .find_all(&Filters::new().set("owner_id", id), None)
            .await?;

        Ok(Some(OwnerDetail {
            full_name: owner.full_name(),
            owner,
            pets,
        }))
    }

    /// Register a new owner
    pub async fn create(&self, owner: NewOwner) -> Result<Owner, AppError> {
        let owner = self.owners.create(owner.into()).await?;
        info!(owner_id = owner.id, "Owner created");
        Ok(owner)
    }

    /// Apply a partial update; `None` when the owner does not exist
    pub async fn update(&self, id: i64, changes: OwnerChanges) -> Result<Option<Owner>, AppError> {
        self.owners.update(id, changes.into()).await
    }

    /// Delete an owner together with its pets and their visits
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let pets = self.pets.count_exact("owner_id", id).await?;
        let deleted = self.owners.delete(id).await?;
        if deleted {
            info!(owner_id = id, cascaded_pets = pets, "Owner deleted");
        }
        Ok(deleted)
    }
}
