//! Pet type service

use crate::error::AppError;
use crate::repository::{Filters, Page, PageRequest, Repository};
use crate::services::ensure_unique_name;
use crate::store::{Db, NameChange, NewName, Pet, PetType, PetTypeWithPets};
use std::collections::HashMap;
use tracing::{info, warn};

/// Pet types; names are unique and in-use types cannot be deleted
#[derive(Clone)]
pub struct PetTypeService {
    pet_types: Repository<PetType>,
    pets: Repository<Pet>,
}

impl PetTypeService {
    /// Create the service on the shared store
    pub fn new(db: Db) -> Self {
        Self {
            pet_types: Repository::new(db.clone()),
            pets: Repository::new(db),
        }
    }

    /// One page of pet types in insertion order
    pub async fn list(&self, request: PageRequest) -> Result<Page<PetType>, AppError> {
        self.pet_types.list(request).await
    }

    /// Generic field filter search
    pub async fn search(
        &self,
        filters: &Filters,
        request: PageRequest,
    ) -> Result<Page<PetType>, AppError> {
        self.pet_types.search(filters, request).await
    }

    /// Fetch a pet type by id
    pub async fn get(&self, id: i64) -> Result<Option<PetType>, AppError> {
        self.pet_types.get(id).await
    }

    /// Every pet type with its pets, in insertion order
    pub async fn list_with_pets(&self) -> Result<Vec<PetTypeWithPets>, AppError> {
        let pet_types = self.pet_types.find_all(&Filters::new(), None).await?;
        let mut by_type: HashMap<i64, Vec<Pet>> = HashMap::new();
        for pet in self.pets.find_all(&Filters::new(), None).await? {
            by_type.entry(pet.type_id).or_default().push(pet);
        }

        Ok(pet_types
            .into_iter()
            .map(|pet_type| PetTypeWithPets {
                pets: by_type.remove(&pet_type.id).unwrap_or_default(),
                pet_type,
            })
            .collect())
    }

    /// Pet type with exactly this name (case-sensitive)
    pub async fn find_by_name(&self, name: &str) -> Result<Option<PetType>, AppError> {
        self.pet_types.find_exact("name", name).await
    }

    /// Pet types whose name contains `term`, case-insensitively
    pub async fn search_by_name(&self, term: &str) -> Result<Vec<PetType>, AppError> {
        self.pet_types.find_text(&["name"], term, None).await
    }

    /// Create a pet type; fails with `DuplicateName` if the name is taken
    pub async fn create(&self, new: NewName) -> Result<PetType, AppError> {
        ensure_unique_name(&self.pet_types, &new.name, None).await?;
        let pet_type = self.pet_types.create(new.into()).await?;
        info!(pet_type_id = pet_type.id, name = %pet_type.name, "Pet type created");
        Ok(pet_type)
    }

    /// Rename a pet type; `None` when it does not exist
    pub async fn update(&self, id: i64, change: NameChange) -> Result<Option<PetType>, AppError> {
        if !self.pet_types.exists(id).await? {
            return Ok(None);
        }
        if let Some(name) = &change.name {
            ensure_unique_name(&self.pet_types, name, Some(id)).await?;
        }
        self.pet_types.update(id, change.into()).await
    }

    /// Delete a pet type
    ///
    /// # Returns
    /// * `Ok(false)` - no such pet type
    /// * `Err(AppError::HasDependents)` - at least one pet still has this type
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        if !self.pet_types.exists(id).await? {
            return Ok(false);
        }
        let pets = self.pets.count_exact("type_id", id).await?;
        if pets > 0 {
            warn!(pet_type_id = id, pets, "Refusing to delete pet type in use");
            return Err(AppError::HasDependents(format!(
                "pet type {}: {} pet(s) still have this type",
                id, pets
            )));
        }
        self.pet_types.delete(id).await
    }
}
