//! Pet service

use crate::error::AppError;
use crate::repository::{Filters, Page, PageRequest, Repository};
use crate::services::{ensure_exists, ensure_not_future, today, visits::NEWEST_FIRST};
use crate::store::{Db, NewPet, Owner, Pet, PetChanges, PetDetail, PetType, Visit};
use chrono::NaiveDate;
use tracing::info;

/// Pet records, checked against their owner and pet type
#[derive(Clone)]
pub struct PetService {
    db: Db,
    pets: Repository<Pet>,
    owners: Repository<Owner>,
    pet_types: Repository<PetType>,
    visits: Repository<Visit>,
}

impl PetService {
    /// Create the service on the shared store
    pub fn new(db: Db) -> Self {
        Self {
            pets: Repository::new(db.clone()),
            owners: Repository::new(db.clone()),
            pet_types: Repository::new(db.clone()),
            visits: Repository::new(db.clone()),
            db,
        }
    }

    /// One page of pets in insertion order
    pub async fn list(&self, request: PageRequest) -> Result<Page<Pet>, AppError> {
        self.pets.list(request).await
    }

    /// Filtered page, e.g. by `owner_id`, `type_id` or a `name` substring
    pub async fn search(&self, filters: &Filters, request: PageRequest) -> Result<Page<Pet>, AppError> {
        self.pets.search(filters, request).await
    }

    /// Fetch a pet by id
    pub async fn get(&self, id: i64) -> Result<Option<Pet>, AppError> {
        self.pets.get(id).await
    }

    /// Fetch a pet with its visits, owner summary and pet type summary
    pub async fn get_with_visits(&self, id: i64) -> Result<Option<PetDetail>, AppError> {
        let Some(pet) = self.pets.get(id).await? else {
            return Ok(None);
        };
        let owner = self.owners.get(pet.owner_id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Pet {} references missing owner {}",
                pet.id,
                pet.owner_id
            ))
        })?;
        let pet_type = self.pet_types.get(pet.type_id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Pet {} references missing pet type {}",
                pet.id,
                pet.type_id
            ))
        })?;
        let visits = self
            .visits
            .find_all(&Filters::new().set("pet_id", id), Some(NEWEST_FIRST))
            .await?;

        let age = pet.age_on(today());
        Ok(Some(PetDetail::new(pet, age, &owner, &pet_type, visits)))
    }

    /// Register a pet
    ///
    /// # Returns
    /// * `Err(AppError::InvalidDate)` - birth date after today
    /// * `Err(AppError::ReferenceNotFound)` - owner or pet type missing
    pub async fn create(&self, pet: NewPet) -> Result<Pet, AppError> {
        ensure_not_future("Birth date", pet.birth_date)?;
        ensure_exists(&self.owners, pet.owner_id).await?;
        ensure_exists(&self.pet_types, pet.type_id).await?;

        let pet = self.pets.create(pet.into()).await?;
        info!(pet_id = pet.id, owner_id = pet.owner_id, "Pet created");
        Ok(pet)
    }

    /// Apply a partial update, validating any supplied date or reference.
    /// `None` when the pet does not exist.
    pub async fn update(&self, id: i64, changes: PetChanges) -> Result<Option<Pet>, AppError> {
        if !self.pets.exists(id).await? {
            return Ok(None);
        }
        if let Some(birth_date) = changes.birth_date {
            ensure_not_future("Birth date", birth_date)?;
        }
        if let Some(owner_id) = changes.owner_id {
            ensure_exists(&self.owners, owner_id).await?;
        }
        if let Some(type_id) = changes.type_id {
            ensure_exists(&self.pet_types, type_id).await?;
        }
        self.pets.update(id, changes.into()).await
    }

    /// Delete a pet together with its visits
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let deleted = self.pets.delete(id).await?;
        if deleted {
            info!(pet_id = id, "Pet deleted");
        }
        Ok(deleted)
    }

    /// All pets of an owner; `None` when the owner does not exist
    pub async fn pets_by_owner(&self, owner_id: i64) -> Result<Option<Vec<Pet>>, AppError> {
        if !self.owners.exists(owner_id).await? {
            return Ok(None);
        }
        let pets = self
            .pets
            .find_all(&Filters::new().set("owner_id", owner_id), None)
            .await?;
        Ok(Some(pets))
    }

    /// All pets of a pet type
    pub async fn pets_by_type(&self, type_id: i64) -> Result<Vec<Pet>, AppError> {
        self.pets
            .find_all(&Filters::new().set("type_id", type_id), None)
            .await
    }

    /// Pets whose name contains `name`
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Pet>, AppError> {
        self.pets.find_text(&["name"], name, None).await
    }

    /// Pets born strictly after `date`
    pub async fn born_after(&self, date: NaiveDate) -> Result<Vec<Pet>, AppError> {
        let pets = sqlx::query_as::<_, Pet>(
            "SELECT * FROM pets WHERE birth_date > ? ORDER BY id",
        )
        .bind(date)
        .fetch_all(self.db.pool())
        .await?;
        Ok(pets)
    }

    /// Pets born strictly before `date`
    pub async fn born_before(&self, date: NaiveDate) -> Result<Vec<Pet>, AppError> {
        let pets = sqlx::query_as::<_, Pet>(
            "SELECT * FROM pets WHERE birth_date < ? ORDER BY id",
        )
        .bind(date)
        .fetch_all(self.db.pool())
        .await?;
        Ok(pets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use crate::store::NewVisit;
    use chrono::Days;

    #[tokio::test]
    async fn test_create_rejects_missing_references() {
        let (services, _temp_dir) = create_test_services().await;
        let owner = add_owner(&services, "George", "Franklin").await;
        let cat = add_pet_type(&services, "Cat").await;

        let missing_owner = services
            .pets
            .create(NewPet {
                name: "Leo".to_string(),
                birth_date: date(2010, 9, 7),
                owner_id: owner.id + 10,
                type_id: cat.id,
            })
            .await;
        assert!(matches!(missing_owner, Err(AppError::ReferenceNotFound(_))));

        let missing_type = services
            .pets
            .create(NewPet {
                name: "Leo".to_string(),
                birth_date: date(2010, 9, 7),
                owner_id: owner.id,
                type_id: cat.id + 10,
            })
            .await;
        assert!(matches!(missing_type, Err(AppError::ReferenceNotFound(_))));

        let page = services.pets.list(PageRequest::new(1, 20).unwrap()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_birth_date_bounds() {
        let (services, _temp_dir) = create_test_services().await;
        let owner = add_owner(&services, "George", "Franklin").await;
        let cat = add_pet_type(&services, "Cat").await;

        let tomorrow = today() + Days::new(1);
        let result = services
            .pets
            .create(NewPet {
                name: "Leo".to_string(),
                birth_date: tomorrow,
                owner_id: owner.id,
                type_id: cat.id,
            })
            .await;
        assert!(matches!(result, Err(AppError::InvalidDate(_))));

        let pet = add_pet(&services, "Leo", today(), owner.id, cat.id).await;
        assert_eq!(pet.birth_date, today());

        let result = services
            .pets
            .update(
                pet.id,
                PetChanges {
                    birth_date: Some(tomorrow),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::InvalidDate(_))));
    }

    #[tokio::test]
    async fn test_update_checks_new_owner() {
        let (services, _temp_dir) = create_test_services().await;
        let owner = add_owner(&services, "George", "Franklin").await;
        let other = add_owner(&services, "Betty", "Davis").await;
        let cat = add_pet_type(&services, "Cat").await;
        let pet = add_pet(&services, "Leo", date(2010, 9, 7), owner.id, cat.id).await;

        let result = services
            .pets
            .update(
                pet.id,
                PetChanges {
                    owner_id: Some(999),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::ReferenceNotFound(_))));

        let moved = services
            .pets
            .update(
                pet.id,
                PetChanges {
                    owner_id: Some(other.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.owner_id, other.id);
        assert_eq!(moved.name, "Leo");
    }

    #[tokio::test]
    async fn test_update_missing_pet_is_none() {
        let (services, _temp_dir) = create_test_services().await;
        let result = services
            .pets
            .update(
                999,
                PetChanges {
                    owner_id: Some(555),
                    type_id: Some(556),
                    birth_date: Some(today() + Days::new(1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_with_visits() {
        let (services, _temp_dir) = create_test_services().await;
        let owner = add_owner(&services, "Jean", "Coleman").await;
        let cat = add_pet_type(&services, "Cat").await;
        let pet = add_pet(&services, "Samantha", date(2012, 9, 4), owner.id, cat.id).await;
        for (day, description) in [(1, "rabies shot"), (4, "spayed")] {
            services
                .visits
                .create(NewVisit {
                    visit_date: date(2013, 1, day),
                    description: description.to_string(),
                    pet_id: pet.id,
                })
                .await
                .unwrap();
        }

        let detail = services.pets.get_with_visits(pet.id).await.unwrap().unwrap();
        assert_eq!(detail.owner.full_name, "Jean Coleman");
        assert_eq!(detail.pet_type.name, "Cat");
        assert_eq!(detail.visits.len(), 2);
        assert_eq!(detail.visits[0].description, "spayed");
        assert!(detail.age >= 12);

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["name"], "Samantha");
        assert_eq!(json["type"]["name"], "Cat");
        assert_eq!(json["birth_date"], "2012-09-04");

        assert!(services.pets.get_with_visits(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_paths() {
        let (services, _temp_dir) = create_test_services().await;
        let owner = add_owner(&services, "Carlos", "Estaban").await;
        let dog = add_pet_type(&services, "Dog").await;
        let cat = add_pet_type(&services, "Cat").await;
        add_pet(&services, "Lucky", date(2010, 6, 24), owner.id, dog.id).await;
        add_pet(&services, "Sly", date(2012, 6, 8), owner.id, cat.id).await;

        let pets = services.pets.pets_by_owner(owner.id).await.unwrap().unwrap();
        assert_eq!(pets.len(), 2);
        assert!(services.pets.pets_by_owner(999).await.unwrap().is_none());

        let dogs = services.pets.pets_by_type(dog.id).await.unwrap();
        assert_eq!(dogs.len(), 1);
        assert_eq!(dogs[0].name, "Lucky");

        assert_eq!(services.pets.find_by_name("SL").await.unwrap().len(), 1);
        assert_eq!(services.pets.born_after(date(2011, 1, 1)).await.unwrap().len(), 1);
        assert_eq!(services.pets.born_before(date(2010, 6, 24)).await.unwrap().len(), 0);

        let filtered = services
            .pets
            .search(
                &Filters::new().set("owner_id", owner.id).set("name", "uck"),
                PageRequest::new(1, 10).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(filtered.total, 1);
    }

    #[tokio::test]
    async fn test_delete_cascades_visits() {
        let (services, _temp_dir) = create_test_services().await;
        let owner = add_owner(&services, "Jean", "Coleman").await;
        let cat = add_pet_type(&services, "Cat").await;
        let pet = add_pet(&services, "Max", date(2012, 9, 4), owner.id, cat.id).await;
        let visit = services
            .visits
            .create(NewVisit {
                visit_date: date(2013, 1, 2),
                description: "rabies shot".to_string(),
                pet_id: pet.id,
            })
            .await
            .unwrap();

        assert!(services.pets.delete(pet.id).await.unwrap());
        assert!(services.visits.get(visit.id).await.unwrap().is_none());
        assert!(services.owners.get(owner.id).await.unwrap().is_some());
    }
}
