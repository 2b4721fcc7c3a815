//! Specialty service

use crate::error::AppError;
use crate::repository::{Filters, Page, PageRequest, Repository};
use crate::services::ensure_unique_name;
use crate::store::{Db, NameChange, NewName, Specialty, SpecialtyWithVets, Vet, VetView};
use sqlx::FromRow;
use std::collections::HashMap;
use tracing::info;

/// A vet row tagged with the specialty it holds
#[derive(FromRow)]
struct LinkedVet {
    specialty_id: i64,
    #[sqlx(flatten)]
    vet: Vet,
}

/// Specialties; names are unique. Deleting one unlinks it from every vet.
#[derive(Clone)]
pub struct SpecialtyService {
    db: Db,
    specialties: Repository<Specialty>,
}

impl SpecialtyService {
    /// Create the service on the shared store
    pub fn new(db: Db) -> Self {
        Self {
            specialties: Repository::new(db.clone()),
            db,
        }
    }

    /// One page of specialties in insertion order
    pub async fn list(&self, request: PageRequest) -> Result<Page<Specialty>, AppError> {
        self.specialties.list(request).await
    }

    /// Generic field filter search
    pub async fn search(
        &self,
        filters: &Filters,
        request: PageRequest,
    ) -> Result<Page<Specialty>, AppError> {
        self.specialties.search(filters, request).await
    }

    /// Fetch a specialty by id
    pub async fn get(&self, id: i64) -> Result<Option<Specialty>, AppError> {
        self.specialties.get(id).await
    }

    /// Every specialty with the vets holding it, in insertion order
    pub async fn list_with_vets(&self) -> Result<Vec<SpecialtyWithVets>, AppError> {
        let specialties = self.specialties.find_all(&Filters::new(), None).await?;
        let links = sqlx::query_as::<_, LinkedVet>(
            "SELECT vs.specialty_id, v.* FROM vet_specialties vs \
             JOIN vets v ON v.id = vs.vet_id \
             ORDER BY v.id",
        )
        .fetch_all(self.db.pool())
        .await?;

        let mut by_specialty: HashMap<i64, Vec<VetView>> = HashMap::new();
        for link in links {
            by_specialty
                .entry(link.specialty_id)
                .or_default()
                .push(link.vet.into());
        }

        Ok(specialties
            .into_iter()
            .map(|specialty| SpecialtyWithVets {
                vets: by_specialty.remove(&specialty.id).unwrap_or_default(),
                specialty,
            })
            .collect())
    }

    /// Specialty with exactly this name (case-sensitive)
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Specialty>, AppError> {
        self.specialties.find_exact("name", name).await
    }

    /// Specialties whose name contains `term`, case-insensitively
    pub async fn search_by_name(&self, term: &str) -> Result<Vec<Specialty>, AppError> {
        self.specialties.find_text(&["name"], term, None).await
    }

    /// Create a specialty; fails with `DuplicateName` if the name is taken
    pub async fn create(&self, new: NewName) -> Result<Specialty, AppError> {
        ensure_unique_name(&self.specialties, &new.name, None).await?;
        let specialty = self.specialties.create(new.into()).await?;
        info!(specialty_id = specialty.id, name = %specialty.name, "Specialty created");
        Ok(specialty)
    }

    /// Rename a specialty; `None` when it does not exist
    pub async fn update(
        &self,
        id: i64,
        change: NameChange,
    ) -> Result<Option<Specialty>, AppError> {
        if !self.specialties.exists(id).await? {
            return Ok(None);
        }
        if let Some(name) = &change.name {
            ensure_unique_name(&self.specialties, name, Some(id)).await?;
        }
        self.specialties.update(id, change.into()).await
    }

    /// Delete a specialty and its vet links
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        self.specialties.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use crate::store::NewVet;

    #[tokio::test]
    async fn test_create_and_duplicate() {
        let (services, _temp_dir) = create_test_services().await;
        let surgery = services
            .specialties
            .create(NewName {
                name: "Surgery".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(surgery.name, "Surgery");

        let again = services
            .specialties
            .create(NewName {
                name: "Surgery".to_string(),
            })
            .await;
        assert!(matches!(again, Err(AppError::DuplicateName { .. })));

        let all = services
            .specialties
            .list(PageRequest::new(1, 20).unwrap())
            .await
            .unwrap();
        assert_eq!(all.total, 1);
    }

    #[tokio::test]
    async fn test_delete_unlinks_vets() {
        let (services, _temp_dir) = create_test_services().await;
        let dentistry = services
            .specialties
            .create(NewName {
                name: "Dentistry".to_string(),
            })
            .await
            .unwrap();
        let vet = services
            .vets
            .create(NewVet {
                first_name: "Linda".to_string(),
                last_name: "Douglas".to_string(),
            })
            .await
            .unwrap();
        services.vets.add_specialty(vet.id, dentistry.id).await.unwrap();

        assert!(services.specialties.delete(dentistry.id).await.unwrap());
        let detail = services.vets.get_with_specialties(vet.id).await.unwrap().unwrap();
        assert!(detail.specialties.is_empty());
    }

    #[tokio::test]
    async fn test_list_with_vets() {
        let (services, _temp_dir) = create_test_services().await;
        let mut specialties = Vec::new();
        for name in ["radiology", "surgery"] {
            let specialty = services
                .specialties
                .create(NewName {
                    name: name.to_string(),
                })
                .await
                .unwrap();
            specialties.push(specialty);
        }
        for (first, last) in [("Helen", "Leary"), ("Henry", "Stevens")] {
            let vet = services
                .vets
                .create(NewVet {
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                })
                .await
                .unwrap();
            services.vets.add_specialty(vet.id, specialties[0].id).await.unwrap();
        }

        let listed = services.specialties.list_with_vets().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].specialty.name, "radiology");
        let names: Vec<&str> = listed[0].vets.iter().map(|v| v.full_name.as_str()).collect();
        assert_eq!(names, vec!["Helen Leary", "Henry Stevens"]);
        assert!(listed[1].vets.is_empty());
    }

    #[tokio::test]
    async fn test_search_by_name() {
        let (services, _temp_dir) = create_test_services().await;
        for name in ["Radiology", "Cardiology", "Surgery"] {
            services
                .specialties
                .create(NewName {
                    name: name.to_string(),
                })
                .await
                .unwrap();
        }
        let found = services.specialties.search_by_name("LOGY").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(services.specialties.find_by_name("Surgery").await.unwrap().is_some());
    }
}
