//! Vet service
//!
//! Vets and their many-to-many link to specialties. Links live in the
//! `vet_specialties` table keyed by (vet_id, specialty_id), so a vet can hold
//! a specialty at most once.

use crate::error::AppError;
use crate::repository::fields::contains_pattern;
use crate::repository::{Filters, Page, PageRequest, Repository};
use crate::services::ensure_exists;
use crate::store::{Db, NewVet, Specialty, Vet, VetChanges, VetDetail};
use sqlx::{FromRow, QueryBuilder, Sqlite};
use std::collections::HashMap;
use tracing::{debug, info};

/// A specialty row tagged with the vet it is linked to
#[derive(FromRow)]
struct LinkedSpecialty {
    vet_id: i64,
    #[sqlx(flatten)]
    specialty: Specialty,
}

/// Vet records and vet-specialty links
#[derive(Clone)]
pub struct VetService {
    db: Db,
    vets: Repository<Vet>,
    specialties: Repository<Specialty>,
}

impl VetService {
    /// Create the service on the shared store
    pub fn new(db: Db) -> Self {
        Self {
            vets: Repository::new(db.clone()),
            specialties: Repository::new(db.clone()),
            db,
        }
    }

    /// One page of vets in insertion order
    pub async fn list(&self, request: PageRequest) -> Result<Page<Vet>, AppError> {
        self.vets.list(request).await
    }

    /// One page of vets, each with its specialties
    pub async fn list_with_specialties(
        &self,
        request: PageRequest,
    ) -> Result<Page<VetDetail>, AppError> {
        let page = self.vets.list(request).await?;
        let total = page.total;
        let details = self.attach_specialties(page.items).await?;
        Ok(Page::new(details, total, request))
    }

    /// Generic field filter search
    pub async fn search(&self, filters: &Filters, request: PageRequest) -> Result<Page<Vet>, AppError> {
        self.vets.search(filters, request).await
    }

    /// Fetch a vet by id
    pub async fn get(&self, id: i64) -> Result<Option<Vet>, AppError> {
        self.vets.get(id).await
    }

    /// Fetch a vet with its specialties ordered by name
    pub async fn get_with_specialties(&self, id: i64) -> Result<Option<VetDetail>, AppError> {
        let Some(vet) = self.vets.get(id).await? else {
            return Ok(None);
        };
        Ok(self.attach_specialties(vec![vet]).await?.pop())
    }

    /// Register a vet
    pub async fn create(&self, vet: NewVet) -> Result<Vet, AppError> {
        let vet = self.vets.create(vet.into()).await?;
        info!(vet_id = vet.id, "Vet created");
        Ok(vet)
    }

    /// Apply a partial update; `None` when the vet does not exist
    pub async fn update(&self, id: i64, changes: VetChanges) -> Result<Option<Vet>, AppError> {
        self.vets.update(id, changes.into()).await
    }

    /// Delete a vet and its specialty links
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let deleted = self.vets.delete(id).await?;
        if deleted {
            info!(vet_id = id, "Vet deleted");
        }
        Ok(deleted)
    }

    /// Vets whose first or last name contains `name`
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Vet>, AppError> {
        self.vets
            .find_text(&["first_name", "last_name"], name, None)
            .await
    }

    /// Vets holding a specialty whose name contains `specialty`
    pub async fn find_by_specialty(&self, specialty: &str) -> Result<Vec<Vet>, AppError> {
        let vets = sqlx::query_as::<_, Vet>(
            "SELECT DISTINCT v.* FROM vets v \
             JOIN vet_specialties vs ON vs.vet_id = v.id \
             JOIN specialties s ON s.id = vs.specialty_id \
             WHERE s.name REGEXP ? \
             ORDER BY v.id",
        )
        .bind(contains_pattern(specialty))
        .fetch_all(self.db.pool())
        .await?;
        Ok(vets)
    }

    /// Link a specialty to a vet
    ///
    /// # Returns
    /// * `Ok(Some(VetDetail))` - the vet after linking
    /// * `Ok(None)` - the vet already had this specialty
    /// * `Err(AppError::ReferenceNotFound)` - vet or specialty missing
    pub async fn add_specialty(
        &self,
        vet_id: i64,
        specialty_id: i64,
    ) -> Result<Option<VetDetail>, AppError> {
        ensure_exists(&self.vets, vet_id).await?;
        ensure_exists(&self.specialties, specialty_id).await?;

        let mut tx = self.db.pool().begin().await?;
        let result = sqlx::query(
            "INSERT OR IGNORE INTO vet_specialties (vet_id, specialty_id) VALUES (?, ?)",
        )
        .bind(vet_id)
        .bind(specialty_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        if result.rows_affected() == 0 {
            debug!(vet_id, specialty_id, "Specialty already linked");
            return Ok(None);
        }
        info!(vet_id, specialty_id, "Specialty added to vet");
        self.get_with_specialties(vet_id).await
    }

    /// Unlink a specialty from a vet
    ///
    /// # Returns
    /// * `Ok(Some(VetDetail))` - the vet after unlinking
    /// * `Ok(None)` - the vet did not have this specialty
    /// * `Err(AppError::ReferenceNotFound)` - vet or specialty missing
    pub async fn remove_specialty(
        &self,
        vet_id: i64,
        specialty_id: i64,
    ) -> Result<Option<VetDetail>, AppError> {
        ensure_exists(&self.vets, vet_id).await?;
        ensure_exists(&self.specialties, specialty_id).await?;

        let mut tx = self.db.pool().begin().await?;
        let result =
            sqlx::query("DELETE FROM vet_specialties WHERE vet_id = ? AND specialty_id = ?")
                .bind(vet_id)
                .bind(specialty_id)
                .execute(&mut *tx)
                .await?;
        tx.commit().await?;

        if result.rows_affected() == 0 {
            debug!(vet_id, specialty_id, "Specialty was not linked");
            return Ok(None);
        }
        info!(vet_id, specialty_id, "Specialty removed from vet");
        self.get_with_specialties(vet_id).await
    }

    /// Load the specialties of every vet in one query and pair them up,
    /// preserving the order of `vets`
    pub async fn attach_specialties(&self, vets: Vec<Vet>) -> Result<Vec<VetDetail>, AppError> {
        if vets.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT vs.vet_id, s.* FROM vet_specialties vs \
             JOIN specialties s ON s.id = vs.specialty_id \
             WHERE vs.vet_id IN (",
        );
        let mut ids = qb.separated(", ");
        for vet in &vets {
            ids.push_bind(vet.id);
        }
        qb.push(") ORDER BY s.name, s.id");

        let links = qb
            .build_query_as::<LinkedSpecialty>()
            .fetch_all(self.db.pool())
            .await?;

        let mut by_vet: HashMap<i64, Vec<Specialty>> = HashMap::new();
        for link in links {
            by_vet.entry(link.vet_id).or_default().push(link.specialty);
        }

        Ok(vets
            .into_iter()
            .map(|vet| {
                let specialties = by_vet.remove(&vet.id).unwrap_or_default();
                VetDetail::new(vet, specialties)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use crate::services::Services;
    use crate::store::NewName;

    async fn add_vet(services: &Services, first: &str, last: &str) -> Vet {
        services
            .vets
            .create(NewVet {
                first_name: first.to_string(),
                last_name: last.to_string(),
            })
            .await
            .unwrap()
    }

    async fn add_specialty(services: &Services, name: &str) -> Specialty {
        services
            .specialties
            .create(NewName {
                name: name.to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_attach_twice_reports_unchanged() {
        let (services, _temp_dir) = create_test_services().await;
        let vet = add_vet(&services, "Helen", "Leary").await;
        let radiology = add_specialty(&services, "Radiology").await;

        let detail = services
            .vets
            .add_specialty(vet.id, radiology.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.specialties.len(), 1);
        assert_eq!(detail.full_name, "Helen Leary");

        let again = services.vets.add_specialty(vet.id, radiology.id).await.unwrap();
        assert!(again.is_none());

        let detail = services.vets.get_with_specialties(vet.id).await.unwrap().unwrap();
        assert_eq!(detail.specialties.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_absent_link() {
        let (services, _temp_dir) = create_test_services().await;
        let vet = add_vet(&services, "James", "Carter").await;
        let surgery = add_specialty(&services, "Surgery").await;

        let result = services.vets.remove_specialty(vet.id, surgery.id).await.unwrap();
        assert!(result.is_none());

        services.vets.add_specialty(vet.id, surgery.id).await.unwrap();
        let detail = services
            .vets
            .remove_specialty(vet.id, surgery.id)
            .await
            .unwrap()
            .unwrap();
        assert!(detail.specialties.is_empty());
    }

    #[tokio::test]
    async fn test_links_require_both_records() {
        let (services, _temp_dir) = create_test_services().await;
        let vet = add_vet(&services, "Rafael", "Ortega").await;
        let surgery = add_specialty(&services, "Surgery").await;

        let missing_specialty = services.vets.add_specialty(vet.id, surgery.id + 5).await;
        assert!(matches!(missing_specialty, Err(AppError::ReferenceNotFound(_))));
        let missing_vet = services.vets.remove_specialty(vet.id + 5, surgery.id).await;
        assert!(matches!(missing_vet, Err(AppError::ReferenceNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_with_specialties() {
        let (services, _temp_dir) = create_test_services().await;
        let linda = add_vet(&services, "Linda", "Douglas").await;
        let sharon = add_vet(&services, "Sharon", "Jenkins").await;
        let surgery = add_specialty(&services, "Surgery").await;
        let dentistry = add_specialty(&services, "Dentistry").await;
        services.vets.add_specialty(linda.id, surgery.id).await.unwrap();
        services.vets.add_specialty(linda.id, dentistry.id).await.unwrap();

        let page = services
            .vets
            .list_with_specialties(PageRequest::new(1, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].vet.id, linda.id);
        let names: Vec<&str> = page.items[0]
            .specialties
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Dentistry", "Surgery"]);
        assert_eq!(page.items[1].vet.id, sharon.id);
        assert!(page.items[1].specialties.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_name_and_specialty() {
        let (services, _temp_dir) = create_test_services().await;
        let henry = add_vet(&services, "Henry", "Stevens").await;
        add_vet(&services, "Sharon", "Jenkins").await;
        let radiology = add_specialty(&services, "Radiology").await;
        services.vets.add_specialty(henry.id, radiology.id).await.unwrap();

        assert_eq!(services.vets.find_by_name("steV").await.unwrap().len(), 1);
        assert_eq!(services.vets.find_by_name("en").await.unwrap().len(), 2);

        let radiologists = services.vets.find_by_specialty("radio").await.unwrap();
        assert_eq!(radiologists.len(), 1);
        assert_eq!(radiologists[0].id, henry.id);
        assert!(services.vets.find_by_specialty("surgery").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_links() {
        let (services, _temp_dir) = create_test_services().await;
        let vet = add_vet(&services, "Linda", "Douglas").await;
        let surgery = add_specialty(&services, "Surgery").await;
        services.vets.add_specialty(vet.id, surgery.id).await.unwrap();

        assert!(services.vets.delete(vet.id).await.unwrap());
        assert!(services.specialties.get(surgery.id).await.unwrap().is_some());
        assert!(services.vets.find_by_specialty("Surgery").await.unwrap().is_empty());
    }
}
