//! Nested read models
//!
//! Each view is produced by one named service read that states what it
//! loads; nothing here triggers further queries.

use crate::store::models::{Owner, Pet, PetType, Specialty, Vet, Visit};
use serde::Serialize;
use sqlx::FromRow;

/// Owner row with its display name
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OwnerView {
    /// The owner row
    #[serde(flatten)]
    pub owner: Owner,
    /// "First Last"
    pub full_name: String,
}

impl From<Owner> for OwnerView {
    fn from(owner: Owner) -> Self {
        Self {
            full_name: owner.full_name(),
            owner,
        }
    }
}

/// Owner with its pets
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OwnerDetail {
    /// The owner row
    #[serde(flatten)]
    pub owner: Owner,
    /// "First Last"
    pub full_name: String,
    /// Pets in insertion order
    pub pets: Vec<Pet>,
}

/// Owner reference embedded in pet output
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OwnerSummary {
    /// Owner id
    pub id: i64,
    /// "First Last"
    pub full_name: String,
}

/// Pet type reference embedded in pet output
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PetTypeSummary {
    /// Pet type id
    pub id: i64,
    /// Pet type name
    pub name: String,
}

/// Pet with owner, type and visits
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PetDetail {
    /// The pet row
    #[serde(flatten)]
    pub pet: Pet,
    /// Whole years since birth
    pub age: i32,
    /// Owning owner
    pub owner: OwnerSummary,
    /// Kind of animal
    #[serde(rename = "type")]
    pub pet_type: PetTypeSummary,
    /// Visits, newest first
    pub visits: Vec<Visit>,
}

impl PetDetail {
    pub(crate) fn new(
        pet: Pet,
        age: i32,
        owner: &Owner,
        pet_type: &PetType,
        visits: Vec<Visit>,
    ) -> Self {
        Self {
            pet,
            age,
            owner: OwnerSummary {
                id: owner.id,
                full_name: owner.full_name(),
            },
            pet_type: PetTypeSummary {
                id: pet_type.id,
                name: pet_type.name.clone(),
            },
            visits,
        }
    }
}

/// Pet reference embedded in visit output
#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
pub struct VisitPetSummary {
    /// Pet id
    pub id: i64,
    /// Pet name
    pub name: String,
    /// Owner's full name
    pub owner: String,
}

/// Visit with its pet and the pet's owner name
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VisitDetail {
    /// The visit row
    #[serde(flatten)]
    pub visit: Visit,
    /// Visiting pet
    pub pet: VisitPetSummary,
}

/// Vet row with its display name
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VetView {
    /// The vet row
    #[serde(flatten)]
    pub vet: Vet,
    /// "First Last"
    pub full_name: String,
}

impl From<Vet> for VetView {
    fn from(vet: Vet) -> Self {
        Self {
            full_name: vet.full_name(),
            vet,
        }
    }
}

/// Vet with specialties
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VetDetail {
    /// The vet row
    #[serde(flatten)]
    pub vet: Vet,
    /// "First Last"
    pub full_name: String,
    /// Specialties ordered by name
    pub specialties: Vec<Specialty>,
}

impl VetDetail {
    pub(crate) fn new(vet: Vet, specialties: Vec<Specialty>) -> Self {
        Self {
            full_name: vet.full_name(),
            vet,
            specialties,
        }
    }
}

/// Pet type with every pet of that type
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PetTypeWithPets {
    /// The pet type row
    #[serde(flatten)]
    pub pet_type: PetType,
    /// Pets in insertion order
    pub pets: Vec<Pet>,
}

/// Specialty with the vets holding it
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpecialtyWithVets {
    /// The specialty row
    #[serde(flatten)]
    pub specialty: Specialty,
    /// Vets in insertion order
    pub vets: Vec<VetView>,
}
