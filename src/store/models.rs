//! Clinic data models
//!
//! Persisted entities, their creation inputs and partial-update inputs.

use crate::repository::{Entity, Fields};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A pet owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Owner {
    /// Unique identifier
    pub id: i64,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// Contact telephone number
    pub telephone: String,
    /// When the row was created
    pub created_at: DateTime<Utc>,
    /// When the row was last modified
    pub updated_at: DateTime<Utc>,
}

impl Owner {
    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Owner {
    const TABLE: &'static str = "owners";
    const NAME: &'static str = "Owner";
    const COLUMNS: &'static [&'static str] =
        &["first_name", "last_name", "address", "city", "telephone"];

    fn id(&self) -> i64 {
        self.id
    }
}

/// A kind of animal, e.g. "Cat"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PetType {
    /// Unique identifier
    pub id: i64,
    /// Unique name
    pub name: String,
    /// When the row was created
    pub created_at: DateTime<Utc>,
    /// When the row was last modified
    pub updated_at: DateTime<Utc>,
}

impl Entity for PetType {
    const TABLE: &'static str = "pet_types";
    const NAME: &'static str = "Pet type";
    const COLUMNS: &'static [&'static str] = &["name"];

    fn id(&self) -> i64 {
        self.id
    }
}

/// An animal belonging to an owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Pet {
    /// Unique identifier
    pub id: i64,
    /// Pet name
    pub name: String,
    /// Date of birth, never in the future
    pub birth_date: NaiveDate,
    /// Owning owner
    pub owner_id: i64,
    /// Kind of animal
    pub type_id: i64,
    /// When the row was created
    pub created_at: DateTime<Utc>,
    /// When the row was last modified
    pub updated_at: DateTime<Utc>,
}

impl Pet {
    /// Age in whole years on the given day
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        let mut age = today.year() - self.birth_date.year();
        if (today.month(), today.day()) < (self.birth_date.month(), self.birth_date.day()) {
            age -= 1;
        }
        age
    }
}

impl Entity for Pet {
    const TABLE: &'static str = "pets";
    const NAME: &'static str = "Pet";
    const COLUMNS: &'static [&'static str] = &["name", "birth_date", "owner_id", "type_id"];

    fn id(&self) -> i64 {
        self.id
    }
}

/// A pet's visit to the clinic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Visit {
    /// Unique identifier
    pub id: i64,
    /// Day of the visit, never in the future
    pub visit_date: NaiveDate,
    /// Free-text notes
    pub description: String,
    /// Visiting pet
    pub pet_id: i64,
    /// When the row was created
    pub created_at: DateTime<Utc>,
    /// When the row was last modified
    pub updated_at: DateTime<Utc>,
}

impl Entity for Visit {
    const TABLE: &'static str = "visits";
    const NAME: &'static str = "Visit";
    const COLUMNS: &'static [&'static str] = &["visit_date", "description", "pet_id"];

    fn id(&self) -> i64 {
        self.id
    }
}

/// A veterinarian
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vet {
    /// Unique identifier
    pub id: i64,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// When the row was created
    pub created_at: DateTime<Utc>,
    /// When the row was last modified
    pub updated_at: DateTime<Utc>,
}

impl Vet {
    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Vet {
    const TABLE: &'static str = "vets";
    const NAME: &'static str = "Vet";
    const COLUMNS: &'static [&'static str] = &["first_name", "last_name"];

    fn id(&self) -> i64 {
        self.id
    }
}

/// A veterinary specialty, e.g. "Surgery"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Specialty {
    /// Unique identifier
    pub id: i64,
    /// Unique name
    pub name: String,
    /// When the row was created
    pub created_at: DateTime<Utc>,
    /// When the row was last modified
    pub updated_at: DateTime<Utc>,
}

impl Entity for Specialty {
    const TABLE: &'static str = "specialties";
    const NAME: &'static str = "Specialty";
    const COLUMNS: &'static [&'static str] = &["name"];

    fn id(&self) -> i64 {
        self.id
    }
}

// Inputs

/// Fields required to register an owner
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewOwner {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// Telephone number
    pub telephone: String,
}

/// Partial owner update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OwnerChanges {
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// City
    pub city: Option<String>,
    /// Telephone number
    pub telephone: Option<String>,
}

/// Fields required to register a pet
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewPet {
    /// Name
    pub name: String,
    /// Date of birth
    pub birth_date: NaiveDate,
    /// Owning owner
    pub owner_id: i64,
    /// Kind of animal
    pub type_id: i64,
}

/// Partial pet update
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PetChanges {
    /// Name
    pub name: Option<String>,
    /// Date of birth
    pub birth_date: Option<NaiveDate>,
    /// Owning owner
    pub owner_id: Option<i64>,
    /// Kind of animal
    pub type_id: Option<i64>,
}

/// Fields required to record a visit
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewVisit {
    /// Day of the visit
    pub visit_date: NaiveDate,
    /// What was done
    pub description: String,
    /// Visiting pet
    pub pet_id: i64,
}

/// Partial visit update
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VisitChanges {
    /// Day of the visit
    pub visit_date: Option<NaiveDate>,
    /// What was done
    pub description: Option<String>,
    /// Visiting pet
    pub pet_id: Option<i64>,
}

/// Fields required to register a vet
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewVet {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
}

/// Partial vet update
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VetChanges {
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
}

/// Name for a new pet type or specialty
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewName {
    /// Name
    pub name: String,
}

/// Rename of a pet type or specialty
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NameChange {
    /// Name
    pub name: Option<String>,
}

/// Check a required text field: not blank and at most `max` characters
fn check_text(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    if value.chars().count() > max {
        return Err(format!("{} exceeds maximum length of {} characters", field, max));
    }
    Ok(())
}

fn check_opt_text(field: &str, value: Option<&String>, max: usize) -> Result<(), String> {
    match value {
        Some(value) => check_text(field, value, max),
        None => Ok(()),
    }
}

impl NewOwner {
    /// Validate field shapes
    pub fn validate(&self) -> Result<(), String> {
        check_text("first_name", &self.first_name, 30)?;
        check_text("last_name", &self.last_name, 30)?;
        check_text("address", &self.address, 255)?;
        check_text("city", &self.city, 80)?;
        check_text("telephone", &self.telephone, 20)
    }
}

impl OwnerChanges {
    /// Validate the supplied field shapes
    pub fn validate(&self) -> Result<(), String> {
        check_opt_text("first_name", self.first_name.as_ref(), 30)?;
        check_opt_text("last_name", self.last_name.as_ref(), 30)?;
        check_opt_text("address", self.address.as_ref(), 255)?;
        check_opt_text("city", self.city.as_ref(), 80)?;
        check_opt_text("telephone", self.telephone.as_ref(), 20)
    }
}

impl NewPet {
    /// Validate field shapes
    pub fn validate(&self) -> Result<(), String> {
        check_text("name", &self.name, 30)
    }
}

impl PetChanges {
    /// Validate the supplied field shapes
    pub fn validate(&self) -> Result<(), String> {
        check_opt_text("name", self.name.as_ref(), 30)
    }
}

impl NewVisit {
    /// Validate field shapes
    pub fn validate(&self) -> Result<(), String> {
        check_text("description", &self.description, 1000)
    }
}

impl VisitChanges {
    /// Validate the supplied field shapes
    pub fn validate(&self) -> Result<(), String> {
        check_opt_text("description", self.description.as_ref(), 1000)
    }
}

impl NewVet {
    /// Validate field shapes
    pub fn validate(&self) -> Result<(), String> {
        check_text("first_name", &self.first_name, 30)?;
        check_text("last_name", &self.last_name, 30)
    }
}

impl VetChanges {
    /// Validate the supplied field shapes
    pub fn validate(&self) -> Result<(), String> {
        check_opt_text("first_name", self.first_name.as_ref(), 30)?;
        check_opt_text("last_name", self.last_name.as_ref(), 30)
    }
}

impl NewName {
    /// Validate field shapes
    pub fn validate(&self) -> Result<(), String> {
        check_text("name", &self.name, 80)
    }
}

impl NameChange {
    /// Validate the supplied field shapes
    pub fn validate(&self) -> Result<(), String> {
        check_opt_text("name", self.name.as_ref(), 80)
    }
}

impl From<NewOwner> for Fields {
    fn from(owner: NewOwner) -> Self {
        Fields::new()
            .set("first_name", owner.first_name)
            .set("last_name", owner.last_name)
            .set("address", owner.address)
            .set("city", owner.city)
            .set("telephone", owner.telephone)
    }
}

impl From<OwnerChanges> for Fields {
    fn from(changes: OwnerChanges) -> Self {
        Fields::new()
            .set_opt("first_name", changes.first_name)
            .set_opt("last_name", changes.last_name)
            .set_opt("address", changes.address)
            .set_opt("city", changes.city)
            .set_opt("telephone", changes.telephone)
    }
}

impl From<NewPet> for Fields {
    fn from(pet: NewPet) -> Self {
        Fields::new()
            .set("name", pet.name)
            .set("birth_date", pet.birth_date)
            .set("owner_id", pet.owner_id)
            .set("type_id", pet.type_id)
    }
}

impl From<PetChanges> for Fields {
    fn from(changes: PetChanges) -> Self {
        Fields::new()
            .set_opt("name", changes.name)
            .set_opt("birth_date", changes.birth_date)
            .set_opt("owner_id", changes.owner_id)
            .set_opt("type_id", changes.type_id)
    }
}

impl From<NewVisit> for Fields {
    fn from(visit: NewVisit) -> Self {
        Fields::new()
            .set("visit_date", visit.visit_date)
            .set("description", visit.description)
            .set("pet_id", visit.pet_id)
    }
}

impl From<VisitChanges> for Fields {
    fn from(changes: VisitChanges) -> Self {
        Fields::new()
            .set_opt("visit_date", changes.visit_date)
            .set_opt("description", changes.description)
            .set_opt("pet_id", changes.pet_id)
    }
}

impl From<NewVet> for Fields {
    fn from(vet: NewVet) -> Self {
        Fields::new()
            .set("first_name", vet.first_name)
            .set("last_name", vet.last_name)
    }
}

impl From<VetChanges> for Fields {
    fn from(changes: VetChanges) -> Self {
        Fields::new()
            .set_opt("first_name", changes.first_name)
            .set_opt("last_name", changes.last_name)
    }
}

impl From<NewName> for Fields {
    fn from(new: NewName) -> Self {
        Fields::new().set("name", new.name)
    }
}

impl From<NameChange> for Fields {
    fn from(change: NameChange) -> Self {
        Fields::new().set_opt("name", change.name)
    }
}
