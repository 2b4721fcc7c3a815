//! Store module
//!
//! Relational persistence for the clinic records using SQLite.

pub mod db;
pub mod models;
pub mod views;

pub use db::Db;
pub use models::{
    NameChange, NewName, NewOwner, NewPet, NewVet, NewVisit, Owner, OwnerChanges, Pet,
    PetChanges, PetType, Specialty, Vet, VetChanges, Visit, VisitChanges,
};
pub use views::{
    OwnerDetail, OwnerView, PetDetail, PetTypeWithPets, SpecialtyWithVets, VetDetail, VetView,
    VisitDetail, VisitPetSummary,
};
