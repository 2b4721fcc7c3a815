//! Pet Clinic Backend Library
//!
//! Record keeping for a veterinary clinic: owners, pets, pet types, visits,
//! vets and specialties over SQLite, with the axum handlers that expose them.
//! The server binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod error;
pub mod repository;
pub mod services;
pub mod state;
pub mod store;
