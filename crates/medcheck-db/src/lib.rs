//! MedCheck storage layer.
//!
//! An embedded SQLite database holding user accounts, their patient profile
//! and the medication list each user has entered.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use medcheck_db::{Database, MedicationRepository};
//! use medcheck_common::MedicationEntry;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Arc::new(Database::open("./data/medcheck.db")?);
//!     let meds = MedicationRepository::new(db);
//!     meds.add("alice", &MedicationEntry::new("Aspirin", "81mg"))?;
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod medications;
pub mod users;

pub use database::{Database, DatabaseStats};
pub use error::{DbError, Result};
pub use medications::MedicationRepository;
pub use users::UserRepository;
