//! medcheck-common — Shared types and errors used across all Medcheck crates.

pub mod error;
pub mod entities;

// Re-export commonly used types
pub use entities::{
    Gender, InteractionRecord, MedicationEntry, PatientContext, Route, Severity, Verdict,
    CONFLICT_DESCRIPTION,
};
pub use error::{MedcheckError, Result};
