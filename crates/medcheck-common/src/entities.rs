/// Core domain types shared by the interaction pipeline, the store and the API.
/// Patient context and medication entries are read from storage per request;
/// interaction records are built fresh for every compatibility check.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MedcheckError, Result};

/// Description attached to every pair the evaluator flags.
pub const CONFLICT_DESCRIPTION: &str = "Potential conflict detected";

// ---------------------------------------------------------------------------
// Route of administration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Oral,
    #[serde(rename = "IV")]
    Iv,
    Topical,
    Inhalation,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Oral, Route::Iv, Route::Topical, Route::Inhalation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Oral       => "Oral",
            Route::Iv         => "IV",
            Route::Topical    => "Topical",
            Route::Inhalation => "Inhalation",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = MedcheckError;

    fn from_str(s: &str) -> Result<Self> {
        Route::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| MedcheckError::Validation(format!("unknown route of administration: {s}")))
    }
}

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male   => "Male",
            Gender::Female => "Female",
            Gender::Other  => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = MedcheckError;

    fn from_str(s: &str) -> Result<Self> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| MedcheckError::Validation(format!("unknown gender: {s}")))
    }
}

// ---------------------------------------------------------------------------
// Patient context
// ---------------------------------------------------------------------------

/// Health attributes embedded into every classification prompt.
///
/// The values are opaque payload text for the prompt; nothing computes on
/// them beyond the non-negativity check in [`PatientContext::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientContext {
    pub height_cm: f64,
    pub weight_kg: f64,
    #[serde(default)]
    pub comorbidities: String,
    pub route: Route,
    pub gender: Gender,
    #[serde(default)]
    pub substance_use: String,
}

impl PatientContext {
    pub fn validate(&self) -> Result<()> {
        if !(self.height_cm >= 0.0) {
            return Err(MedcheckError::Validation(format!(
                "height must be non-negative, got {}",
                self.height_cm
            )));
        }
        if !(self.weight_kg >= 0.0) {
            return Err(MedcheckError::Validation(format!(
                "weight must be non-negative, got {}",
                self.weight_kg
            )));
        }
        Ok(())
    }

    /// Human-readable single line used inside prompts.
    pub fn summary_line(&self) -> String {
        format!(
            "Height: {} cm, Weight: {} kg, Comorbidities: {}, Route: {}, Gender: {}, Substance Use: {}",
            self.height_cm,
            self.weight_kg,
            self.comorbidities,
            self.route,
            self.gender,
            self.substance_use,
        )
    }
}

// ---------------------------------------------------------------------------
// Medication entry
// ---------------------------------------------------------------------------

/// One line of a user's medication list. Names are not unique: two entries
/// with the same name are still distinct list positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationEntry {
    pub name: String,
    pub dosage: String,
}

impl MedicationEntry {
    pub fn new(name: impl Into<String>, dosage: impl Into<String>) -> Self {
        Self { name: name.into(), dosage: dosage.into() }
    }

    /// Both fields are required when a user records a medication.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.dosage.trim().is_empty() {
            return Err(MedcheckError::Validation(
                "please enter both medication and dosage".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Ternary classification of one drug pair.
///
/// `Unknown` is neither safe nor a conflict. It never produces a record but
/// stays observable in evaluation reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Safe,
    Conflict,
    Unknown,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe     => "SAFE",
            Verdict::Conflict => "CONFLICT",
            Verdict::Unknown  => "UNKNOWN",
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Verdict::Conflict)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Interaction severity. The evaluator only ever emits `High`; the graded
/// values are kept for records produced elsewhere. Labels outside the known
/// set deserialize to `Unrecognized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    High,
    Moderate,
    Mild,
    None,
    Unrecognized,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High         => "high",
            Severity::Moderate     => "moderate",
            Severity::Mild         => "mild",
            Severity::None         => "none",
            Severity::Unrecognized => "unrecognized",
        }
    }

    /// Parse a stored label, falling back to `Unrecognized`.
    pub fn from_label(s: &str) -> Self {
        match s {
            "high"     => Severity::High,
            "moderate" => Severity::Moderate,
            "mild"     => Severity::Mild,
            "none"     => Severity::None,
            _          => Severity::Unrecognized,
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        Severity::from_label(&s)
    }
}

impl From<Severity> for String {
    fn from(s: Severity) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Interaction record
// ---------------------------------------------------------------------------

/// A flagged drug pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: Severity,
    pub description: String,
}

impl InteractionRecord {
    pub fn new(
        drug_a: impl Into<String>,
        drug_b: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            drug_a: drug_a.into(),
            drug_b: drug_b.into(),
            severity,
            description: description.into(),
        }
    }

    /// The record produced for a pair classified as `Verdict::Conflict`.
    pub fn conflict(drug_a: impl Into<String>, drug_b: impl Into<String>) -> Self {
        Self::new(drug_a, drug_b, Severity::High, CONFLICT_DESCRIPTION)
    }

    /// Hover/label text shown for this interaction.
    pub fn label(&self) -> String {
        format!("{} - {}: {}", self.drug_a, self.drug_b, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_context() -> PatientContext {
        PatientContext {
            height_cm: 172.5,
            weight_kg: 68.0,
            comorbidities: "hypertension, asthma".to_string(),
            route: Route::Oral,
            gender: Gender::Female,
            substance_use: "occasional alcohol".to_string(),
        }
    }

    #[test]
    fn test_summary_line_contains_every_attribute() {
        let line = sample_context().summary_line();
        assert_eq!(
            line,
            "Height: 172.5 cm, Weight: 68 kg, Comorbidities: hypertension, asthma, \
             Route: Oral, Gender: Female, Substance Use: occasional alcohol"
        );
    }

    #[test]
    fn test_negative_height_is_rejected() {
        let mut ctx = sample_context();
        ctx.height_cm = -1.0;
        assert!(ctx.validate().is_err());
        ctx.height_cm = 0.0;
        assert!(ctx.validate().is_ok());
    }

    #[test]
    fn test_route_labels_parse_back() {
        assert_eq!("IV".parse::<Route>().unwrap(), Route::Iv);
        assert_eq!("Inhalation".parse::<Route>().unwrap(), Route::Inhalation);
        assert!("Intravenous".parse::<Route>().is_err());
        assert_eq!(serde_json::to_string(&Route::Iv).unwrap(), "\"IV\"");
    }

    #[test]
    fn test_unknown_severity_label_is_unrecognized() {
        let sev: Severity = serde_json::from_str("\"catastrophic\"").unwrap();
        assert_eq!(sev, Severity::Unrecognized);
        let sev: Severity = serde_json::from_str("\"moderate\"").unwrap();
        assert_eq!(sev, Severity::Moderate);
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
    }

    #[test]
    fn test_conflict_record_label() {
        let rec = InteractionRecord::conflict("Aspirin", "Warfarin");
        assert_eq!(rec.severity, Severity::High);
        assert_eq!(rec.label(), "Aspirin - Warfarin: Potential conflict detected");
    }

    #[test]
    fn test_medication_requires_name_and_dosage() {
        assert!(MedicationEntry::new("Aspirin", "").validate().is_err());
        assert!(MedicationEntry::new("  ", "81mg").validate().is_err());
        assert!(MedicationEntry::new("Aspirin", "81mg").validate().is_ok());
    }
}
