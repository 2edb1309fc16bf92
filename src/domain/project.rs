// ============================================================
// Layer 3 — Project Domain Types
// ============================================================
// A project is described by eleven numeric difficulty ratings
// and, optionally, three free-text fields. Training records
// additionally carry the three targets.
//
// NUMERIC_COLUMNS fixes the feature order. The normalizer is
// fit against this order and the artifact manifest records it,
// so inference refuses any artifact built with another order.

use serde::{Deserialize, Serialize};

use crate::domain::discipline::{Discipline, NUM_DISCIPLINES};

/// Number of numeric rating features.
pub const NUM_NUMERIC: usize = 11;

/// Numeric feature names, in model input order.
pub const NUMERIC_COLUMNS: [&str; NUM_NUMERIC] = [
    "MovingParts",
    "ForceTorque",
    "WeightConstraints",
    "ElectronicsComplexity",
    "PowerConsumption",
    "SoftwareComplexity",
    "MaterialDifficulty",
    "ChemicalFluids",
    "StructuralLoad",
    "Aerodynamics",
    "EnvironmentalConstraints",
];

/// Free-text field names, in concatenation order.
pub const TEXT_COLUMNS: [&str; 3] = ["ProjectName", "PrimaryTechnology", "ProjectDescription"];

/// The eleven ratings of one project, in NUMERIC_COLUMNS order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ratings(pub [f32; NUM_NUMERIC]);

impl Ratings {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// The three descriptive text fields of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectText {
    pub name:        String,
    pub technology:  String,
    pub description: String,
}

impl ProjectText {
    pub fn new(
        name:        impl Into<String>,
        technology:  impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name:        name.into(),
            technology:  technology.into(),
            description: description.into(),
        }
    }

    /// Single string fed to the text vectorizer:
    /// "<name> <technology> <description>"
    pub fn combined(&self) -> String {
        format!("{} {} {}", self.name, self.technology, self.description)
    }
}

/// Supervised targets of a training record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectLabels {
    pub primary_field: Discipline,
    /// Percentages in Discipline::ALL order. Expected to sum to
    /// roughly 100 but nothing enforces it.
    pub contributions: [f32; NUM_DISCIPLINES],
    pub complexity:    f32,
}

/// The features of a project, as received at inference time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInput {
    pub ratings: Ratings,
    pub text:    Option<ProjectText>,
}

/// One labelled row of the training data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub input:  ProjectInput,
    pub labels: ProjectLabels,
}

/// Which inputs a trained model consumes. Derived from the artifact
/// so request validation knows whether the text fields are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub uses_text: bool,
}

impl FeatureSchema {
    pub fn required_keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = NUMERIC_COLUMNS.to_vec();
        if self.uses_text {
            keys.extend_from_slice(&TEXT_COLUMNS);
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_text_joins_with_spaces() {
        let t = ProjectText::new("Drone", "Flight Control", "autonomous quadrotor");
        assert_eq!(t.combined(), "Drone Flight Control autonomous quadrotor");
    }

    #[test]
    fn test_required_keys_depend_on_schema() {
        assert_eq!(FeatureSchema { uses_text: false }.required_keys().len(), 11);
        let with_text = FeatureSchema { uses_text: true }.required_keys();
        assert_eq!(with_text.len(), 14);
        assert!(with_text.contains(&"ProjectDescription"));
    }
}
