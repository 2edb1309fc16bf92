// ============================================================
// Layer 4 — CSV Record Loader
// ============================================================
// Reads the training table with the `csv` crate and serde.
//
// Expected header (order does not matter, names do):
//   11 rating columns          MovingParts … EnvironmentalConstraints
//   3 optional text columns    ProjectName, PrimaryTechnology,
//                              ProjectDescription
//   labels                     PrimaryField, <Discipline>_Pct ×10,
//                              ProjectComplexity
//
// A malformed row aborts the whole load with the row number in
// the error, training on a partially-read file is never useful.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::{
    discipline::Discipline,
    project::{ProjectInput, ProjectLabels, ProjectRecord, ProjectText, Ratings, TEXT_COLUMNS},
    traits::RecordSource,
};

/// One CSV row exactly as it appears on disk.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProjectRow {
    moving_parts:              f32,
    force_torque:              f32,
    weight_constraints:        f32,
    electronics_complexity:    f32,
    power_consumption:         f32,
    software_complexity:       f32,
    material_difficulty:       f32,
    chemical_fluids:           f32,
    structural_load:           f32,
    aerodynamics:              f32,
    environmental_constraints: f32,

    #[serde(default)]
    project_name:        Option<String>,
    #[serde(default)]
    primary_technology:  Option<String>,
    #[serde(default)]
    project_description: Option<String>,

    primary_field: String,

    #[serde(rename = "Mechanical_Pct")]
    mechanical_pct:    f32,
    #[serde(rename = "Electrical_Pct")]
    electrical_pct:    f32,
    #[serde(rename = "Civil_Pct")]
    civil_pct:         f32,
    #[serde(rename = "Chemical_Pct")]
    chemical_pct:      f32,
    #[serde(rename = "Computer_Pct")]
    computer_pct:      f32,
    #[serde(rename = "Software_Pct")]
    software_pct:      f32,
    #[serde(rename = "Aerospace_Pct")]
    aerospace_pct:     f32,
    #[serde(rename = "Materials_Pct")]
    materials_pct:     f32,
    #[serde(rename = "Environmental_Pct")]
    environmental_pct: f32,
    #[serde(rename = "Industrial_Pct")]
    industrial_pct:    f32,

    project_complexity: f32,
}

impl ProjectRow {
    /// `has_text` is true when the file carries all three text
    /// columns. An empty cell in those columns reads as "".
    fn into_record(self, has_text: bool) -> Result<ProjectRecord> {
        let ratings = Ratings([
            self.moving_parts,
            self.force_torque,
            self.weight_constraints,
            self.electronics_complexity,
            self.power_consumption,
            self.software_complexity,
            self.material_difficulty,
            self.chemical_fluids,
            self.structural_load,
            self.aerodynamics,
            self.environmental_constraints,
        ]);

        let text = has_text.then(|| {
            ProjectText::new(
                self.project_name.unwrap_or_default(),
                self.primary_technology.unwrap_or_default(),
                self.project_description.unwrap_or_default(),
            )
        });

        let labels = ProjectLabels {
            primary_field: self.primary_field.parse::<Discipline>()?,
            contributions: [
                self.mechanical_pct,
                self.electrical_pct,
                self.civil_pct,
                self.chemical_pct,
                self.computer_pct,
                self.software_pct,
                self.aerospace_pct,
                self.materials_pct,
                self.environmental_pct,
                self.industrial_pct,
            ],
            complexity: self.project_complexity,
        };

        Ok(ProjectRecord {
            input: ProjectInput { ratings, text },
            labels,
        })
    }
}

/// Loads labelled project records from a CSV file.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl RecordSource for CsvLoader {
    fn load_all(&self) -> Result<Vec<ProjectRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open training data '{}'", self.path.display()))?;

        // Text is all three columns or none; a partial set is ignored.
        let headers = reader
            .headers()
            .with_context(|| format!("Cannot read the header of '{}'", self.path.display()))?
            .clone();
        let has_text = TEXT_COLUMNS.iter().all(|c| headers.iter().any(|h| h == *c));

        let mut records = Vec::new();
        for (i, row) in reader.deserialize::<ProjectRow>().enumerate() {
            // +2: one for the header, one for 1-based line numbers
            let line = i + 2;
            let row  = row.with_context(|| {
                format!("Malformed row at line {} of '{}'", line, self.path.display())
            })?;
            let record = row
                .into_record(has_text)
                .with_context(|| format!("Invalid labels at line {line}"))?;
            records.push(record);
        }

        tracing::info!(
            "Loaded {} project records from '{}'",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}
