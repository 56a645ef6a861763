use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiseaseType {
    Diabetes,
    HeartDisease,
    Stroke,
}

impl DiseaseType {
    pub const ALL: [DiseaseType; 3] = [
        DiseaseType::Diabetes,
        DiseaseType::HeartDisease,
        DiseaseType::Stroke,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DiseaseType::Diabetes => "diabetes",
            DiseaseType::HeartDisease => "heart_disease",
            DiseaseType::Stroke => "stroke",
        }
    }

    /// Display text for a label. The only place these strings are defined.
    pub fn result_text(self, label: u8) -> &'static str {
        let positive = label == 1;
        match (self, positive) {
            (DiseaseType::Diabetes, true) => "The person IS diabetic",
            (DiseaseType::Diabetes, false) => "The person is NOT diabetic",
            (DiseaseType::HeartDisease, true) => "Heart Disease Detected",
            (DiseaseType::HeartDisease, false) => "No Heart Disease Detected",
            (DiseaseType::Stroke, true) => "High Risk of Stroke",
            (DiseaseType::Stroke, false) => "Low Risk of Stroke",
        }
    }

    /// Artifact file name under the model directory.
    pub fn artifact_name(self) -> &'static str {
        match self {
            DiseaseType::Diabetes => "diabetes_model.json",
            DiseaseType::HeartDisease => "heart_model.json",
            DiseaseType::Stroke => "stroke_model.json",
        }
    }
}

impl fmt::Display for DiseaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiseaseType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diabetes" => Ok(DiseaseType::Diabetes),
            "heart_disease" => Ok(DiseaseType::HeartDisease),
            "stroke" => Ok(DiseaseType::Stroke),
            other => Err(ValidationError::InvalidDiseaseType(other.to_string())),
        }
    }
}
