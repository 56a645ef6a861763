use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

use super::{disease::DiseaseType, features::RawFields};

/// A request schema for one disease.
pub trait PredictInput {
    const DISEASE: DiseaseType;

    /// Range-checks every field and returns them keyed by request name.
    fn into_fields(self) -> Result<RawFields, ValidationError>;
}

fn ranged(field: &str, v: f64, min: f64, max: f64) -> Result<(String, f64), ValidationError> {
    if !v.is_finite() || v < min || v > max {
        return Err(ValidationError::out_of_range(
            field,
            format!("must be within [{min}, {max}]"),
        ));
    }
    Ok((field.to_string(), v))
}

fn non_negative(field: &str, v: f64) -> Result<(String, f64), ValidationError> {
    if !v.is_finite() || v < 0.0 {
        return Err(ValidationError::out_of_range(field, "must be a non-negative number"));
    }
    Ok((field.to_string(), v))
}

fn flag(field: &str, v: f64) -> Result<(String, f64), ValidationError> {
    if v != 0.0 && v != 1.0 {
        return Err(ValidationError::out_of_range(field, "must be 0 or 1"));
    }
    Ok((field.to_string(), v))
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiabetesInput {
    pub pregnancies: f64,
    pub glucose: f64,
    pub blood_pressure: f64,
    pub skin_thickness: f64,
    pub insulin: f64,
    pub bmi: f64,
    pub diabetes_pedigree: f64,
    pub age: f64,
}

impl PredictInput for DiabetesInput {
    const DISEASE: DiseaseType = DiseaseType::Diabetes;

    fn into_fields(self) -> Result<RawFields, ValidationError> {
        [
            ranged("pregnancies", self.pregnancies, 0.0, 20.0),
            ranged("glucose", self.glucose, 0.0, 300.0),
            ranged("blood_pressure", self.blood_pressure, 0.0, 200.0),
            ranged("skin_thickness", self.skin_thickness, 0.0, 100.0),
            ranged("insulin", self.insulin, 0.0, 900.0),
            ranged("bmi", self.bmi, 0.0, 70.0),
            ranged("diabetes_pedigree", self.diabetes_pedigree, 0.0, 3.0),
            ranged("age", self.age, 0.0, 120.0),
        ]
        .into_iter()
        .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeartDiseaseInput {
    pub age: f64,
    pub sex: f64,
    pub cp: f64,
    pub trestbps: f64,
    pub chol: f64,
    pub fbs: f64,
    pub restecg: f64,
    pub thalach: f64,
    pub exang: f64,
    pub oldpeak: f64,
    pub slope: f64,
    pub ca: f64,
    pub thal: f64,
}

impl PredictInput for HeartDiseaseInput {
    const DISEASE: DiseaseType = DiseaseType::HeartDisease;

    fn into_fields(self) -> Result<RawFields, ValidationError> {
        [
            ranged("age", self.age, 0.0, 120.0),
            flag("sex", self.sex),
            ranged("cp", self.cp, 0.0, 3.0),
            ranged("trestbps", self.trestbps, 0.0, 250.0),
            ranged("chol", self.chol, 0.0, 600.0),
            flag("fbs", self.fbs),
            ranged("restecg", self.restecg, 0.0, 2.0),
            ranged("thalach", self.thalach, 0.0, 250.0),
            flag("exang", self.exang),
            ranged("oldpeak", self.oldpeak, 0.0, 10.0),
            ranged("slope", self.slope, 0.0, 2.0),
            ranged("ca", self.ca, 0.0, 4.0),
            ranged("thal", self.thal, 0.0, 3.0),
        ]
        .into_iter()
        .collect()
    }
}

/// One-hot indicators may be omitted; the model defaults them to zero.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Deserialize)]
pub struct StrokeInput {
    pub age: f64,
    pub hypertension: f64,
    pub heart_disease: f64,
    pub avg_glucose_level: f64,
    pub bmi: f64,
    #[serde(default)]
    pub gender_Male: Option<f64>,
    #[serde(default)]
    pub ever_married_Yes: Option<f64>,
    #[serde(default)]
    pub work_type_Never_worked: Option<f64>,
    #[serde(default)]
    pub work_type_Private: Option<f64>,
    #[serde(default)]
    pub work_type_Self_employed: Option<f64>,
    #[serde(default)]
    pub work_type_children: Option<f64>,
    #[serde(default)]
    pub Residence_type_Urban: Option<f64>,
    #[serde(default)]
    pub smoking_status_formerly_smoked: Option<f64>,
    #[serde(default)]
    pub smoking_status_never_smoked: Option<f64>,
    #[serde(default)]
    pub smoking_status_smokes: Option<f64>,
}

impl PredictInput for StrokeInput {
    const DISEASE: DiseaseType = DiseaseType::Stroke;

    fn into_fields(self) -> Result<RawFields, ValidationError> {
        let mut fields: RawFields = [
            ranged("age", self.age, 0.0, 120.0),
            flag("hypertension", self.hypertension),
            flag("heart_disease", self.heart_disease),
            non_negative("avg_glucose_level", self.avg_glucose_level),
            non_negative("bmi", self.bmi),
        ]
        .into_iter()
        .collect::<Result<_, _>>()?;

        let indicators = [
            ("gender_Male", self.gender_Male),
            ("ever_married_Yes", self.ever_married_Yes),
            ("work_type_Never_worked", self.work_type_Never_worked),
            ("work_type_Private", self.work_type_Private),
            ("work_type_Self_employed", self.work_type_Self_employed),
            ("work_type_children", self.work_type_children),
            ("Residence_type_Urban", self.Residence_type_Urban),
            ("smoking_status_formerly_smoked", self.smoking_status_formerly_smoked),
            ("smoking_status_never_smoked", self.smoking_status_never_smoked),
            ("smoking_status_smokes", self.smoking_status_smokes),
        ];
        for (name, value) in indicators {
            if let Some(v) = value {
                let (k, v) = flag(name, v)?;
                fields.insert(k, v);
            }
        }
        Ok(fields)
    }
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: u8,
    pub result: &'static str,
    pub prediction_type: DiseaseType,
    pub history_id: i64,
}
