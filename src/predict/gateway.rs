use serde::Serialize;
use tracing::debug;

use crate::error::{AppError, ValidationError};

use super::{
    classifier::ModelSet,
    disease::DiseaseType,
    features::{normalize, RawFields},
};

/// Stroke is flagged above this probability rather than 0.5.
pub const STROKE_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub disease: DiseaseType,
    pub label: u8,
    /// The label for diabetes and heart disease, the probability for stroke.
    pub value: f64,
    pub result: &'static str,
}

pub struct InferenceGateway {
    models: ModelSet,
}

impl InferenceGateway {
    pub fn new(models: ModelSet) -> Self {
        Self { models }
    }

    pub fn feature_names(&self, disease: DiseaseType) -> Result<&[String], AppError> {
        self.models
            .get(&disease)
            .map(|m| m.feature_names())
            .ok_or_else(|| AppError::ModelUnavailable(disease.to_string()))
    }

    /// Normalizes the request fields against the model's columns, then classifies.
    pub fn predict(&self, disease: DiseaseType, raw: &RawFields) -> Result<Outcome, AppError> {
        let expected = self.feature_names(disease)?;
        let vector = normalize(raw, expected, disease.strategy())?;
        self.classify(disease, &vector)
    }

    pub fn classify(&self, disease: DiseaseType, vector: &[f64]) -> Result<Outcome, AppError> {
        let model = self
            .models
            .get(&disease)
            .ok_or_else(|| AppError::ModelUnavailable(disease.to_string()))?;
        let expected = model.feature_names().len();
        if vector.len() != expected {
            return Err(ValidationError::FeatureCount {
                expected,
                actual: vector.len(),
            }
            .into());
        }
        let (label, value) = match disease {
            DiseaseType::Stroke => {
                let proba = model.predict_proba(vector);
                (u8::from(proba > STROKE_THRESHOLD), proba)
            }
            DiseaseType::Diabetes | DiseaseType::HeartDisease => {
                let label = model.predict(vector);
                (label, f64::from(label))
            }
        };
        debug!(%disease, label, value, "classified");
        Ok(Outcome {
            disease,
            label,
            value,
            result: disease.result_text(label),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use super::*;
    use crate::predict::classifier::StubClassifier;

    fn gateway_with(disease: DiseaseType, features: &[&str], proba: f64) -> InferenceGateway {
        let mut models: ModelSet = HashMap::new();
        models.insert(disease, Arc::new(StubClassifier::new(features, proba)));
        InferenceGateway::new(models)
    }

    #[test]
    fn stroke_threshold_is_strictly_greater() {
        let at = gateway_with(DiseaseType::Stroke, &["age"], 0.3);
        let out = at.classify(DiseaseType::Stroke, &[50.0]).unwrap();
        assert_eq!(out.label, 0);
        assert_eq!(out.result, "Low Risk of Stroke");

        let above = gateway_with(DiseaseType::Stroke, &["age"], 0.31);
        let out = above.classify(DiseaseType::Stroke, &[50.0]).unwrap();
        assert_eq!(out.label, 1);
        assert_eq!(out.result, "High Risk of Stroke");
        assert!((out.value - 0.31).abs() < 1e-12);
    }

    #[test]
    fn heart_uses_the_classifier_label() {
        let gw = gateway_with(DiseaseType::HeartDisease, &["age"], 0.4);
        let out = gw.classify(DiseaseType::HeartDisease, &[50.0]).unwrap();
        assert_eq!(out.label, 0);
        assert_eq!(out.value, 0.0);
        assert_eq!(out.result, "No Heart Disease Detected");
    }

    #[test]
    fn unknown_model_is_unavailable() {
        let gw = gateway_with(DiseaseType::Stroke, &["age"], 0.1);
        let err = gw.classify(DiseaseType::Diabetes, &[1.0]).unwrap_err();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
    }

    #[test]
    fn vector_length_must_match_model_columns() {
        let gw = gateway_with(DiseaseType::Diabetes, &["Glucose", "BMI", "Age"], 0.9);
        let err = gw.classify(DiseaseType::Diabetes, &[1.0, 1.0]).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::FeatureCount { expected: 3, actual: 2 })
        ));
        assert!(gw.classify(DiseaseType::Diabetes, &[1.0; 4]).is_err());
        assert!(gw.classify(DiseaseType::Diabetes, &[1.0; 3]).is_ok());
    }

    #[test]
    fn predict_surfaces_missing_feature() {
        let gw = gateway_with(DiseaseType::Diabetes, &["Glucose", "Age"], 0.9);
        let raw: RawFields = [("glucose".to_string(), 150.0)].into_iter().collect();
        let err = gw.predict(DiseaseType::Diabetes, &raw).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MissingFeature(ref f)) if f == "Age"
        ));
    }
}
