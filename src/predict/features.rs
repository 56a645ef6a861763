//! Resolves request field names to the column order a classifier was
//! trained with.

use std::collections::HashMap;

use crate::error::ValidationError;

use super::disease::DiseaseType;

/// Request fields keyed by name. Values are already range-checked.
pub type RawFields = HashMap<String, f64>;

/// How incoming names are matched against the classifier's columns.
#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    /// Translate through `(input, canonical)` pairs; an absent canonical
    /// column is an error.
    StrictMapping(&'static [(&'static str, &'static str)]),
    /// Names are canonical already; absent columns become `0.0`.
    PermissiveDefault,
}

pub const DIABETES_MAPPING: &[(&str, &str)] = &[
    ("pregnancies", "Pregnancies"),
    ("glucose", "Glucose"),
    ("blood_pressure", "BloodPressure"),
    ("skin_thickness", "SkinThickness"),
    ("insulin", "Insulin"),
    ("bmi", "BMI"),
    ("diabetes_pedigree", "DiabetesPedigreeFunction"),
    ("age", "Age"),
];

pub const HEART_MAPPING: &[(&str, &str)] = &[
    ("age", "age"),
    ("sex", "sex"),
    ("cp", "cp"),
    ("trestbps", "trestbps"),
    ("chol", "chol"),
    ("fbs", "fbs"),
    ("restecg", "restecg"),
    ("thalach", "thalach"),
    ("exang", "exang"),
    ("oldpeak", "oldpeak"),
    ("slope", "slope"),
    ("ca", "ca"),
    ("thal", "thal"),
];

impl DiseaseType {
    pub fn strategy(self) -> Strategy {
        match self {
            DiseaseType::Diabetes => Strategy::StrictMapping(DIABETES_MAPPING),
            DiseaseType::HeartDisease => Strategy::StrictMapping(HEART_MAPPING),
            DiseaseType::Stroke => Strategy::PermissiveDefault,
        }
    }
}

/// Builds the ordered vector. Order always follows `expected`.
pub fn normalize(
    raw: &RawFields,
    expected: &[String],
    strategy: Strategy,
) -> Result<Vec<f64>, ValidationError> {
    match strategy {
        Strategy::StrictMapping(mapping) => {
            let translated: HashMap<&str, f64> = mapping
                .iter()
                .filter_map(|(input, canonical)| raw.get(*input).map(|v| (*canonical, *v)))
                .collect();
            expected
                .iter()
                .map(|name| {
                    translated
                        .get(name.as_str())
                        .copied()
                        .ok_or_else(|| ValidationError::MissingFeature(name.clone()))
                })
                .collect()
        }
        Strategy::PermissiveDefault => Ok(expected
            .iter()
            .map(|name| raw.get(name).copied().unwrap_or(0.0))
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|s| s.to_string()).collect()
    }

    fn diabetes_raw() -> RawFields {
        [
            ("pregnancies", 2.0),
            ("glucose", 120.0),
            ("blood_pressure", 70.0),
            ("skin_thickness", 20.0),
            ("insulin", 79.0),
            ("bmi", 32.0),
            ("diabetes_pedigree", 0.47),
            ("age", 33.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    #[test]
    fn strict_mapping_orders_by_expected_columns() {
        let expected = names(&["Age", "Glucose", "BMI"]);
        let mut raw = diabetes_raw();
        raw.retain(|k, _| ["age", "glucose", "bmi"].contains(&k.as_str()));
        let v = normalize(&raw, &expected, Strategy::StrictMapping(DIABETES_MAPPING)).unwrap();
        assert_eq!(v, vec![33.0, 120.0, 32.0]);
    }

    #[test]
    fn strict_mapping_fails_on_missing_feature() {
        let expected: Vec<String> = DIABETES_MAPPING.iter().map(|(_, c)| c.to_string()).collect();
        let mut raw = diabetes_raw();
        raw.remove("insulin");
        let err = normalize(&raw, &expected, DiseaseType::Diabetes.strategy()).unwrap_err();
        assert_eq!(err, ValidationError::MissingFeature("Insulin".into()));
    }

    #[test]
    fn strict_mapping_ignores_unknown_input_keys() {
        let expected = names(&["Glucose"]);
        let mut raw = diabetes_raw();
        raw.insert("Glucose".into(), 999.0);
        let v = normalize(&raw, &expected, DiseaseType::Diabetes.strategy()).unwrap();
        assert_eq!(v, vec![120.0]);
    }

    #[test]
    fn permissive_default_fills_zero() {
        let expected = names(&["age", "hypertension", "bmi"]);
        let raw: RawFields = [("bmi".to_string(), 28.5), ("age".to_string(), 67.0)]
            .into_iter()
            .collect();
        let v = normalize(&raw, &expected, DiseaseType::Stroke.strategy()).unwrap();
        assert_eq!(v, vec![67.0, 0.0, 28.5]);
    }
}
