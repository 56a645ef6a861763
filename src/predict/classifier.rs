use std::{collections::HashMap, path::Path, sync::Arc};

use serde::Deserialize;
use tracing::{error, info};

use crate::error::AppError;

use super::disease::DiseaseType;

/// A trained binary classifier over a fixed, declared column order.
pub trait Classifier: Send + Sync {
    /// Columns in the order the model was trained with.
    fn feature_names(&self) -> &[String];

    /// Probability of the positive class.
    fn predict_proba(&self, features: &[f64]) -> f64;

    fn predict(&self, features: &[f64]) -> u8 {
        u8::from(self.predict_proba(features) > 0.5)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Standard scaler followed by a logistic model, as exported by training.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub features: Vec<String>,
    pub scaler: ScalerParams,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let model: LinearModel = serde_json::from_str(raw)?;
        model.check()?;
        Ok(model)
    }

    fn check(&self) -> anyhow::Result<()> {
        let n = self.features.len();
        anyhow::ensure!(n > 0, "artifact declares no features");
        anyhow::ensure!(
            self.scaler.mean.len() == n
                && self.scaler.scale.len() == n
                && self.coefficients.len() == n,
            "artifact vectors do not match {n} declared features"
        );
        anyhow::ensure!(
            self.scaler.scale.iter().all(|s| s.is_finite() && *s != 0.0),
            "scaler scale must be finite and non-zero"
        );
        Ok(())
    }
}

impl Classifier for LinearModel {
    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn predict_proba(&self, features: &[f64]) -> f64 {
        let z: f64 = features
            .iter()
            .zip(self.scaler.mean.iter().zip(&self.scaler.scale))
            .zip(&self.coefficients)
            .map(|((x, (mean, scale)), w)| w * (x - mean) / scale)
            .sum::<f64>()
            + self.intercept;
        1.0 / (1.0 + (-z).exp())
    }
}

pub type ModelSet = HashMap<DiseaseType, Arc<dyn Classifier>>;

/// Loads every disease's artifact. Any missing or invalid artifact fails.
pub fn load_models(dir: &Path) -> Result<ModelSet, AppError> {
    let mut models: ModelSet = HashMap::new();
    for disease in DiseaseType::ALL {
        let path = dir.join(disease.artifact_name());
        if !path.exists() {
            error!(path = %path.display(), %disease, "model artifact not found");
            return Err(AppError::ModelUnavailable(format!(
                "{disease}: artifact not found at {}",
                path.display()
            )));
        }
        let model = std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|raw| LinearModel::from_json(&raw))
            .map_err(|e| {
                error!(path = %path.display(), %disease, error = %e, "model artifact invalid");
                AppError::ModelUnavailable(format!("{disease}: {e}"))
            })?;
        info!(%disease, features = model.features.len(), "model loaded");
        models.insert(disease, Arc::new(model));
    }
    Ok(models)
}

/// Returns a fixed probability; used to drive the gateway in tests.
#[cfg(test)]
pub struct StubClassifier {
    pub features: Vec<String>,
    pub proba: f64,
}

#[cfg(test)]
impl StubClassifier {
    pub fn new(features: &[&str], proba: f64) -> Self {
        Self {
            features: features.iter().map(|s| s.to_string()).collect(),
            proba,
        }
    }
}

#[cfg(test)]
impl Classifier for StubClassifier {
    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn predict_proba(&self, _features: &[f64]) -> f64 {
        self.proba
    }
}
