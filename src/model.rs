//! Fitting, scoring and persistence of the donor response classifier.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use num::Float;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::logistic_regression::{LogisticRegression, LogisticRegressionParameters};

use crate::dataset::TrainingSet;
use crate::encoder::MatchFeatures;
use crate::error::{DonorError, Result};
use crate::records::TrainingExample;

static ARTIFACT_KIND: &str = "donor-response/logistic-regression";

/// L2 penalty on the coefficients. The built-in dataset is linearly
/// separable, so an unpenalized fit has no finite optimum.
pub const DEFAULT_ALPHA: f64 = 1.0;

/// Columns the classifier was fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureSchema {
    MatchFlags,
}

/// Fitted parameters of a binary logistic regression. This is what gets
/// written to the model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorModel {
    kind: String,
    schema: FeatureSchema,
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
    classes: Vec<i32>,
}

pub fn logistic<T: Float>(z: T) -> T {
    T::one() / (T::one() + (-z).exp())
}

impl DonorModel {
    pub fn fit(training: &TrainingSet) -> Result<Self> {
        Self::fit_with_alpha(training, DEFAULT_ALPHA)
    }

    pub fn fit_with_alpha(training: &TrainingSet, alpha: f64) -> Result<Self> {
        if training.is_empty() {
            return Err(DonorError::NumericalFit {
                reason: "training set is empty".to_string(),
            });
        }
        let y = training.labels();
        let mut classes = y.clone();
        classes.sort_unstable();
        classes.dedup();
        if classes.len() != 2 {
            return Err(DonorError::NumericalFit {
                reason: format!("need both response labels, found classes {:?}", classes),
            });
        }

        let xmatrix = training.feature_matrix();
        debug!("Fitting logistic regression on {} examples, alpha {}", training.len(), alpha);
        let params = LogisticRegressionParameters::default().with_alpha(alpha);
        let fitted: LogisticRegression<f64, i32, DenseMatrix<f64>, Vec<i32>> =
            LogisticRegression::fit(&xmatrix, &y, params).map_err(|e| DonorError::NumericalFit {
                reason: e.to_string(),
            })?;

        let coefficients = flatten(fitted.coefficients());
        let intercept = flatten(fitted.intercept());
        let ncols = TrainingExample::FEATURE_COLUMNS.len();
        if coefficients.len() != ncols || intercept.len() != 1 {
            return Err(DonorError::NumericalFit {
                reason: format!(
                    "expected {} coefficients and 1 intercept, got {} and {}",
                    ncols,
                    coefficients.len(),
                    intercept.len()
                ),
            });
        }

        let model = Self {
            kind: ARTIFACT_KIND.to_string(),
            schema: FeatureSchema::MatchFlags,
            feature_names: TrainingExample::FEATURE_COLUMNS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            coefficients,
            intercept: intercept[0],
            classes,
        };
        if !model.is_finite() {
            return Err(DonorError::NumericalFit {
                reason: "fit produced non-finite parameters".to_string(),
            });
        }
        info!(
            "Fitted coefficients {:?}, intercept {:.4}",
            model.coefficients, model.intercept
        );
        Ok(model)
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Probability of the positive class (donor responds).
    pub fn predict_proba(&self, features: &MatchFeatures) -> f64 {
        let z = features
            .to_array()
            .iter()
            .zip(&self.coefficients)
            .fold(self.intercept, |acc, (x, w)| acc + x * w);
        logistic(z)
    }

    fn is_finite(&self) -> bool {
        self.intercept.is_finite() && self.coefficients.iter().all(|w| w.is_finite())
    }

    fn check(&self, path: &Path) -> Result<()> {
        let corrupt = |reason: String| DonorError::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason,
        };
        if self.kind != ARTIFACT_KIND {
            return Err(corrupt(format!("unexpected artifact kind {:?}", self.kind)));
        }
        if self.feature_names != TrainingExample::FEATURE_COLUMNS {
            return Err(corrupt(format!(
                "model was fitted on columns {:?}",
                self.feature_names
            )));
        }
        if self.coefficients.len() != self.feature_names.len() {
            return Err(corrupt(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.feature_names.len()
            )));
        }
        if self.classes != [0, 1] {
            return Err(corrupt(format!("unexpected classes {:?}", self.classes)));
        }
        if !self.is_finite() {
            return Err(corrupt("non-finite parameters".to_string()));
        }
        Ok(())
    }

    /// Writes the artifact next to `path` and renames it into place, so a
    /// concurrent reader sees either the old model or the new one.
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = bincode::serialize(self).map_err(|e| DonorError::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = temp_path(path);
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        debug!("Wrote {} bytes to {:?}", bytes.len(), path);
        Ok(())
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DonorError::ArtifactMissing {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        let model: DonorModel =
            bincode::deserialize(&bytes).map_err(|e| DonorError::ArtifactCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        model.check(path)?;
        debug!("Loaded model from {:?}", path);
        Ok(model)
    }
}

fn flatten(matrix: &DenseMatrix<f64>) -> Vec<f64> {
    let (nrows, ncols) = matrix.shape();
    let mut values = Vec::with_capacity(nrows * ncols);
    for row in 0..nrows {
        for col in 0..ncols {
            values.push(*matrix.get((row, col)));
        }
    }
    values
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
