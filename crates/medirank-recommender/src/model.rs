//! Multi-label condition classifier.
//!
//! One-vs-rest logistic regression trained by batch gradient descent
//! over the feature matrix. Supplies per-label predicted probabilities
//! for the model-based relevance path and per-feature importances for
//! the dynamic weights.

use medirank_common::{config::TrainingConfig, RecommendError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionClassifier {
    /// (n_features + 1) × n_labels; the extra row is the bias.
    weights: Array2<f64>,
    n_features: usize,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl ConditionClassifier {
    /// Train over features `x` (doctors × features) and multi-hot
    /// targets `y` (doctors × labels). Degenerate label columns (all
    /// zero or all one) are tolerated; non-finite weights after
    /// training are a `Training` error so the caller can fall back.
    pub fn train(x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>, cfg: &TrainingConfig) -> Result<Self> {
        let (n_rows, n_features) = x.dim();
        let n_labels = y.ncols();
        if n_rows == 0 || n_labels == 0 {
            return Err(RecommendError::Training(
                "no rows or labels to train on".to_string(),
            ));
        }
        if y.nrows() != n_rows {
            return Err(RecommendError::Training(format!(
                "target rows ({}) do not match feature rows ({})",
                y.nrows(),
                n_rows
            )));
        }

        // Augment with a constant column for the bias term.
        let mut x_aug = Array2::<f64>::ones((n_rows, n_features + 1));
        x_aug.slice_mut(ndarray::s![.., ..n_features]).assign(&x);

        let mut weights = Array2::<f64>::zeros((n_features + 1, n_labels));
        let n = n_rows as f64;

        for _ in 0..cfg.epochs {
            let preds = x_aug.dot(&weights).mapv(sigmoid);
            let grad = x_aug.t().dot(&(&preds - &y)) / n + &weights * cfg.l2;
            weights = weights - grad * cfg.learning_rate;
        }

        if weights.iter().any(|w| !w.is_finite()) {
            return Err(RecommendError::Training(
                "non-finite weights after gradient descent".to_string(),
            ));
        }

        tracing::info!(
            rows = n_rows,
            features = n_features,
            labels = n_labels,
            epochs = cfg.epochs,
            "condition classifier trained"
        );

        Ok(Self { weights, n_features })
    }

    /// Predicted probability that the doctor in `row` treats `label_idx`.
    pub fn predict_proba(&self, row: ArrayView1<'_, f64>, label_idx: usize) -> Result<f64> {
        if row.len() != self.n_features {
            return Err(RecommendError::Training(format!(
                "feature row has {} columns, model expects {}",
                row.len(),
                self.n_features
            )));
        }
        if label_idx >= self.weights.ncols() {
            return Err(RecommendError::UnknownLabel(format!("label index {label_idx}")));
        }

        let col = self.weights.column(label_idx);
        let z: f64 = row
            .iter()
            .zip(col.iter())
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + col[self.n_features];
        Ok(sigmoid(z))
    }

    /// Mean absolute weight per feature across labels, the analogue of
    /// tree-model feature importances.
    pub fn feature_importances(&self) -> Array1<f64> {
        self.weights
            .slice(ndarray::s![..self.n_features, ..])
            .map_axis(Axis(1), |row| {
                row.iter().map(|w| w.abs()).sum::<f64>() / row.len() as f64
            })
    }

    pub fn n_labels(&self) -> usize {
        self.weights.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn default_cfg() -> TrainingConfig {
        TrainingConfig::default()
    }

    #[test]
    fn test_learns_indicator_column() {
        // Feature 0 is exactly the label: the model should separate on it.
        let x = array![[1.0, 0.3], [0.0, 0.1], [1.0, 0.9], [0.0, 0.5]];
        let y = array![[1.0], [0.0], [1.0], [0.0]];
        let model = ConditionClassifier::train(x.view(), y.view(), &default_cfg()).unwrap();

        let pos = model.predict_proba(array![1.0, 0.4].view(), 0).unwrap();
        let neg = model.predict_proba(array![0.0, 0.4].view(), 0).unwrap();
        assert!(pos > 0.7, "positive case got {}", pos);
        assert!(neg < 0.3, "negative case got {}", neg);
    }

    #[test]
    fn test_degenerate_all_positive_label() {
        let x = array![[0.2], [0.5], [0.8]];
        let y = array![[1.0], [1.0], [1.0]];
        let model = ConditionClassifier::train(x.view(), y.view(), &default_cfg()).unwrap();
        let p = model.predict_proba(array![0.5].view(), 0).unwrap();
        assert!(p > 0.5);
    }

    #[test]
    fn test_importances_favor_informative_feature() {
        let x = array![
            [1.0, 0.01],
            [0.0, 0.02],
            [1.0, 0.01],
            [0.0, 0.02],
            [1.0, 0.02],
            [0.0, 0.01]
        ];
        let y = array![[1.0], [0.0], [1.0], [0.0], [1.0], [0.0]];
        let model = ConditionClassifier::train(x.view(), y.view(), &default_cfg()).unwrap();
        let imp = model.feature_importances();
        assert!(imp[0] > imp[1]);
    }

    #[test]
    fn test_empty_training_set_is_error() {
        let x = Array2::<f64>::zeros((0, 3));
        let y = Array2::<f64>::zeros((0, 2));
        assert!(ConditionClassifier::train(x.view(), y.view(), &default_cfg()).is_err());
    }

    #[test]
    fn test_row_width_mismatch_is_error() {
        let x = array![[1.0, 0.0], [0.0, 1.0]];
        let y = array![[1.0], [0.0]];
        let model = ConditionClassifier::train(x.view(), y.view(), &default_cfg()).unwrap();
        assert!(model.predict_proba(array![1.0].view(), 0).is_err());
    }
}
