//! Sequence model implementations loaded from model files.

use serde::{Deserialize, Serialize};

use super::SequenceModel;
use crate::error::{ForecastError, Result};

/// Weighted sum of the standardized window plus an intercept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSequenceModel {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearSequenceModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }
}

impl SequenceModel for LinearSequenceModel {
    fn predict(&self, window: &[f64]) -> Result<f64> {
        if window.len() != self.coefficients.len() {
            return Err(ForecastError::Model(format!(
                "feature count mismatch: expected {}, got {}",
                self.coefficients.len(),
                window.len()
            )));
        }
        Ok(window
            .iter()
            .zip(&self.coefficients)
            .map(|(x, c)| x * c)
            .sum::<f64>()
            + self.intercept)
    }

    fn window_len(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }
}

/// Baseline: mean of the last `window_size` inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingAverageModel {
    pub window_size: usize,
}

impl SequenceModel for MovingAverageModel {
    fn predict(&self, window: &[f64]) -> Result<f64> {
        if window.is_empty() || self.window_size == 0 {
            return Err(ForecastError::Model("no historical data available".into()));
        }
        let skip = window.len().saturating_sub(self.window_size);
        let recent = &window[skip..];
        Ok(recent.iter().sum::<f64>() / recent.len() as f64)
    }
}

/// On-disk model file, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelFile {
    Linear(LinearSequenceModel),
    MovingAverage(MovingAverageModel),
}

impl ModelFile {
    pub fn into_model(self) -> Box<dyn SequenceModel> {
        match self {
            ModelFile::Linear(m) => Box::new(m),
            ModelFile::MovingAverage(m) => Box::new(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_prediction() {
        let model = LinearSequenceModel::new(vec![0.5, 0.5], 1.0);
        assert_eq!(model.predict(&[2.0, 4.0]).unwrap(), 4.0);
        assert!(matches!(model.predict(&[1.0]), Err(ForecastError::Model(_))));
    }

    #[test]
    fn test_moving_average_uses_tail() {
        let model = MovingAverageModel { window_size: 2 };
        assert_eq!(model.predict(&[100.0, 1.0, 3.0]).unwrap(), 2.0);
        assert!(model.predict(&[]).is_err());
    }

    #[test]
    fn test_model_file_tagging() {
        let file: ModelFile =
            serde_json::from_str(r#"{"type":"linear","coefficients":[0.2,0.8]}"#).unwrap();
        let model = file.into_model();
        assert_eq!(model.window_len(), Some(2));
        assert!((model.predict(&[1.0, 1.0]).unwrap() - 1.0).abs() < 1e-12);

        let file: ModelFile =
            serde_json::from_str(r#"{"type":"moving_average","window_size":3}"#).unwrap();
        assert_eq!(file.into_model().window_len(), None);
    }
}
