/// Z-score standardizer fitted over a single series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardScaler {
    pub mean: f64,
    pub scale: f64,
}

impl StandardScaler {
    /// Population mean and standard deviation; a constant series gets scale 1.
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self { mean: 0.0, scale: 1.0 };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        let scale = if std.abs() < 1e-10 { 1.0 } else { std };
        Self { mean, scale }
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| (v - self.mean) / self.scale).collect()
    }

    pub fn inverse_transform(&self, value: f64) -> f64 {
        value * self.scale + self.mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_and_transform() {
        let scaler = StandardScaler::fit(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(scaler.mean, 5.0);
        assert_eq!(scaler.scale, 2.0);
        assert_eq!(scaler.transform(&[5.0, 9.0]), vec![0.0, 2.0]);
        assert_eq!(scaler.inverse_transform(-1.0), 3.0);
    }

    #[test]
    fn test_constant_series_keeps_unit_scale() {
        let scaler = StandardScaler::fit(&[42.0; 5]);
        assert_eq!(scaler.scale, 1.0);
        assert_eq!(scaler.transform(&[42.0]), vec![0.0]);
        assert_eq!(scaler.inverse_transform(0.0), 42.0);
    }
}
