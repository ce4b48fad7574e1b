use serde::{Deserialize, Serialize};

/// Running mean and variance of harvest sizes (Welford's algorithm).
#[derive(Default)]
pub struct CatchAccumulator {
    n_catches: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct CatchReport {
    pub n_catches: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
}

impl CatchAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, catch: u64) {
        let val = catch as f64;
        self.n_catches += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_catches as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    pub fn report(&self) -> CatchReport {
        CatchReport {
            n_catches: self.n_catches,
            mean: (self.n_catches > 0).then_some(self.mean),
            std_dev: (self.n_catches > 1)
                .then(|| (self.diff_2_sum / (self.n_catches as f64 - 1.0)).sqrt()),
        }
    }
}

impl FromIterator<u64> for CatchAccumulator {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut acc = Self::new();
        for catch in iter {
            acc.add(catch);
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_sample_statistics() {
        let report = [2u64, 4, 4, 4, 5, 5, 7, 9]
            .into_iter()
            .collect::<CatchAccumulator>()
            .report();
        assert_eq!(report.n_catches, 8);
        assert!((report.mean.unwrap() - 5.0).abs() < 1e-12);
        assert!((report.std_dev.unwrap() - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn small_samples_have_no_spread() {
        assert_eq!(
            CatchAccumulator::new().report(),
            CatchReport {
                n_catches: 0,
                mean: None,
                std_dev: None
            }
        );
        let one = [346u64].into_iter().collect::<CatchAccumulator>().report();
        assert_eq!(one.mean, Some(346.0));
        assert_eq!(one.std_dev, None);
    }
}
