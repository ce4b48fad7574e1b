use crate::engine::PopulationPolicy;
use crate::geometry::TrapParams;
use crate::harvest::HarvestConfig;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub trap: TrapParams,
    pub model: ModelConfig,
    pub harvest: HarvestConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Fish in the area at the start of a run.
    pub max_fish: f64,
    /// Fraction of a pool crossing the wall per hour at full coverage.
    pub movement_rate: f64,
    /// Restock the area to `max_fish` after every harvest.
    pub constant_population: bool,
}

impl ModelConfig {
    pub fn policy(&self) -> PopulationPolicy {
        if self.constant_population {
            PopulationPolicy::Constant {
                carrying_capacity: self.max_fish,
            }
        } else {
            PopulationPolicy::Depleting
        }
    }
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let trap = &self.trap;
        check_num(trap.radius, 1.0..=100.0).context("invalid trap radius")?;
        check_num(trap.height, 0.1..=10.0).context("invalid trap height")?;
        check_num(trap.slope, -1.0..=1.0).context("invalid beach slope")?;
        check_num(trap.delta, -100.0..=100.0).context("invalid trap location")?;
        check_num(trap.intercept, -50.0..=50.0).context("invalid beach intercept")?;
        check_num(trap.n_points, 2..=10_000).context("invalid number of rim points")?;

        let model = &self.model;
        check_num(model.max_fish, 1.0..=1e9).context("invalid maximum number of fish")?;
        check_num(model.movement_rate, 0.0..=1.0).context("invalid movement rate")?;

        match &self.harvest {
            HarvestConfig::FullCatch => {}
            HarvestConfig::Percent { percent } => {
                check_num(*percent, 0..=100).context("invalid harvest percentage")?;
            }
            HarvestConfig::Schedule { quotas } => {
                if quotas.is_empty() {
                    bail!("harvest schedule must contain at least one quota");
                }
            }
        }

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[trap]
radius = 25.0
height = 2.0
slope = 0.17
delta = 5.0
intercept = 6.0

[model]
max_fish = 1000.0
movement_rate = 0.025
constant_population = false

[harvest]
strategy = "schedule"
quotas = [100, 200]
"#;

    #[test]
    fn parses_complete_config() {
        let cfg = Config::from_toml(CONFIG).unwrap();
        assert_eq!(cfg.trap, TrapParams::default());
        assert_eq!(cfg.model.policy(), PopulationPolicy::Depleting);
        assert_eq!(
            cfg.harvest,
            HarvestConfig::Schedule {
                quotas: vec![100, 200]
            }
        );
    }

    #[test]
    fn constant_population_restocks_to_max_fish() {
        let cfg = Config::from_toml(&CONFIG.replace(
            "constant_population = false",
            "constant_population = true",
        ))
        .unwrap();
        assert_eq!(
            cfg.model.policy(),
            PopulationPolicy::Constant {
                carrying_capacity: 1000.0
            }
        );
    }

    #[test]
    fn rejects_out_of_range_values() {
        for (from, to) in [
            ("radius = 25.0", "radius = 0.0"),
            ("height = 2.0", "height = -2.0"),
            ("movement_rate = 0.025", "movement_rate = 1.5"),
            ("quotas = [100, 200]", "quotas = []"),
        ] {
            let err = Config::from_toml(&CONFIG.replace(from, to)).unwrap_err();
            assert!(
                format!("{err:#}").contains("failed to validate config"),
                "{to}: {err:#}"
            );
        }
    }

    #[test]
    fn rejects_unknown_strategy() {
        let contents = CONFIG.replace("\"schedule\"", "\"random\"");
        assert!(Config::from_toml(&contents).is_err());
    }
}
