use crate::engine::RunReport;
use crate::model::SimulationState;
use crate::stats::{CatchAccumulator, CatchReport};
use anyhow::{Context, Result};
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::Path,
};

/// Everything a `create` run produces.
///
/// `harvest` follows the configured strategy, `reference` takes the full
/// catch of every cycle on the same trap and tides.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RunResults {
    pub harvest: SimulationState,
    pub harvest_report: RunReport,
    pub reference: SimulationState,
    pub reference_report: RunReport,
}

impl RunResults {
    pub fn save<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);
        encode::write(&mut writer, self).context("failed to serialize results")?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);
        let results = decode::from_read(&mut reader).context("failed to deserialize results")?;
        Ok(results)
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_harvested: f64,
    pub peak_in_trap: f64,
    /// Fish left in both pools at the end of the run. Under the depleting
    /// policy this is the initial population minus the harvest.
    pub final_population: f64,
    pub complete: bool,
    pub catches: CatchReport,
}

impl RunSummary {
    pub fn new(state: &SimulationState, report: &RunReport) -> Self {
        Self {
            total_harvested: state.total_harvested(),
            peak_in_trap: state.in_trap.iter().copied().fold(0.0, f64::max),
            final_population: state.population(),
            complete: report.complete,
            catches: state.catches.iter().copied().collect::<CatchAccumulator>().report(),
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RunAnalysis {
    pub run_idx: usize,
    pub harvest: RunSummary,
    pub reference: RunSummary,
}

/// Collects per-run summaries and writes them as TOML.
#[derive(Default, Serialize)]
pub struct Analyzer {
    runs: Vec<RunAnalysis>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, run_idx: usize, file: P) -> Result<()> {
        let results = RunResults::load(file).context("failed to load results")?;

        let analysis = RunAnalysis {
            run_idx,
            harvest: RunSummary::new(&results.harvest, &results.harvest_report),
            reference: RunSummary::new(&results.reference, &results.reference_report),
        };
        log::info!(
            "run {run_idx}: harvested {} of {} fish over {} cycles (full catch: {})",
            analysis.harvest.total_harvested,
            results.harvest.initial_population(),
            analysis.harvest.catches.n_catches,
            analysis.reference.total_harvested,
        );

        self.runs.push(analysis);
        Ok(())
    }

    pub fn runs(&self) -> &[RunAnalysis] {
        &self.runs
    }

    pub fn save_results<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let contents = toml::to_string(self).context("failed to serialize analysis")?;
        fs::write(file, contents).with_context(|| format!("failed to write {file:?}"))?;
        Ok(())
    }
}
