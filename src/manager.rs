use crate::analysis::{Analyzer, RunResults};
use crate::config::Config;
use crate::engine::Engine;
use crate::geometry::TrapGeometry;
use crate::model::SimulationState;
use crate::tide::TideSeries;
use anyhow::{Context, Result};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    pub fn create_run(&self) -> Result<()> {
        let run_idx = self.count_run_dirs().context("failed to count run dirs")?;

        let tide_file = self.tide_file();
        let tide = TideSeries::from_file(&tide_file)
            .with_context(|| format!("failed to load {tide_file:?}"))?;
        let geometry =
            TrapGeometry::new(self.cfg.trap.clone()).context("failed to construct geometry")?;

        let model = &self.cfg.model;
        let engine = Engine::new(geometry, tide, model.movement_rate, model.policy());

        log::info!("loaded {} hourly tide readings", engine.tide().len());
        engine.tide().log_extremes();
        log::info!(
            "trap rim spans {:.3} m to {:.3} m above sea level",
            engine.geometry().low_point(),
            engine.geometry().high_point()
        );

        let mut state = SimulationState::new(model.max_fish);
        let mut strategy = self.cfg.harvest.strategy();
        let harvest_report = engine
            .run_with(&mut state, strategy.as_mut())
            .context("failed to run harvest simulation")?;
        let harvest = state.clone();

        state.reset();
        let reference_report = engine
            .run_full_catch(&mut state)
            .context("failed to run reference simulation")?;

        let results = RunResults {
            harvest,
            harvest_report,
            reference: state,
            reference_report,
        };

        let run_dir = self.run_dir(run_idx);
        fs::create_dir_all(&run_dir).with_context(|| format!("failed to create {run_dir:?}"))?;
        log::info!("created {run_dir:?}");

        results
            .save(self.results_file(run_idx))
            .context("failed to save results")?;

        Ok(())
    }

    pub fn analyze_sim(&self) -> Result<()> {
        let mut analyzer = Analyzer::new();

        let n_runs = self.count_run_dirs().context("failed to count run dirs")?;
        for run_idx in 0..n_runs {
            analyzer
                .add_file(run_idx, self.results_file(run_idx))
                .with_context(|| format!("failed to analyze run {run_idx}"))?;
        }

        let analysis_file = self.analysis_file();
        analyzer
            .save_results(&analysis_file)
            .context("failed to save analysis")?;
        log::info!("wrote {} run summaries to {analysis_file:?}", analyzer.runs().len());

        Ok(())
    }

    pub fn clean_sim(&self) -> Result<()> {
        for run_dir in self.run_dirs().context("failed to list run dirs")? {
            fs::remove_dir_all(&run_dir)
                .with_context(|| format!("failed to remove {run_dir:?}"))?;
            log::info!("removed {run_dir:?}");
        }

        let analysis_file = self.analysis_file();
        if analysis_file.exists() {
            fs::remove_file(&analysis_file)
                .with_context(|| format!("failed to remove {analysis_file:?}"))?;
            log::info!("removed {analysis_file:?}");
        }

        Ok(())
    }

    fn run_dirs(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.sim_dir.join("run-*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let dirs = glob(pattern)
            .context("failed to glob run dirs")?
            .filter_map(Result::ok)
            .filter(|p| p.is_dir())
            .collect();
        Ok(dirs)
    }

    fn count_run_dirs(&self) -> Result<usize> {
        Ok(self.run_dirs()?.len())
    }

    fn run_dir(&self, run_idx: usize) -> PathBuf {
        self.sim_dir.join(format!("run-{run_idx:04}"))
    }

    fn tide_file(&self) -> PathBuf {
        self.sim_dir.join("tide.csv")
    }

    fn results_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("results.msgpack")
    }

    fn analysis_file(&self) -> PathBuf {
        self.sim_dir.join("analysis.toml")
    }
}
