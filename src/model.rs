use serde::{Deserialize, Serialize};

/// Hourly history of a trap simulation.
///
/// Entry `i` of the three hourly sequences is the state after `i` hours. The
/// run starts from a two-entry baseline: hour 0 and hour 1 both hold the
/// whole population outside an empty trap, and the tide reading of hour 0
/// only sets the starting water level. The reading of hour `h` turns entry
/// `h` into entry `h + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Cumulative number of harvested fish.
    pub harvested: Vec<f64>,
    /// Fish inside the trap.
    pub in_trap: Vec<f64>,
    /// Fish outside the trap.
    pub out_of_trap: Vec<f64>,
    /// Size of every harvest, one entry per completed cycle.
    pub catches: Vec<u64>,

    initial_population: f64,
    /// In-trap count frozen at a closure still waiting for its harvest.
    closure: Option<f64>,
}

impl SimulationState {
    pub fn new(initial_population: f64) -> Self {
        let mut state = Self {
            harvested: Vec::new(),
            in_trap: Vec::new(),
            out_of_trap: Vec::new(),
            catches: Vec::new(),
            initial_population,
            closure: None,
        };
        state.reset();
        state
    }

    /// Drop the whole history and go back to the baseline.
    pub fn reset(&mut self) {
        self.harvested.clear();
        self.in_trap.clear();
        self.out_of_trap.clear();
        self.catches.clear();
        self.closure = None;

        for _ in 0..2 {
            self.harvested.push(0.0);
            self.in_trap.push(0.0);
            self.out_of_trap.push(self.initial_population);
        }
    }

    pub fn initial_population(&self) -> f64 {
        self.initial_population
    }

    /// Index of the tide reading that drives the next step.
    pub fn next_hour(&self) -> usize {
        self.in_trap.len() - 1
    }

    pub fn pending_closure(&self) -> Option<f64> {
        self.closure
    }

    pub(crate) fn set_closure(&mut self, in_trap: Option<f64>) {
        self.closure = in_trap;
    }

    pub fn total_harvested(&self) -> f64 {
        self.last(&self.harvested)
    }

    pub fn current_in_trap(&self) -> f64 {
        self.last(&self.in_trap)
    }

    pub fn current_out_of_trap(&self) -> f64 {
        self.last(&self.out_of_trap)
    }

    /// Fish in both pools at the latest hour.
    pub fn population(&self) -> f64 {
        self.current_in_trap() + self.current_out_of_trap()
    }

    pub(crate) fn push(&mut self, harvested: f64, in_trap: f64, out_of_trap: f64) {
        self.harvested.push(harvested);
        self.in_trap.push(in_trap);
        self.out_of_trap.push(out_of_trap);
    }

    fn last(&self, seq: &[f64]) -> f64 {
        seq.last().copied().unwrap_or_default()
    }
}
