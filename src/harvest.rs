//! Harvest decisions.
//!
//! A strategy is asked for a quota every time the trap closes with fish
//! inside. `available` is the in-trap count frozen at that closure. Quotas
//! are never negative, even when the in-trap pool is.

use serde::{Deserialize, Serialize};

pub trait QuotaStrategy {
    fn quota(&mut self, available: f64) -> f64;
}

/// Take every whole fish in the trap.
pub struct FullCatch;

impl QuotaStrategy for FullCatch {
    fn quota(&mut self, available: f64) -> f64 {
        available.floor().max(0.0)
    }
}

/// Take a fixed percentage of the catch, rounded down.
pub struct Percent {
    percent: u32,
}

impl Percent {
    pub fn new(percent: u32) -> Self {
        Self {
            percent: percent.min(100),
        }
    }
}

impl QuotaStrategy for Percent {
    fn quota(&mut self, available: f64) -> f64 {
        (available * self.percent as f64 / 100.0).floor().max(0.0)
    }
}

/// Fixed quota per cycle, capped by the catch. Zero once the list runs out.
pub struct Schedule {
    quotas: Vec<u64>,
    i_cycle: usize,
}

impl Schedule {
    pub fn new(quotas: Vec<u64>) -> Self {
        Self { quotas, i_cycle: 0 }
    }
}

impl QuotaStrategy for Schedule {
    fn quota(&mut self, available: f64) -> f64 {
        let quota = self.quotas.get(self.i_cycle).copied().unwrap_or(0);
        self.i_cycle += 1;
        (quota as f64).min(available.floor()).max(0.0)
    }
}

/// Strategy selection as written in the configuration file.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum HarvestConfig {
    FullCatch,
    Percent { percent: u32 },
    Schedule { quotas: Vec<u64> },
}

impl HarvestConfig {
    pub fn strategy(&self) -> Box<dyn QuotaStrategy> {
        match self {
            HarvestConfig::FullCatch => Box::new(FullCatch),
            HarvestConfig::Percent { percent } => Box::new(Percent::new(*percent)),
            HarvestConfig::Schedule { quotas } => Box::new(Schedule::new(quotas.clone())),
        }
    }
}
