use crate::error::{TrapError, TrapResult};
use crate::geometry::TrapGeometry;
use crate::harvest::{FullCatch, QuotaStrategy};
use crate::model::SimulationState;
use crate::tide::TideSeries;
use serde::{Deserialize, Serialize};

/// What happens to the free population after each harvest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PopulationPolicy {
    /// Fish outside the trap are restocked to the carrying capacity.
    Constant { carrying_capacity: f64 },
    /// Unharvested fish are released and the population shrinks by the catch.
    Depleting,
}

/// Result of advancing the simulation by one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// The trap closed with fish inside; a harvest decision is pending.
    Closed { in_trap: f64 },
    /// The tide series ran out before the next closure.
    Exhausted,
}

/// Summary of a run driven until the tide series ran out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Number of harvest cycles completed.
    pub n_cycles: usize,
    /// False if fish were still trapped in an unfinished cycle at the end.
    pub complete: bool,
}

/// One hour of fish exchange between the two pools.
///
/// Returns the new `(in_trap, out_of_trap)` counts. The exchange is not
/// bounded: a combined rate above one can drive a pool negative.
pub fn flow_step(
    in_trap: f64,
    out_of_trap: f64,
    coverage: f64,
    movement_rate: f64,
    perimeter_ratio: f64,
    height_adjustment: f64,
) -> (f64, f64) {
    let rate = coverage * movement_rate * perimeter_ratio;
    let free_to_caught = out_of_trap * rate;
    let caught_to_free = in_trap * rate * height_adjustment;
    (
        in_trap - caught_to_free + free_to_caught,
        out_of_trap + caught_to_free - free_to_caught,
    )
}

/// Simulation engine.
///
/// Holds the immutable inputs of a run: trap geometry, tide readings,
/// movement rate and population policy. The mutable history lives in a
/// [`SimulationState`] owned by the caller.
pub struct Engine {
    geometry: TrapGeometry,
    tide: TideSeries,
    movement_rate: f64,
    policy: PopulationPolicy,
}

impl Engine {
    pub fn new(
        geometry: TrapGeometry,
        tide: TideSeries,
        movement_rate: f64,
        policy: PopulationPolicy,
    ) -> Self {
        Self {
            geometry,
            tide,
            movement_rate,
            policy,
        }
    }

    pub fn geometry(&self) -> &TrapGeometry {
        &self.geometry
    }

    pub fn tide(&self) -> &TideSeries {
        &self.tide
    }

    /// Apply `quota` to the pending closure, if any, then advance hour by
    /// hour until the trap closes again or the tide series runs out.
    ///
    /// The quota is checked against the in-trap count frozen at the pending
    /// closure. Without a pending closure only a zero quota is accepted.
    ///
    /// # Errors
    /// Returns [`TrapError::InvalidHarvestRequest`] if the quota is negative,
    /// fractional, non-finite or too large. The state is left untouched.
    pub fn advance_cycle(
        &self,
        state: &mut SimulationState,
        quota: f64,
    ) -> TrapResult<CycleOutcome> {
        self.apply_quota(state, quota)?;

        let mut warned = false;
        while let Some(level) = self.tide.get(state.next_hour()) {
            let coverage = self.geometry.coverage(level);
            let in_trap = state.current_in_trap();

            if in_trap.floor() != 0.0 && coverage == 0.0 {
                log::debug!(
                    "trap closed at hour {} with {in_trap:.3} fish inside",
                    state.next_hour()
                );
                state.set_closure(Some(in_trap));
                return Ok(CycleOutcome::Closed { in_trap });
            }

            let (in_trap, out_of_trap) = flow_step(
                in_trap,
                state.current_out_of_trap(),
                coverage,
                self.movement_rate,
                self.geometry.perimeter_ratio(),
                self.escape_factor(state),
            );
            if !warned && (in_trap < 0.0 || out_of_trap < 0.0) {
                log::warn!(
                    "fish population went negative at hour {} (in trap {in_trap}, outside {out_of_trap})",
                    state.next_hour()
                );
                warned = true;
            }
            state.push(state.total_harvested(), in_trap, out_of_trap);
        }

        Ok(CycleOutcome::Exhausted)
    }

    /// Advance to the next closure and harvest everything caught.
    ///
    /// A closure left pending by [`Engine::advance_cycle`] is emptied first.
    /// The catch goes through the same checks as a caller-supplied quota.
    pub fn run_to_closure(&self, state: &mut SimulationState) -> TrapResult<CycleOutcome> {
        let quota = state
            .pending_closure()
            .map_or(0.0, |available| FullCatch.quota(available));
        let outcome = self.advance_cycle(state, quota)?;
        if let CycleOutcome::Closed { in_trap } = outcome {
            self.apply_quota(state, FullCatch.quota(in_trap))?;
        }
        Ok(outcome)
    }

    /// Harvest the full catch of every cycle until the tide series runs out.
    pub fn run_full_catch(&self, state: &mut SimulationState) -> TrapResult<RunReport> {
        let mut n_cycles = 0;
        while let CycleOutcome::Closed { .. } = self.run_to_closure(state)? {
            n_cycles += 1;
        }
        Ok(self.report(state, n_cycles))
    }

    /// Drive the run to the end, asking `strategy` for the quota of every
    /// closure.
    pub fn run_with<Q: QuotaStrategy + ?Sized>(
        &self,
        state: &mut SimulationState,
        strategy: &mut Q,
    ) -> TrapResult<RunReport> {
        let mut n_cycles = 0;
        loop {
            let quota = match state.pending_closure() {
                Some(available) => strategy.quota(available),
                None => 0.0,
            };
            match self.advance_cycle(state, quota)? {
                CycleOutcome::Closed { .. } => n_cycles += 1,
                CycleOutcome::Exhausted => break,
            }
        }
        Ok(self.report(state, n_cycles))
    }

    fn report(&self, state: &SimulationState, n_cycles: usize) -> RunReport {
        let complete = state.current_in_trap().floor() == 0.0;
        if !complete {
            log::info!(
                "tide series ended mid-cycle with {:.3} fish in the trap",
                state.current_in_trap()
            );
        }
        RunReport { n_cycles, complete }
    }

    /// Outflow multiplier for the current cycle.
    ///
    /// Fish that were disturbed by a harvest escape a low wall faster, so the
    /// wall's height adjustment applies to every cycle that opens with a
    /// harvest. The cycle before the first closure uses a factor of one.
    fn escape_factor(&self, state: &SimulationState) -> f64 {
        if state.catches.is_empty() {
            1.0
        } else {
            self.geometry.height_adjustment()
        }
    }

    fn apply_quota(&self, state: &mut SimulationState, quota: f64) -> TrapResult<()> {
        let Some(available) = state.pending_closure() else {
            return check_quota(quota, 0.0);
        };
        check_quota(quota, available)?;
        self.harvest(state, quota);
        Ok(())
    }

    // Consumes the closure hour. Nothing crosses the dry wall, so the catch
    // leaves and the policy refills the sea.
    fn harvest(&self, state: &mut SimulationState, quota: f64) {
        let hour = state.next_hour();
        let out_of_trap = match self.policy {
            PopulationPolicy::Constant { carrying_capacity } => carrying_capacity,
            PopulationPolicy::Depleting => {
                state.current_out_of_trap() + (state.current_in_trap() - quota)
            }
        };

        log::debug!("harvested {quota} fish at hour {hour}");
        state.catches.push(quota as u64);
        state.push(state.total_harvested() + quota, 0.0, out_of_trap);
        state.set_closure(None);
    }
}

/// Largest catch that still fits a `u64` count.
const MAX_CATCH: f64 = u64::MAX as f64;

// Zero is always a valid quota at a closure, even when the in-trap pool went
// negative.
fn check_quota(quota: f64, available: f64) -> TrapResult<()> {
    let valid = quota.is_finite()
        && quota >= 0.0
        && quota.fract() == 0.0
        && quota <= available.max(0.0)
        && quota < MAX_CATCH;
    if !valid {
        return Err(TrapError::InvalidHarvestRequest {
            requested: quota,
            available,
        });
    }
    Ok(())
}
