//! Trap geometry.
//!
//! The trap is a semicircular stone wall built on a sloping beach. Its rim is
//! sampled once per run and the tide level is compared against the sampled
//! elevations to decide how much of the trap is under water.

use crate::error::{TrapError, TrapResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Radius the flow rates were calibrated for.
pub const REFERENCE_RADIUS: f64 = 25.0;
/// Height above which a taller wall no longer slows fish escaping.
pub const REFERENCE_HEIGHT: f64 = 4.0;

fn default_n_points() -> usize {
    100
}

/// User-chosen trap parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TrapParams {
    /// Radius of the semicircle (m).
    pub radius: f64,
    /// Height of the wall above the beach (m).
    pub height: f64,
    /// Beach gradient.
    pub slope: f64,
    /// Offset of the semicircle center along the beach (m).
    pub delta: f64,
    /// Beach elevation at the origin, relative to mean sea level (m).
    pub intercept: f64,
    /// Number of rim samples.
    #[serde(default = "default_n_points")]
    pub n_points: usize,
}

impl Default for TrapParams {
    fn default() -> Self {
        Self {
            radius: 25.0,
            height: 2.0,
            slope: 0.17,
            delta: 5.0,
            intercept: 6.0,
            n_points: default_n_points(),
        }
    }
}

/// Sampled point on the wall crest: beach coordinates and elevation (m).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RimPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Immutable per-run trap description with its derived rim profile.
#[derive(Debug, Clone, PartialEq)]
pub struct TrapGeometry {
    params: TrapParams,
    rim: Vec<RimPoint>,
}

impl TrapGeometry {
    /// Validate the parameters and sample the rim.
    ///
    /// # Errors
    /// Returns [`TrapError::InvalidGeometry`] for a non-positive radius or
    /// height, non-finite parameters, or fewer than two rim samples.
    pub fn new(params: TrapParams) -> TrapResult<Self> {
        let finite = [
            params.radius,
            params.height,
            params.slope,
            params.delta,
            params.intercept,
        ]
        .iter()
        .all(|val| val.is_finite());
        if !finite {
            return Err(TrapError::InvalidGeometry(format!(
                "parameters must be finite, but are {params:?}"
            )));
        }
        if params.radius <= 0.0 {
            return Err(TrapError::InvalidGeometry(format!(
                "radius must be positive, but is {}",
                params.radius
            )));
        }
        if params.height <= 0.0 {
            return Err(TrapError::InvalidGeometry(format!(
                "height must be positive, but is {}",
                params.height
            )));
        }
        if params.n_points < 2 {
            return Err(TrapError::InvalidGeometry(format!(
                "at least 2 rim points are required, but {} were requested",
                params.n_points
            )));
        }

        let rim = sample_rim(&params);
        Ok(Self { params, rim })
    }

    pub fn params(&self) -> &TrapParams {
        &self.params
    }

    /// Rim samples ordered by ascending polar angle.
    pub fn rim(&self) -> &[RimPoint] {
        &self.rim
    }

    /// Trap radius relative to [`REFERENCE_RADIUS`].
    pub fn perimeter_ratio(&self) -> f64 {
        (PI * self.params.radius) / (PI * REFERENCE_RADIUS)
    }

    /// Escape speed-up for walls lower than [`REFERENCE_HEIGHT`].
    pub fn height_adjustment(&self) -> f64 {
        1.0 / (self.params.height / REFERENCE_HEIGHT).min(1.0)
    }

    /// Lowest rim elevation. Below it the trap is dry.
    pub fn low_point(&self) -> f64 {
        self.rim().iter().map(|p| p.z).fold(f64::INFINITY, f64::min)
    }

    /// Highest rim elevation. Above it the whole rim is under water.
    pub fn high_point(&self) -> f64 {
        self.rim().iter().map(|p| p.z).fold(f64::NEG_INFINITY, f64::max)
    }

    /// Fraction of the rim under water at `tide_level`, in `[0, 1]`.
    ///
    /// Zero means no rim point is submerged: the trap is closed and nothing
    /// moves in or out.
    pub fn coverage(&self, tide_level: f64) -> f64 {
        let Some(point) = self.rim().iter().find(|p| p.z <= tide_level) else {
            return 0.0;
        };

        // Chord from the seaward apex of the semicircle to the first
        // submerged point.
        let TrapParams { radius, delta, .. } = *self.params();
        let apex_y = radius + delta;
        let chord_2 = point.x.powi(2) + (point.y - apex_y).powi(2);

        let radius_2 = radius.powi(2);
        let cos_angle = ((2.0 * radius_2 - chord_2) / (2.0 * radius_2)).clamp(-1.0, 1.0);
        cos_angle.acos() / FRAC_PI_2
    }
}

fn sample_rim(params: &TrapParams) -> Vec<RimPoint> {
    let n_steps = (params.n_points - 1) as f64;
    (0..params.n_points)
        .map(|i| {
            let theta = PI * i as f64 / n_steps;
            let x = params.radius * theta.cos();
            let y = params.radius * theta.sin() + params.delta;
            let z = params.intercept + params.height - params.slope * y;
            RimPoint { x, y, z }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_geometry() -> TrapGeometry {
        TrapGeometry::new(TrapParams::default()).expect("default geometry must be valid")
    }

    #[test]
    fn rim_follows_the_beach_slope() {
        let geo = default_geometry();
        assert_eq!(geo.rim().len(), 100);

        // Wall ends sit on the landward side, the apex is furthest out.
        let params = geo.params();
        let end_z = params.intercept + params.height - params.slope * params.delta;
        assert!((geo.high_point() - end_z).abs() < 1e-9);
        let apex_z = end_z - params.slope * params.radius;
        assert!(geo.low_point() >= apex_z);
        assert!(geo.low_point() - apex_z < 1e-2);
    }

    #[test]
    fn dry_trap_has_zero_coverage() {
        let geo = default_geometry();
        for tide in [geo.low_point() - 1e-6, geo.low_point() - 1.0, -10.0] {
            assert_eq!(geo.coverage(tide), 0.0);
        }
    }

    #[test]
    fn submerged_trap_has_full_coverage() {
        let geo = default_geometry();
        for tide in [geo.high_point(), geo.high_point() + 0.5, 20.0] {
            assert!((geo.coverage(tide) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn coverage_grows_with_the_tide() {
        let geo = default_geometry();
        let low = geo.low_point() - 0.5;
        let high = geo.high_point() + 0.5;

        let mut prev = geo.coverage(low);
        for i in 1..=200 {
            let tide = low + (high - low) * i as f64 / 200.0;
            let cov = geo.coverage(tide);
            assert!((0.0..=1.0).contains(&cov));
            assert!(cov >= prev - 1e-12, "coverage dropped at tide {tide}");
            prev = cov;
        }
    }

    #[test]
    fn partially_submerged_rim_is_strictly_between_bounds() {
        let geo = default_geometry();
        let mid = 0.5 * (geo.low_point() + geo.high_point());
        let cov = geo.coverage(mid);
        assert!(cov > 0.0 && cov < 1.0);
    }

    #[test]
    fn scaling_factors_use_reference_sizes() {
        let geo = TrapGeometry::new(TrapParams {
            radius: 12.5,
            height: 1.0,
            ..TrapParams::default()
        })
        .unwrap();
        assert!((geo.perimeter_ratio() - 0.5).abs() < 1e-12);
        assert!((geo.height_adjustment() - 4.0).abs() < 1e-12);

        let tall = TrapGeometry::new(TrapParams {
            height: 6.0,
            ..TrapParams::default()
        })
        .unwrap();
        assert_eq!(tall.height_adjustment(), 1.0);
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        let bad = [
            TrapParams {
                radius: 0.0,
                ..TrapParams::default()
            },
            TrapParams {
                height: -1.0,
                ..TrapParams::default()
            },
            TrapParams {
                slope: f64::NAN,
                ..TrapParams::default()
            },
            TrapParams {
                n_points: 1,
                ..TrapParams::default()
            },
        ];
        for params in bad {
            assert!(matches!(
                TrapGeometry::new(params),
                Err(TrapError::InvalidGeometry(_))
            ));
        }
    }
}
