/// Trajectory reconstruction pipeline
///
/// rotation → tilt compensation → gravity removal → integrate → high-pass
/// → integrate → high-pass. Every stage is a pure function of its inputs and
/// returns a fresh series, so running twice on the same input gives the same
/// output.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compensation::{default_gravity_ref, remove_gravity, tilt_compensate, STANDARD_GRAVITY};
use crate::error::{TrajResult, TrajectoryError};
use crate::filters::DriftFilter;
use crate::integration::{integrate, time_deltas, IntegrationMethod};
use crate::rotation::{rotations_for_series, DegeneratePolicy};
use crate::types::{RotationMatrix, Series, Vec3, VectorSeries};

pub const DEFAULT_FILTER_CUTOFF_HZ: f64 = 0.1;

/// Tunables for one pipeline run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Gravity in the world frame, g-units
    pub gravity_ref: Vec3,
    /// Conversion factor from g to m/s²
    pub g_to_ms2: f64,
    /// High-pass cutoff for drift removal [Hz]
    pub filter_cutoff_hz: f64,
    pub integration: IntegrationMethod,
    pub degenerate_policy: DegeneratePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gravity_ref: default_gravity_ref(),
            g_to_ms2: STANDARD_GRAVITY,
            filter_cutoff_hz: DEFAULT_FILTER_CUTOFF_HZ,
            integration: IntegrationMethod::default(),
            degenerate_policy: DegeneratePolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> TrajResult<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| TrajectoryError::Parse {
            line: e.line(),
            reason: e.to_string(),
        })
    }
}

/// Everything the pipeline produces, one entry per input sample
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trajectory {
    pub rotations: Vec<RotationMatrix>,
    /// World frame, gravity removed [m/s²]
    pub linear_acceleration: VectorSeries,
    /// Drift-filtered [m/s]
    pub velocity: VectorSeries,
    /// Drift-filtered [m]
    pub position: VectorSeries,
    /// Normalised cutoff the drift filter actually used
    pub normalized_cutoff: f64,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.rotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rotations.is_empty()
    }
}

/// Run the full reconstruction on a closed recording.
pub fn compute_trajectory(series: &Series, config: &PipelineConfig) -> TrajResult<Trajectory> {
    if series.len() < 2 {
        log::warn!(
            "Series has {} sample(s); integration needs at least 2, output will be zero",
            series.len()
        );
    }

    let rotations = rotations_for_series(series, config.degenerate_policy)?;
    let world_accel = tilt_compensate(&rotations, &series.accelerations())?;
    let linear_acceleration = remove_gravity(&world_accel, &config.gravity_ref, config.g_to_ms2);

    let deltas = time_deltas(&series.timestamps());
    let drift = DriftFilter::from_deltas(config.filter_cutoff_hz, &deltas);
    log::debug!(
        "Drift filter: cutoff {} Hz → normalized {:.5}, b={:?}, a={:?}",
        config.filter_cutoff_hz,
        drift.normalized_cutoff(),
        drift.coefficients().b,
        drift.coefficients().a
    );

    let raw_velocity = integrate(&linear_acceleration, &deltas, config.integration)?;
    let velocity = drift.apply(&raw_velocity)?;

    let raw_position = integrate(&velocity, &deltas, config.integration)?;
    let position = drift.apply(&raw_position)?;

    log::info!(
        "Reconstructed {} samples over {:.3}s ({:?})",
        series.len(),
        series.duration(),
        config.integration
    );

    Ok(Trajectory {
        rotations,
        linear_acceleration,
        velocity,
        position,
        normalized_cutoff: drift.normalized_cutoff(),
    })
}
