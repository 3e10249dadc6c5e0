// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Ideal point scatterers: a time-varying position with a constant velocity,
//! an RCS and a scattering phase. No geometry, so no ray tracing; the
//! synthesizer evaluates these in closed form at every sample.

use glam::DVec3;
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use super::TargetError;
use crate::motion::{Kinematic, ScalarSeries};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointTargetConfig {
    /// World position at t = 0 \[m\].
    pub location: [f64; 3],

    /// Velocity \[m/s\].
    #[serde(default)]
    pub speed: [f64; 3],

    /// Radar cross section \[m², linear\].
    pub rcs: f64,

    /// Scattering phase \[deg\].
    #[serde(default)]
    pub phase: f64,
}

#[derive(Clone, Debug)]
pub struct PointTarget {
    kinematic: Kinematic,
    rcs: ScalarSeries,
    phase: ScalarSeries,
}

impl PointTarget {
    pub fn new(config: &PointTargetConfig) -> Result<PointTarget, TargetError> {
        if config.rcs < 0.0 {
            return Err(TargetError::NegativeRcs(config.rcs));
        }
        Ok(PointTarget {
            kinematic: Kinematic::Uniform {
                position: DVec3::from(config.location),
                velocity: DVec3::from(config.speed),
            },
            rcs: ScalarSeries::Constant(config.rcs),
            phase: ScalarSeries::Constant(config.phase.to_radians()),
        })
    }

    /// Replace the uniform trajectory with a per-sample position table.
    pub fn with_sampled_location(mut self, positions: Array3<DVec3>, velocity: DVec3) -> PointTarget {
        self.kinematic = Kinematic::Sampled {
            positions,
            velocity,
        };
        self
    }

    /// Replace the constant RCS with a per-sample table \[m², linear\].
    pub fn with_sampled_rcs(mut self, rcs: Array3<f64>) -> Result<PointTarget, TargetError> {
        let min = rcs.iter().copied().fold(f64::INFINITY, f64::min);
        if min < 0.0 {
            return Err(TargetError::NegativeRcs(min));
        }
        self.rcs = ScalarSeries::Sampled(rcs);
        Ok(self)
    }

    /// Replace the constant phase with a per-sample table \[rad\].
    pub fn with_sampled_phase(mut self, phase: Array3<f64>) -> PointTarget {
        self.phase = ScalarSeries::Sampled(phase);
        self
    }

    pub(crate) fn kinematic(&self) -> &Kinematic {
        &self.kinematic
    }

    pub(crate) fn rcs(&self) -> &ScalarSeries {
        &self.rcs
    }

    pub(crate) fn phase(&self) -> &ScalarSeries {
        &self.phase
    }
}
