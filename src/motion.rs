// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Motion descriptions shared by targets and the radar platform.
//!
//! Every quantity can either be a scalar broadcast over the whole timestamp
//! tensor, or a fully materialized per-(channel, pulse, sample) table with the
//! same shape as the tensor. Positions are specified at t = 0 of the
//! simulation clock.

use glam::DVec3;
use ndarray::Array3;

use crate::math::EulerZyx;

/// Translational state: where something is and how fast it moves.
#[derive(Clone, Debug)]
pub enum Kinematic {
    /// Constant-velocity motion from a t = 0 position.
    Uniform { position: DVec3, velocity: DVec3 },
    /// Position tabulated per (channel, pulse, sample). The velocity is still
    /// a single vector; it only feeds Doppler terms.
    Sampled {
        positions: Array3<DVec3>,
        velocity: DVec3,
    },
}

impl Kinematic {
    pub fn still(position: DVec3) -> Kinematic {
        Kinematic::Uniform {
            position,
            velocity: DVec3::ZERO,
        }
    }

    pub(crate) fn position(&self, idx: (usize, usize, usize), t: f64) -> DVec3 {
        match self {
            Kinematic::Uniform { position, velocity } => *position + *velocity * t,
            Kinematic::Sampled { positions, .. } => positions[[idx.0, idx.1, idx.2]],
        }
    }

    pub(crate) fn velocity(&self) -> DVec3 {
        match self {
            Kinematic::Uniform { velocity, .. } => *velocity,
            Kinematic::Sampled { velocity, .. } => *velocity,
        }
    }

    /// The table's shape, when this motion is tabulated.
    pub(crate) fn table_shape(&self) -> Option<(usize, usize, usize)> {
        match self {
            Kinematic::Uniform { .. } => None,
            Kinematic::Sampled { positions, .. } => Some(positions.dim()),
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        match self {
            Kinematic::Uniform { position, velocity } => {
                position.is_finite() && velocity.is_finite()
            }
            Kinematic::Sampled {
                positions,
                velocity,
            } => velocity.is_finite() && positions.iter().all(|p| p.is_finite()),
        }
    }
}

/// Rotational state, as ZYX Euler angles.
#[derive(Clone, Debug)]
pub enum Attitude {
    /// Angles advance linearly at `rate` from their t = 0 values.
    Uniform { euler: EulerZyx, rate: EulerZyx },
    /// Angles tabulated per (channel, pulse, sample); `rate` only feeds the
    /// angular-velocity term of surface speeds.
    Sampled {
        eulers: Array3<EulerZyx>,
        rate: EulerZyx,
    },
}

impl Attitude {
    pub fn level() -> Attitude {
        Attitude::Uniform {
            euler: EulerZyx::default(),
            rate: EulerZyx::default(),
        }
    }

    pub(crate) fn euler(&self, idx: (usize, usize, usize), t: f64) -> EulerZyx {
        match self {
            Attitude::Uniform { euler, rate } => euler.advanced(*rate, t),
            Attitude::Sampled { eulers, .. } => eulers[[idx.0, idx.1, idx.2]],
        }
    }

    /// Angular velocity in the world frame \[rad/s\].
    pub(crate) fn omega(&self) -> DVec3 {
        match self {
            Attitude::Uniform { rate, .. } => rate.rate_vector(),
            Attitude::Sampled { rate, .. } => rate.rate_vector(),
        }
    }

    pub(crate) fn table_shape(&self) -> Option<(usize, usize, usize)> {
        match self {
            Attitude::Uniform { .. } => None,
            Attitude::Sampled { eulers, .. } => Some(eulers.dim()),
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        match self {
            Attitude::Uniform { euler, rate } => euler.is_finite() && rate.is_finite(),
            Attitude::Sampled { eulers, rate } => {
                rate.is_finite() && eulers.iter().all(|e| e.is_finite())
            }
        }
    }
}

/// A scalar that is either constant or tabulated per (channel, pulse, sample).
#[derive(Clone, Debug)]
pub enum ScalarSeries {
    Constant(f64),
    Sampled(Array3<f64>),
}

impl ScalarSeries {
    pub(crate) fn at(&self, idx: (usize, usize, usize)) -> f64 {
        match self {
            ScalarSeries::Constant(v) => *v,
            ScalarSeries::Sampled(table) => table[[idx.0, idx.1, idx.2]],
        }
    }

    pub(crate) fn table_shape(&self) -> Option<(usize, usize, usize)> {
        match self {
            ScalarSeries::Constant(_) => None,
            ScalarSeries::Sampled(table) => Some(table.dim()),
        }
    }
}
