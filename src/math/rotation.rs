// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Intrinsic ZYX (yaw, pitch, roll) attitude handling.
//!
//! The convention throughout the engine: positive yaw takes +x to +y, positive
//! pitch takes +x to +z, positive roll takes +z to −y. Rotations are stored as
//! 3×3 matrices, never quaternions, so the EM code can multiply them directly.

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

/// A (yaw, pitch, roll) triple \[radians\]. Also used for rotation rates
/// \[rad/s\], in which case each field is the rate of its angle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EulerZyx {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl EulerZyx {
    pub fn new(yaw: f64, pitch: f64, roll: f64) -> EulerZyx {
        EulerZyx { yaw, pitch, roll }
    }

    /// From a (yaw, pitch, roll) triple in degrees.
    pub fn from_degrees(yaw: f64, pitch: f64, roll: f64) -> EulerZyx {
        EulerZyx {
            yaw: yaw.to_radians(),
            pitch: pitch.to_radians(),
            roll: roll.to_radians(),
        }
    }

    /// The rotation matrix taking body-frame vectors to the world frame.
    ///
    /// Intrinsic ZYX: yaw about +z, then pitch about the new +y, then roll
    /// about the new +x. The pitch factor is negated so that positive pitch
    /// takes +x to +z.
    pub fn matrix(self) -> DMat3 {
        let m = DMat3::from_rotation_z(self.yaw)
            * DMat3::from_rotation_y(-self.pitch)
            * DMat3::from_rotation_x(self.roll);
        debug_assert!(m.determinant() > 0.0);
        m
    }

    /// Angles advanced by `rate` over `dt` seconds.
    pub fn advanced(self, rate: EulerZyx, dt: f64) -> EulerZyx {
        EulerZyx {
            yaw: self.yaw + rate.yaw * dt,
            pitch: self.pitch + rate.pitch * dt,
            roll: self.roll + rate.roll * dt,
        }
    }

    /// The angular-velocity vector of a body whose angles advance at these
    /// rates, in the world frame. The pitch axis is −y under this sign
    /// convention.
    pub fn rate_vector(self) -> DVec3 {
        DVec3::new(self.roll, -self.pitch, self.yaw)
    }

    pub fn is_finite(self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }
}

impl From<[f64; 3]> for EulerZyx {
    fn from(a: [f64; 3]) -> EulerZyx {
        EulerZyx::new(a[0], a[1], a[2])
    }
}
