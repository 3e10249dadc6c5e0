// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The LiDAR front-end: first-hit positions and surface normals over a grid
//! of directions. No EM computation; used for point-cloud generation.

use glam::DVec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::EchosimError;
use crate::math::{spherical_to_unit, EulerZyx};
use crate::sbr::{prepare_targets, scene_closest_hit};
use crate::target::MeshTarget;
use crate::tier::Tier;

/// Sensor pose: position in metres, (yaw, pitch, roll) in degrees.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LidarPose {
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default)]
    pub rotation: [f64; 3],
}

/// One returned ray.
#[derive(Clone, Copy, Debug)]
pub struct LidarReturn {
    /// World-frame ray direction.
    pub direction: DVec3,
    /// First-hit position \[m\].
    pub position: DVec3,
    /// Surface normal at the hit, oriented toward the sensor.
    pub normal: DVec3,
    /// Distance from the sensor to the hit \[m\].
    pub range: f64,
}

/// Cast one ray per (θ, φ) pair of the cross grid and report first hits.
/// Angles in degrees, in the sensor's body frame.
pub fn sim_lidar(
    pose: &LidarPose,
    phi_deg: &[f64],
    theta_deg: &[f64],
    targets: &[&MeshTarget],
    tier: Tier,
) -> Result<Vec<LidarReturn>, EchosimError> {
    tier.check_meshes(targets)?;

    let origin = DVec3::from(pose.position);
    let rotation = EulerZyx::from_degrees(pose.rotation[0], pose.rotation[1], pose.rotation[2])
        .matrix();
    let prepared = prepare_targets(targets, (0, 0, 0), 0.0);

    let dirs: Vec<DVec3> = theta_deg
        .iter()
        .flat_map(|&theta| {
            phi_deg.iter().map(move |&phi| {
                rotation * spherical_to_unit(phi.to_radians(), theta.to_radians())
            })
        })
        .collect();

    let returns = dirs
        .par_iter()
        .filter_map(|&dir| {
            scene_closest_hit(&prepared, origin, dir).map(|hit| {
                // Orient the normal toward the sensor.
                let normal = if hit.normal.dot(dir) > 0.0 {
                    -hit.normal
                } else {
                    hit.normal
                };
                LidarReturn {
                    direction: dir,
                    position: hit.point,
                    normal,
                    range: hit.t,
                }
            })
        })
        .collect();
    Ok(returns)
}
