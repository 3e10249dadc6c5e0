// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mesh targets: a triangle soup, a pose trajectory and a material.

use glam::{DMat3, DVec3};
use ndarray::Array3;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::material::{Material, Permittivity};
use super::TargetError;
use crate::geom::{Bvh, LengthUnit, TriangleMesh};
use crate::math::EulerZyx;
use crate::motion::{Attitude, Kinematic};

fn default_permeability() -> Complex64 {
    Complex64::new(1.0, 0.0)
}

/// The serialisable description of a mesh target. Angles are in degrees and
/// vertex coordinates in `unit`; everything internal is radians and metres.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshTargetConfig {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,

    /// Rotation origin in the local frame \[unit\].
    #[serde(default)]
    pub origin: [f64; 3],

    /// World position of the rotation origin at t = 0 \[m\].
    #[serde(default)]
    pub location: [f64; 3],

    /// Linear velocity \[m/s\].
    #[serde(default)]
    pub speed: [f64; 3],

    /// (yaw, pitch, roll) at t = 0 \[deg\].
    #[serde(default)]
    pub rotation: [f64; 3],

    /// (yaw, pitch, roll) rates \[deg/s\].
    #[serde(default)]
    pub rotation_rate: [f64; 3],

    #[serde(default)]
    pub unit: LengthUnit,

    #[serde(default)]
    pub permittivity: Permittivity,

    #[serde(default = "default_permeability")]
    pub permeability: Complex64,

    /// Suppress the diffuse re-scatter that bounced rays hitting this surface
    /// would emit toward the observer. The first-bounce physical-optics
    /// return and the specular child rays are unaffected. Meant for extended
    /// ground planes.
    #[serde(default)]
    pub skip_diffusion: bool,
}

/// A mesh scatterer, ready to trace: validated geometry, a BVH built once on
/// the local-frame vertices, a pose trajectory and a material.
#[derive(Clone, Debug)]
pub struct MeshTarget {
    mesh: TriangleMesh,
    bvh: Bvh,
    bounding_centre: DVec3,
    bounding_radius: f64,
    origin: DVec3,
    kinematic: Kinematic,
    attitude: Attitude,
    material: Material,
    skip_diffusion: bool,
}

/// A mesh target's pose evaluated at one instant.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TargetPose {
    pub rotation: DMat3,
    pub rotation_inv: DMat3,
    pub location: DVec3,
    pub origin: DVec3,
    pub linear_velocity: DVec3,
    pub omega: DVec3,
}

impl TargetPose {
    pub(crate) fn world_from_local(&self, v: DVec3) -> DVec3 {
        self.rotation * (v - self.origin) + self.location
    }

    pub(crate) fn local_point(&self, p_world: DVec3) -> DVec3 {
        self.rotation_inv * (p_world - self.location) + self.origin
    }

    pub(crate) fn local_dir(&self, d_world: DVec3) -> DVec3 {
        self.rotation_inv * d_world
    }

    pub(crate) fn world_dir(&self, d_local: DVec3) -> DVec3 {
        self.rotation * d_local
    }

    /// Velocity of the surface point `p_world` \[m/s\].
    pub(crate) fn velocity_at(&self, p_world: DVec3) -> DVec3 {
        self.linear_velocity + self.omega.cross(p_world - self.location)
    }
}

impl MeshTarget {
    pub fn new(config: &MeshTargetConfig) -> Result<MeshTarget, TargetError> {
        let mesh = TriangleMesh::new(
            config.vertices.clone(),
            config.triangles.clone(),
            config.unit,
        )?;
        let material = match config.permittivity {
            Permittivity::Pec => Material::pec(),
            Permittivity::Dielectric(eps) => Material::new(eps, config.permeability)?,
        };
        let bvh = Bvh::build(&mesh);
        let (bounding_centre, bounding_radius) = mesh.bounding_sphere();
        Ok(MeshTarget {
            mesh,
            bvh,
            bounding_centre,
            bounding_radius,
            origin: DVec3::from(config.origin) * config.unit.scale(),
            kinematic: Kinematic::Uniform {
                position: DVec3::from(config.location),
                velocity: DVec3::from(config.speed),
            },
            attitude: Attitude::Uniform {
                euler: EulerZyx::from_degrees(
                    config.rotation[0],
                    config.rotation[1],
                    config.rotation[2],
                ),
                rate: EulerZyx::from_degrees(
                    config.rotation_rate[0],
                    config.rotation_rate[1],
                    config.rotation_rate[2],
                ),
            },
            material,
            skip_diffusion: config.skip_diffusion,
        })
    }

    /// Replace the uniform trajectory with a per-sample position table.
    pub fn with_sampled_location(mut self, positions: Array3<DVec3>, velocity: DVec3) -> MeshTarget {
        self.kinematic = Kinematic::Sampled {
            positions,
            velocity,
        };
        self
    }

    /// Replace the uniform attitude with a per-sample Euler-angle table.
    pub fn with_sampled_rotation(mut self, eulers: Array3<EulerZyx>, rate: EulerZyx) -> MeshTarget {
        self.attitude = Attitude::Sampled { eulers, rate };
        self
    }

    pub fn num_triangles(&self) -> usize {
        self.mesh.num_triangles()
    }

    pub(crate) fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    pub(crate) fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub(crate) fn material(&self) -> &Material {
        &self.material
    }

    pub(crate) fn skip_diffusion(&self) -> bool {
        self.skip_diffusion
    }

    pub(crate) fn kinematic(&self) -> &Kinematic {
        &self.kinematic
    }

    pub(crate) fn attitude(&self) -> &Attitude {
        &self.attitude
    }

    /// Bounding sphere in the local frame.
    pub(crate) fn bounding_sphere(&self) -> (DVec3, f64) {
        (self.bounding_centre, self.bounding_radius)
    }

    pub(crate) fn pose(&self, idx: (usize, usize, usize), t: f64) -> TargetPose {
        let rotation = self.attitude.euler(idx, t).matrix();
        TargetPose {
            rotation,
            rotation_inv: rotation.transpose(),
            location: self.kinematic.position(idx, t),
            origin: self.origin,
            linear_velocity: self.kinematic.velocity(),
            omega: self.attitude.omega(),
        }
    }
}
