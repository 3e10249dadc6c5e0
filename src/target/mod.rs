// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Scene targets: triangle meshes with EM material properties, and ideal
//! point scatterers.

mod material;
mod mesh;
mod point;

pub use material::{Material, MaterialError, Permittivity};
pub use mesh::{MeshTarget, MeshTargetConfig};
pub(crate) use mesh::TargetPose;
pub use point::{PointTarget, PointTargetConfig};

use thiserror::Error;

use crate::geom::MeshError;

#[derive(Error, Debug)]
pub enum TargetError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Material(#[from] MaterialError),

    #[error("Point-target RCS must be non-negative, got {0} m²")]
    NegativeRcs(f64),
}

/// A scene scatterer. Each variant carries its own evaluation path: meshes go
/// through the ray tracer, points are evaluated in closed form per sample.
#[derive(Clone, Debug)]
pub enum Target {
    Mesh(MeshTarget),
    Point(PointTarget),
}

impl From<MeshTarget> for Target {
    fn from(t: MeshTarget) -> Target {
        Target::Mesh(t)
    }
}

impl From<PointTarget> for Target {
    fn from(t: PointTarget) -> Target {
        Target::Point(t)
    }
}
