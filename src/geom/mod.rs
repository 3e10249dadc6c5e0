// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Triangle-soup geometry and the acceleration structure over it.

mod bvh;
mod mesh;

pub(crate) use bvh::{Bvh, Hit as BvhHit};
pub use mesh::{LengthUnit, MeshError, TriangleMesh};
