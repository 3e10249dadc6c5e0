// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Triangle meshes in a target's local frame.
//!
//! Mesh I/O from standard file formats is the caller's job; the engine accepts
//! a `{vertices[N×3], triangles[M×3]}` pair and validates it here.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::constants::MIN_TRIANGLE_AREA;

/// The length unit the vertex coordinates are expressed in. Everything is
/// converted to metres on construction.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    #[strum(serialize = "m")]
    M,
    #[strum(serialize = "cm")]
    Cm,
    #[strum(serialize = "mm")]
    Mm,
}

impl LengthUnit {
    pub(crate) fn scale(self) -> f64 {
        match self {
            LengthUnit::M => 1.0,
            LengthUnit::Cm => 1e-2,
            LengthUnit::Mm => 1e-3,
        }
    }
}

#[derive(Error, Debug)]
pub enum MeshError {
    #[error("The mesh contains no triangles")]
    Empty,

    #[error("Triangle {triangle} refers to vertex {index}, but there are only {num_vertices} vertices")]
    IndexOutOfBounds {
        triangle: usize,
        index: u32,
        num_vertices: usize,
    },

    #[error("Triangle {triangle} is degenerate (area {area:.3e} m²)")]
    DegenerateTriangle { triangle: usize, area: f64 },

    #[error("Vertex {vertex} has a non-finite coordinate")]
    NonFiniteVertex { vertex: usize },
}

/// A validated triangle soup in the target's local frame, with per-triangle
/// normal, area and centroid \[m, m², m\].
#[derive(Clone, Debug)]
pub struct TriangleMesh {
    vertices: Vec<DVec3>,
    triangles: Vec<[u32; 3]>,
    normals: Vec<DVec3>,
    areas: Vec<f64>,
    centroids: Vec<DVec3>,
}

impl TriangleMesh {
    /// Validate and take ownership of a vertex/triangle pair. Vertex
    /// coordinates are scaled from `unit` to metres.
    pub fn new(
        vertices: Vec<[f64; 3]>,
        triangles: Vec<[u32; 3]>,
        unit: LengthUnit,
    ) -> Result<TriangleMesh, MeshError> {
        if triangles.is_empty() {
            return Err(MeshError::Empty);
        }
        let scale = unit.scale();
        let vertices: Vec<DVec3> = vertices
            .into_iter()
            .map(|v| DVec3::new(v[0], v[1], v[2]) * scale)
            .collect();
        for (i, v) in vertices.iter().enumerate() {
            if !v.is_finite() {
                return Err(MeshError::NonFiniteVertex { vertex: i });
            }
        }

        let mut normals = Vec::with_capacity(triangles.len());
        let mut areas = Vec::with_capacity(triangles.len());
        let mut centroids = Vec::with_capacity(triangles.len());
        for (i, tri) in triangles.iter().enumerate() {
            for &index in tri {
                if index as usize >= vertices.len() {
                    return Err(MeshError::IndexOutOfBounds {
                        triangle: i,
                        index,
                        num_vertices: vertices.len(),
                    });
                }
            }
            let [a, b, c] = [
                vertices[tri[0] as usize],
                vertices[tri[1] as usize],
                vertices[tri[2] as usize],
            ];
            let cross = (b - a).cross(c - a);
            let doubled_area = cross.length();
            let area = doubled_area / 2.0;
            if area < MIN_TRIANGLE_AREA {
                return Err(MeshError::DegenerateTriangle { triangle: i, area });
            }
            normals.push(cross / doubled_area);
            areas.push(area);
            centroids.push((a + b + c) / 3.0);
        }

        Ok(TriangleMesh {
            vertices,
            triangles,
            normals,
            areas,
            centroids,
        })
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    pub(crate) fn vertices_of(&self, triangle: usize) -> [DVec3; 3] {
        let tri = self.triangles[triangle];
        [
            self.vertices[tri[0] as usize],
            self.vertices[tri[1] as usize],
            self.vertices[tri[2] as usize],
        ]
    }

    pub(crate) fn normal(&self, triangle: usize) -> DVec3 {
        self.normals[triangle]
    }

    /// Area of one triangle \[m²\].
    pub fn area(&self, triangle: usize) -> f64 {
        self.areas[triangle]
    }

    pub(crate) fn centroid(&self, triangle: usize) -> DVec3 {
        self.centroids[triangle]
    }

    /// A bounding sphere around the triangle centroids, grown to cover every
    /// vertex. Not minimal, but deterministic and cheap.
    pub(crate) fn bounding_sphere(&self) -> (DVec3, f64) {
        let mut centre = DVec3::ZERO;
        for c in &self.centroids {
            centre += *c;
        }
        centre /= self.centroids.len() as f64;
        let mut radius: f64 = 0.0;
        for v in &self.vertices {
            radius = radius.max(v.distance(centre));
        }
        (centre, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_square() -> (Vec<[f64; 3]>, Vec<[u32; 3]>) {
        (
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn areas_and_normals() {
        let (v, t) = unit_square();
        let mesh = TriangleMesh::new(v, t, LengthUnit::M).unwrap();
        assert_abs_diff_eq!(mesh.area(0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(mesh.normal(0).z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn unit_scaling() {
        let (v, t) = unit_square();
        let mesh = TriangleMesh::new(v, t, LengthUnit::Mm).unwrap();
        assert_abs_diff_eq!(mesh.area(0), 0.5e-6, epsilon = 1e-18);
    }

    #[test]
    fn rejects_empty_mesh() {
        assert!(matches!(
            TriangleMesh::new(vec![[0.0; 3]], vec![], LengthUnit::M),
            Err(MeshError::Empty)
        ));
    }

    #[test]
    fn rejects_bad_index() {
        let (v, mut t) = unit_square();
        t.push([0, 1, 9]);
        assert!(matches!(
            TriangleMesh::new(v, t, LengthUnit::M),
            Err(MeshError::IndexOutOfBounds { triangle: 2, .. })
        ));
    }

    #[test]
    fn rejects_degenerate_triangle() {
        let v = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let t = vec![[0, 1, 2]];
        assert!(matches!(
            TriangleMesh::new(v, t, LengthUnit::M),
            Err(MeshError::DegenerateTriangle { triangle: 0, .. })
        ));
    }
}
