// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A bounding-volume hierarchy over a mesh's triangles.
//!
//! Built once per target on the local-frame vertex set; rays are transformed
//! into the local frame before traversal. Construction is deterministic:
//! nodes split at the midpoint of the longest axis of their centroid bounds,
//! with ties and failed splits resolved by primitive index.

use glam::DVec3;

use super::mesh::TriangleMesh;

const LEAF_SIZE: usize = 4;

/// Equidistant hits within this tolerance are tie-broken by triangle index.
const HIT_TIE_EPSILON: f64 = 1e-9;

#[derive(Clone, Debug)]
struct BvhNode {
    aabb_min: DVec3,
    aabb_max: DVec3,
    /// Index of the left child; the right child is `left_child + 1`. Zero for
    /// leaves (the root is never a child).
    left_child: u32,
    first_prim: u32,
    prim_count: u32,
}

impl BvhNode {
    fn is_leaf(&self) -> bool {
        self.prim_count > 0
    }
}

/// A closest-hit query result in the local frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Hit {
    pub triangle: usize,
    /// Distance along the ray \[m\].
    pub t: f64,
}

#[derive(Clone, Debug)]
pub(crate) struct Bvh {
    nodes: Vec<BvhNode>,
    /// Triangle indices, permuted so each leaf's primitives are contiguous.
    prim_indices: Vec<u32>,
}

impl Bvh {
    pub(crate) fn build(mesh: &TriangleMesh) -> Bvh {
        let mut prim_indices: Vec<u32> = (0..mesh.num_triangles() as u32).collect();
        let mut nodes = Vec::with_capacity(2 * mesh.num_triangles());
        nodes.push(new_node(mesh, &prim_indices, 0, mesh.num_triangles()));
        subdivide(mesh, &mut nodes, &mut prim_indices, 0);
        Bvh {
            nodes,
            prim_indices,
        }
    }

    /// The closest intersection of the ray with the mesh, if any. Equidistant
    /// hits resolve to the lowest triangle index.
    pub(crate) fn closest_hit(
        &self,
        mesh: &TriangleMesh,
        origin: DVec3,
        dir: DVec3,
    ) -> Option<Hit> {
        let inv_dir = dir.recip();
        let mut best: Option<Hit> = None;
        let mut stack = [0u32; 64];
        let mut stack_len = 0;
        let mut node_index = 0u32;
        loop {
            let node = &self.nodes[node_index as usize];
            let t_max = best.map_or(f64::INFINITY, |h| h.t + HIT_TIE_EPSILON);
            if slab_test(node, origin, inv_dir, t_max) {
                if node.is_leaf() {
                    for i in node.first_prim..node.first_prim + node.prim_count {
                        let tri = self.prim_indices[i as usize] as usize;
                        let [a, b, c] = mesh.vertices_of(tri);
                        if let Some(t) = intersect_triangle(origin, dir, a, b, c) {
                            best = match best {
                                None => Some(Hit { triangle: tri, t }),
                                Some(h) => {
                                    if t < h.t - HIT_TIE_EPSILON
                                        || ((t - h.t).abs() <= HIT_TIE_EPSILON
                                            && tri < h.triangle)
                                    {
                                        Some(Hit { triangle: tri, t })
                                    } else {
                                        Some(h)
                                    }
                                }
                            };
                        }
                    }
                } else {
                    // Push the right child, descend into the left.
                    stack[stack_len] = node.left_child + 1;
                    stack_len += 1;
                    node_index = node.left_child;
                    continue;
                }
            }
            if stack_len == 0 {
                break;
            }
            stack_len -= 1;
            node_index = stack[stack_len];
        }
        best
    }

    /// Whether the ray hits anything within `t_max`. Used for shadow queries;
    /// terminates on the first accepted intersection.
    pub(crate) fn any_hit(&self, mesh: &TriangleMesh, origin: DVec3, dir: DVec3, t_max: f64) -> bool {
        let inv_dir = dir.recip();
        let mut stack = [0u32; 64];
        let mut stack_len = 0;
        let mut node_index = 0u32;
        loop {
            let node = &self.nodes[node_index as usize];
            if slab_test(node, origin, inv_dir, t_max) {
                if node.is_leaf() {
                    for i in node.first_prim..node.first_prim + node.prim_count {
                        let tri = self.prim_indices[i as usize] as usize;
                        let [a, b, c] = mesh.vertices_of(tri);
                        if let Some(t) = intersect_triangle(origin, dir, a, b, c) {
                            if t < t_max {
                                return true;
                            }
                        }
                    }
                } else {
                    stack[stack_len] = node.left_child + 1;
                    stack_len += 1;
                    node_index = node.left_child;
                    continue;
                }
            }
            if stack_len == 0 {
                return false;
            }
            stack_len -= 1;
            node_index = stack[stack_len];
        }
    }
}

fn new_node(mesh: &TriangleMesh, prims: &[u32], first: usize, count: usize) -> BvhNode {
    let mut aabb_min = DVec3::splat(f64::INFINITY);
    let mut aabb_max = DVec3::splat(f64::NEG_INFINITY);
    for &p in &prims[first..first + count] {
        for v in mesh.vertices_of(p as usize) {
            aabb_min = aabb_min.min(v);
            aabb_max = aabb_max.max(v);
        }
    }
    BvhNode {
        aabb_min,
        aabb_max,
        left_child: 0,
        first_prim: first as u32,
        prim_count: count as u32,
    }
}

fn subdivide(mesh: &TriangleMesh, nodes: &mut Vec<BvhNode>, prims: &mut [u32], node_index: usize) {
    let (first, count) = {
        let node = &nodes[node_index];
        (node.first_prim as usize, node.prim_count as usize)
    };
    if count <= LEAF_SIZE {
        return;
    }

    // Centroid bounds decide the split axis; longest axis wins, ties go to the
    // lower axis index.
    let mut c_min = DVec3::splat(f64::INFINITY);
    let mut c_max = DVec3::splat(f64::NEG_INFINITY);
    for &p in &prims[first..first + count] {
        let c = mesh.centroid(p as usize);
        c_min = c_min.min(c);
        c_max = c_max.max(c);
    }
    let extent = c_max - c_min;
    let axis = if extent.x >= extent.y && extent.x >= extent.z {
        0
    } else if extent.y >= extent.z {
        1
    } else {
        2
    };
    let split = (c_min[axis] + c_max[axis]) / 2.0;

    // Stable partition around the midpoint, so equal keys keep index order.
    let slice = &mut prims[first..first + count];
    slice.sort_by(|&a, &b| {
        let ka = mesh.centroid(a as usize)[axis] >= split;
        let kb = mesh.centroid(b as usize)[axis] >= split;
        ka.cmp(&kb).then(a.cmp(&b))
    });
    let mut left_count = slice
        .iter()
        .take_while(|&&p| mesh.centroid(p as usize)[axis] < split)
        .count();
    // A degenerate split (all centroids on one side) falls back to a median
    // split by index order.
    if left_count == 0 || left_count == count {
        slice.sort_unstable();
        left_count = count / 2;
    }

    let left_index = nodes.len();
    nodes.push(new_node(mesh, prims, first, left_count));
    nodes.push(new_node(mesh, prims, first + left_count, count - left_count));
    {
        let node = &mut nodes[node_index];
        node.left_child = left_index as u32;
        node.prim_count = 0;
    }
    subdivide(mesh, nodes, prims, left_index);
    subdivide(mesh, nodes, prims, left_index + 1);
}

fn slab_test(node: &BvhNode, origin: DVec3, inv_dir: DVec3, t_max: f64) -> bool {
    let mut t_near = 0.0_f64;
    let mut t_far = t_max;
    for axis in 0..3 {
        let inv = inv_dir[axis];
        let mut t0 = (node.aabb_min[axis] - origin[axis]) * inv;
        let mut t1 = (node.aabb_max[axis] - origin[axis]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        // 0·inf: the ray runs parallel to this slab with its origin exactly on
        // the boundary plane. Treat it as inside.
        if t0.is_nan() {
            t0 = f64::NEG_INFINITY;
        }
        if t1.is_nan() {
            t1 = f64::INFINITY;
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
    }
    t_near <= t_far
}

/// Möller–Trumbore ray/triangle intersection. Edges are accepted with a small
/// barycentric tolerance so adjacent triangles cannot both reject a ray that
/// crosses their shared edge.
pub(crate) fn intersect_triangle(
    origin: DVec3,
    dir: DVec3,
    a: DVec3,
    b: DVec3,
    c: DVec3,
) -> Option<f64> {
    const DET_EPSILON: f64 = 1e-13;
    const BARY_EPSILON: f64 = 1e-9;

    let e1 = b - a;
    let e2 = c - a;
    let p = dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < DET_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(-BARY_EPSILON..=1.0 + BARY_EPSILON).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = dir.dot(q) * inv_det;
    if v < -BARY_EPSILON || u + v > 1.0 + BARY_EPSILON {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    (t > 0.0).then_some(t)
}
