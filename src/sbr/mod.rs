// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The shooting-and-bouncing-rays tracer.
//!
//! Primary rays are launched from a grid, intersected against every target's
//! BVH, and bounced specularly up to a reflection cap. Polarization and field
//! amplitude evolve through the physical-optics kernel at each hit. A hit on
//! the first surface always emits the coherent physical-optics contribution
//! toward the observation direction; hits after the first bounce emit the
//! diffuse re-scatter of the bounced field (weighted by the illuminated patch
//! area, |cos θᵢ| and the surface's reflection coefficients), which a
//! `skip_diffusion` surface suppresses while still spawning specular children.
//! Propagation phase is *not* folded into the carried field; contributions
//! report their path length and the consumer applies `exp(−j·2π·Δd/λ)` (the
//! RCS front-end directly, the baseband synthesizer through the waveform's
//! delayed phase).

mod grid;
mod log;
mod po;

pub(crate) use grid::{angular_grid, planar_grid, AreaWeight, PrimaryRay};
pub(crate) use log::{RayLogger, RayRecord};
pub(crate) use po::{specular_bounce, transverse};

use glam::DVec3;
use rayon::prelude::*;

use crate::constants::{AMPLITUDE_FLOOR, GRAZING_COS_FLOOR, SELF_INTERSECT_OFFSET};
use crate::math::CVec3;
use crate::target::{MeshTarget, TargetPose};

/// Upper bound on consecutive back-face pass-throughs, so a ray cannot loop
/// inside a degenerate sandwich of inward-facing surfaces.
const MAX_PASS_THROUGH: u32 = 16;

/// Equidistant hits across targets within this tolerance resolve to the lower
/// (target, triangle) pair \[m\].
const CROSS_TARGET_TIE: f64 = 1e-9;

/// A mesh target with its pose evaluated at the snapshot instant.
pub(crate) struct TraceTarget<'a> {
    pub target: &'a MeshTarget,
    pub pose: TargetPose,
}

/// Evaluate every mesh target's pose for one snapshot.
pub(crate) fn prepare_targets<'a>(
    meshes: &[&'a MeshTarget],
    idx: (usize, usize, usize),
    t: f64,
) -> Vec<TraceTarget<'a>> {
    meshes
        .iter()
        .map(|m| TraceTarget {
            target: m,
            pose: m.pose(idx, t),
        })
        .collect()
}

/// World-frame bounding sphere of a posed target.
pub(crate) fn world_sphere(tt: &TraceTarget) -> (DVec3, f64) {
    let (centre, radius) = tt.target.bounding_sphere();
    (tt.pose.world_from_local(centre), radius)
}

/// Where scattered energy is observed.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Observation {
    /// Far-field unit direction from the scene toward the observer.
    Direction(DVec3),
    /// A world point (the receiving antenna).
    Point(DVec3),
}

/// One far-field contribution from one surface hit.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Contribution {
    /// The scattering point \[m\].
    pub point: DVec3,
    /// Surface velocity at the point \[m/s\].
    pub velocity: DVec3,
    /// Path length from the launch reference to the point, through every
    /// earlier bounce \[m\].
    pub path: f64,
    /// d(path)/dt \[m/s\].
    pub rate: f64,
    /// Perpendicular beam footprint at the point \[m²\].
    pub footprint: f64,
    /// The evolved complex field, Fresnel products included, propagation
    /// phase excluded.
    pub pol: CVec3,
    /// The primary ray's launch direction (world frame).
    pub launch_dir: DVec3,
    /// Bounces undergone at the emitting hit: 1 is the first-surface
    /// physical-optics term, ≥ 2 the diffuse re-scatter of a bounced ray.
    pub reflections: u32,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct SceneHit {
    pub target: usize,
    pub t: f64,
    pub point: DVec3,
    /// World-frame geometric normal, as wound.
    pub normal: DVec3,
}

/// Closest hit across all targets. Rays are taken into each target's local
/// frame through the inverse pose; rotations preserve length, so local `t` is
/// world `t`.
pub(crate) fn scene_closest_hit(
    targets: &[TraceTarget],
    origin: DVec3,
    dir: DVec3,
) -> Option<SceneHit> {
    let mut best: Option<(usize, crate::geom::BvhHit)> = None;
    for (index, tt) in targets.iter().enumerate() {
        let local_origin = tt.pose.local_point(origin);
        let local_dir = tt.pose.local_dir(dir);
        if let Some(hit) = tt.target.bvh().closest_hit(tt.target.mesh(), local_origin, local_dir) {
            best = match best {
                None => Some((index, hit)),
                // Strictly closer wins; a tie keeps the earlier target, which
                // is the lower (target, triangle) pair.
                Some((bi, bh)) if hit.t < bh.t - CROSS_TARGET_TIE => Some((index, hit)),
                Some(b) => Some(b),
            };
        }
    }
    best.map(|(index, hit)| {
        let tt = &targets[index];
        SceneHit {
            target: index,
            t: hit.t,
            point: origin + dir * hit.t,
            normal: tt.pose.world_dir(tt.target.mesh().normal(hit.triangle)),
        }
    })
}

/// Whether anything blocks the segment (or ray) from a surface point toward
/// the observation. The start is offset along the surface normal first.
fn observation_occluded(
    targets: &[TraceTarget],
    point: DVec3,
    normal: DVec3,
    observation: Observation,
) -> bool {
    let start = point + normal * SELF_INTERSECT_OFFSET;
    let (dir, t_max) = match observation {
        Observation::Direction(d) => (d, f64::INFINITY),
        Observation::Point(p) => {
            let leg = p - start;
            let dist = leg.length();
            if dist <= SELF_INTERSECT_OFFSET {
                return false;
            }
            (leg / dist, dist - SELF_INTERSECT_OFFSET)
        }
    };
    targets.iter().any(|tt| {
        let local_origin = tt.pose.local_point(start);
        let local_dir = tt.pose.local_dir(dir);
        tt.target
            .bvh()
            .any_hit(tt.target.mesh(), local_origin, local_dir, t_max)
    })
}

pub(crate) struct TraceSpec<'a> {
    pub targets: &'a [TraceTarget<'a>],
    pub observation: Observation,
    pub max_reflections: u32,
    /// Velocity of the launch point \[m/s\]; seeds the range-rate chain.
    pub sensor_velocity: DVec3,
}

pub(crate) struct TraceOutput {
    pub contributions: Vec<Contribution>,
    /// One record per primary ray, only filled on request.
    pub records: Vec<RayRecord>,
    pub rays_traced: usize,
}

/// Trace a set of primary rays carrying `launch_pol`. Parallel over primary
/// rays; the output order is the primary-ray order, so results are
/// deterministic for a fixed grid.
pub(crate) fn trace(
    primaries: &[PrimaryRay],
    launch_pol: CVec3,
    spec: &TraceSpec,
    want_records: bool,
) -> TraceOutput {
    let per_ray: Vec<(Vec<Contribution>, u32)> = primaries
        .par_iter()
        .map(|ray| trace_one(ray, launch_pol, spec))
        .collect();

    let mut contributions = Vec::new();
    let mut records = Vec::new();
    for (ray, (contribs, reflections)) in primaries.iter().zip(per_ray) {
        contributions.extend(contribs);
        if want_records {
            records.push(RayRecord {
                origin: ray.origin.to_array(),
                direction: ray.dir.to_array(),
                reflections,
            });
        }
    }
    TraceOutput {
        contributions,
        records,
        rays_traced: primaries.len(),
    }
}

fn trace_one(
    ray: &PrimaryRay,
    launch_pol: CVec3,
    spec: &TraceSpec,
) -> (Vec<Contribution>, u32) {
    let mut pos = ray.origin;
    let mut dir = ray.dir;
    let mut pol = transverse(launch_pol, dir);
    let mut path = ray.path0;
    let mut rate = 0.0;
    let mut v_prev = spec.sensor_velocity;
    let mut reflections = 0u32;
    let mut passes = 0u32;
    let mut out = Vec::new();

    while reflections < spec.max_reflections {
        let hit = match scene_closest_hit(spec.targets, pos, dir) {
            Some(h) => h,
            None => break,
        };
        let tt = &spec.targets[hit.target];
        let cos_i = -dir.dot(hit.normal);
        if cos_i <= 0.0 {
            // Back face: the surface is skipped and the ray continues behind
            // it.
            passes += 1;
            if passes > MAX_PASS_THROUGH {
                break;
            }
            path += hit.t + SELF_INTERSECT_OFFSET;
            pos = hit.point + dir * SELF_INTERSECT_OFFSET;
            continue;
        }

        reflections += 1;
        path += hit.t;
        let v_hit = tt.pose.velocity_at(hit.point);
        rate += dir.dot(v_hit - v_prev);
        v_prev = v_hit;

        let bounce = specular_bounce(dir, hit.normal, pol, tt.target.material(), cos_i);

        // A first-surface hit always radiates the physical-optics term toward
        // the observer. Hits after the first bounce are diffuse re-scatter of
        // the bounced field; a skip_diffusion surface emits none of those.
        let emits = reflections == 1 || !tt.target.skip_diffusion();
        if emits && cos_i >= GRAZING_COS_FLOOR {
            let obs_dir = match spec.observation {
                Observation::Direction(d) => Some(d),
                Observation::Point(p) => {
                    let leg = p - hit.point;
                    (leg.length() > SELF_INTERSECT_OFFSET).then(|| leg.normalize())
                }
            };
            if let Some(obs_dir) = obs_dir {
                if obs_dir.dot(hit.normal) > 0.0
                    && !observation_occluded(spec.targets, hit.point, hit.normal, spec.observation)
                {
                    out.push(Contribution {
                        point: hit.point,
                        velocity: v_hit,
                        path,
                        rate,
                        footprint: ray.weight.footprint(path),
                        pol: bounce.reflected_pol,
                        launch_dir: ray.dir,
                        reflections,
                    });
                }
            }
        }

        pol = bounce.reflected_pol;
        if pol.norm() < AMPLITUDE_FLOOR {
            break;
        }
        pos = hit.point + hit.normal * SELF_INTERSECT_OFFSET;
        dir = bounce.reflected_dir;
    }

    (out, reflections)
}
