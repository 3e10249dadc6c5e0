// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Primary-ray grids.
//!
//! Radar and LiDAR shots emit rays from a sensor over an (azimuth, polar)
//! grid bounded by each target's angular extent; RCS shots emit parallel rays
//! from a plane, approximating an incident plane wave. Uneven angular grids
//! carry per-ray solid angles so area weighting is conserved.

use glam::DVec3;
use log::debug;

use crate::constants::PI;
use crate::math::{spherical_to_unit, unit_to_spherical};

/// The sine of the polar angle is floored at this value when sizing the
/// azimuth step, so grids containing a pole stay finite.
const MIN_SIN_THETA: f64 = 0.05;

/// Upper bound on the rays of a single grid. A wavelength-scale spacing over
/// an extended target (a ground plane) would otherwise ask for more rays than
/// memory holds; the spacing is widened to fit and the widening is logged.
const MAX_GRID_RAYS: usize = 1 << 22;

/// Widen `spacing` until an `a × b` grid of rays fits the cap. Returns the
/// widened spacing factor (1.0 when no widening was needed).
fn fit_spacing(steps_a: i64, steps_b: i64) -> f64 {
    let total = (steps_a.max(1) as f64) * (steps_b.max(1) as f64);
    if total <= MAX_GRID_RAYS as f64 {
        1.0
    } else {
        let factor = (total / MAX_GRID_RAYS as f64).sqrt();
        debug!("ray grid of {total:.0} rays exceeds the cap; widening spacing ×{factor:.2}");
        factor
    }
}

/// How a primary ray's captured area is accounted.
#[derive(Clone, Copy, Debug)]
pub(crate) enum AreaWeight {
    /// The ray subtends this solid angle; its footprint grows as the squared
    /// path length \[sr\].
    SolidAngle(f64),
    /// The ray is part of a parallel bundle with a fixed footprint \[m²\].
    Fixed(f64),
}

impl AreaWeight {
    /// The perpendicular footprint after travelling `path` metres \[m²\].
    pub(crate) fn footprint(&self, path: f64) -> f64 {
        match self {
            AreaWeight::SolidAngle(omega) => omega * path * path,
            AreaWeight::Fixed(area) => *area,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct PrimaryRay {
    pub origin: DVec3,
    pub dir: DVec3,
    pub weight: AreaWeight,
    /// Path length already accumulated at launch \[m\]. Zero for sensor
    /// grids; the signed distance from the phase reference plane for planar
    /// grids.
    pub path0: f64,
}

/// An angular grid of rays from `sensor` covering a bounding sphere. The polar
/// step is `spacing` radians; the azimuth step is widened by 1/sin θ of the
/// sphere centre so arc lengths stay comparable.
pub(crate) fn angular_grid(
    sensor: DVec3,
    centre: DVec3,
    radius: f64,
    spacing: f64,
    rays: &mut Vec<PrimaryRay>,
) {
    let to_centre = centre - sensor;
    let dist = to_centre.length();
    if dist <= radius {
        full_sphere_grid(sensor, spacing, rays);
        return;
    }
    let angular_radius = (radius / dist).clamp(-1.0, 1.0).asin();
    let (phi_c, theta_c) = unit_to_spherical(to_centre / dist);

    let mut d_theta = spacing.min(angular_radius).max(1e-6);
    let mut d_phi = (spacing / theta_c.sin().abs().max(MIN_SIN_THETA))
        .min(PI)
        .max(1e-6);
    let phi_half_width = (angular_radius / theta_c.sin().abs().max(MIN_SIN_THETA)).min(PI);
    let widen = fit_spacing(
        (2.0 * angular_radius / d_theta).ceil() as i64 + 1,
        (2.0 * phi_half_width / d_phi).ceil() as i64 + 1,
    );
    d_theta *= widen;
    d_phi *= widen;
    let n_theta = (angular_radius / d_theta).ceil() as i64;
    let n_phi = (phi_half_width / d_phi).ceil() as i64;

    for i in -n_theta..=n_theta {
        let theta = theta_c + i as f64 * d_theta;
        if theta <= 0.0 || theta >= PI {
            continue;
        }
        let solid_angle = d_theta * d_phi * theta.sin();
        for j in -n_phi..=n_phi {
            let phi = phi_c + j as f64 * d_phi;
            rays.push(PrimaryRay {
                origin: sensor,
                dir: spherical_to_unit(phi, theta),
                weight: AreaWeight::SolidAngle(solid_angle),
                path0: 0.0,
            });
        }
    }
}

/// The fallback when the sensor sits inside a target's bounding sphere: cover
/// the whole sphere of directions.
fn full_sphere_grid(sensor: DVec3, spacing: f64, rays: &mut Vec<PrimaryRay>) {
    let mut d_theta = spacing.min(PI / 8.0).max(1e-6);
    d_theta *= fit_spacing(
        (PI / d_theta).floor() as i64,
        (2.0 * PI / d_theta).floor() as i64,
    );
    let n_theta = (PI / d_theta).floor() as i64;
    for i in 0..n_theta {
        let theta = (i as f64 + 0.5) * d_theta;
        let d_phi = (d_theta / theta.sin().max(MIN_SIN_THETA)).min(PI / 2.0);
        let n_phi = (2.0 * PI / d_phi).floor() as i64;
        let solid_angle = d_theta * d_phi * theta.sin();
        for j in 0..n_phi {
            let phi = -PI + j as f64 * d_phi;
            rays.push(PrimaryRay {
                origin: sensor,
                dir: spherical_to_unit(phi, theta),
                weight: AreaWeight::SolidAngle(solid_angle),
                path0: 0.0,
            });
        }
    }
}

/// A planar bundle of parallel rays travelling along `dir`, covering the given
/// bounding spheres with `spacing` metres between rays. Ray phase is
/// referenced to the plane through the world origin perpendicular to `dir`,
/// via `path0`.
pub(crate) fn planar_grid(
    dir: DVec3,
    spheres: &[(DVec3, f64)],
    spacing: f64,
    rays: &mut Vec<PrimaryRay>,
) {
    if spheres.is_empty() {
        return;
    }
    let u = dir.any_orthonormal_vector();
    let v = dir.cross(u);

    let mut u_min = f64::INFINITY;
    let mut u_max = f64::NEG_INFINITY;
    let mut v_min = f64::INFINITY;
    let mut v_max = f64::NEG_INFINITY;
    let mut d_min = f64::INFINITY;
    for &(centre, radius) in spheres {
        u_min = u_min.min(centre.dot(u) - radius);
        u_max = u_max.max(centre.dot(u) + radius);
        v_min = v_min.min(centre.dot(v) - radius);
        v_max = v_max.max(centre.dot(v) + radius);
        d_min = d_min.min(centre.dot(dir) - radius);
    }
    // Launch from just upstream of the nearest sphere.
    let launch_offset = d_min - 1.0;
    let spacing = spacing
        * fit_spacing(
            ((u_max - u_min) / spacing).ceil() as i64 + 1,
            ((v_max - v_min) / spacing).ceil() as i64 + 1,
        );
    let area = spacing * spacing;

    let n_u = ((u_max - u_min) / spacing).ceil() as i64;
    let n_v = ((v_max - v_min) / spacing).ceil() as i64;
    for i in 0..=n_u {
        let pu = u_min + (i as f64 + 0.5) * spacing;
        if pu > u_max {
            continue;
        }
        for j in 0..=n_v {
            let pv = v_min + (j as f64 + 0.5) * spacing;
            if pv > v_max {
                continue;
            }
            let origin = u * pu + v * pv + dir * launch_offset;
            rays.push(PrimaryRay {
                origin,
                dir,
                weight: AreaWeight::Fixed(area),
                path0: launch_offset,
            });
        }
    }
}
