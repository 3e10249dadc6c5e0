// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The physical-optics kernel: given incidence geometry and a material,
//! evolve the polarization through a specular reflection.
//!
//! The incident field is decomposed into TE and TM components relative to the
//! plane of incidence, each is multiplied by its Fresnel coefficient, and the
//! result is recomposed on the reflected propagation triad. Because the
//! decomposition is quadratic in the TE axis, the output is continuous when
//! the axis direction crosses zero.

use glam::DVec3;

use crate::math::CVec3;
use crate::target::Material;

/// The TE axis is considered degenerate (normal incidence) below this cross
/// product magnitude.
const TE_AXIS_FLOOR: f64 = 1e-8;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Bounce {
    pub reflected_dir: DVec3,
    pub reflected_pol: CVec3,
}

/// Mirror a direction about a surface normal.
#[inline]
pub(crate) fn reflect(dir: DVec3, normal: DVec3) -> DVec3 {
    dir - 2.0 * dir.dot(normal) * normal
}

/// Evolve a transverse field through a specular reflection off a surface with
/// the given outward normal (`dir.dot(normal) < 0`).
pub(crate) fn specular_bounce(
    dir: DVec3,
    normal: DVec3,
    pol: CVec3,
    material: &Material,
    cos_i: f64,
) -> Bounce {
    let reflected_dir = reflect(dir, normal);

    // TE axis: perpendicular to the plane of incidence. At normal incidence
    // the plane is undefined and the coefficients coincide, so any transverse
    // axis serves.
    let cross = dir.cross(normal);
    let e_te = if cross.length() > TE_AXIS_FLOOR {
        cross.normalize()
    } else {
        normal.any_orthonormal_vector()
    };
    // Basis choice: with ê_tm,in = d̂ × ê_te and ê_tm,ref = ê_te × d̂_r, a −1
    // coefficient on both components cancels the tangential field at the
    // surface, which is the PEC condition.
    let e_tm_in = dir.cross(e_te);
    let e_tm_ref = e_te.cross(reflected_dir);

    let fresnel = material.fresnel(cos_i);
    let a_te = pol.dot_real(e_te) * fresnel.te;
    let a_tm = pol.dot_real(e_tm_in) * fresnel.tm;

    let reflected_pol = CVec3::new(
        a_te * e_te.x + a_tm * e_tm_ref.x,
        a_te * e_te.y + a_tm * e_tm_ref.y,
        a_te * e_te.z + a_tm * e_tm_ref.z,
    );

    Bounce {
        reflected_dir,
        reflected_pol,
    }
}

/// Project a polarization onto the plane transverse to a propagation
/// direction. Launch polarizations are cleaned up with this before tracing.
pub(crate) fn transverse(pol: CVec3, dir: DVec3) -> CVec3 {
    let along = pol.dot_real(dir);
    CVec3::new(
        pol.x - along * dir.x,
        pol.y - along * dir.y,
        pol.z - along * dir.z,
    )
}
