// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Vector and complex math primitives.

mod cvec;
mod rotation;

pub use cvec::CVec3;
pub use rotation::EulerZyx;

use glam::DVec3;
use num_complex::Complex64;

/// `exp(j·arg)` for a real argument.
#[inline]
pub(crate) fn cexp(arg: f64) -> Complex64 {
    let (s, c) = arg.sin_cos();
    Complex64::new(c, s)
}

/// Power ratio from a dB value.
#[inline]
pub(crate) fn db_to_power(db: f64) -> f64 {
    10_f64.powf(db / 10.0)
}

/// Amplitude (voltage) ratio from a dB value.
#[inline]
pub(crate) fn db_to_amplitude(db: f64) -> f64 {
    10_f64.powf(db / 20.0)
}

/// Transmit power in watts from a dBm value.
#[inline]
pub(crate) fn dbm_to_watts(dbm: f64) -> f64 {
    10_f64.powf((dbm - 30.0) / 10.0)
}

/// Unit vector for the spherical direction (φ, θ), where φ is the azimuth from
/// +x and θ the polar angle from +z. All angles in radians.
#[inline]
pub fn spherical_to_unit(phi: f64, theta: f64) -> DVec3 {
    let (s_phi, c_phi) = phi.sin_cos();
    let (s_theta, c_theta) = theta.sin_cos();
    DVec3::new(s_theta * c_phi, s_theta * s_phi, c_theta)
}

/// Inverse of [spherical_to_unit]: (φ, θ) of a unit vector.
#[inline]
pub fn unit_to_spherical(dir: DVec3) -> (f64, f64) {
    let phi = dir.y.atan2(dir.x);
    let theta = dir.z.clamp(-1.0, 1.0).acos();
    (phi, theta)
}

/// Azimuth/elevation pair of a unit direction: azimuth from +x in the xy
/// plane, elevation from the xy plane toward +z.
#[inline]
pub(crate) fn unit_to_azel(dir: DVec3) -> (f64, f64) {
    let az = dir.y.atan2(dir.x);
    let el = dir.z.atan2((dir.x * dir.x + dir.y * dir.y).sqrt());
    (az, el)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn spherical_round_trip() {
        let dir = spherical_to_unit(0.3, 1.2);
        assert_abs_diff_eq!(dir.length(), 1.0, epsilon = 1e-12);
        let (phi, theta) = unit_to_spherical(dir);
        assert_abs_diff_eq!(phi, 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(theta, 1.2, epsilon = 1e-12);
    }

    #[test]
    fn spherical_axes() {
        assert_abs_diff_eq!(
            spherical_to_unit(0.0, FRAC_PI_2).x,
            1.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(spherical_to_unit(0.0, 0.0).z, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            spherical_to_unit(FRAC_PI_2, FRAC_PI_2).y,
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn cexp_is_unit_phasor() {
        let z = cexp(0.7);
        assert_abs_diff_eq!(z.norm(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(z.arg(), 0.7, epsilon = 1e-12);
    }
}
